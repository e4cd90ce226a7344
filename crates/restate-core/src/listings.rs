//! Property listing queries.
//!
//! Query failures never reach the UI: the plain methods log and degrade to an
//! empty list or `None`. The `try_` variants return the error instead.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::Backend;
use crate::config::CollectionRef;
use crate::error::Error;
use crate::models::Property;
use crate::query::{Query, CREATED_AT};

/// Filter value that disables the type filter.
pub const ALL_FILTER: &str = "All";
/// Number of listings shown in the "latest" strip.
pub const LATEST_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Failed to load properties: {0}")]
    Backend(#[from] Error),
}

pub type QueryResult<T> = Result<T, QueryError>;

/// Parameters for `PropertyService::get_properties`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyFilter {
    /// Exact `type` to match; empty or `"All"` matches every type.
    pub filter: String,
    /// Text searched in name, address, and type.
    pub query: String,
    pub limit: Option<usize>,
    /// Listings to skip, for paging past `limit`.
    pub offset: Option<usize>,
}

impl PropertyFilter {
    pub fn new(filter: impl Into<String>, query: impl Into<String>, limit: Option<usize>) -> Self {
        Self {
            filter: filter.into(),
            query: query.into(),
            limit,
            offset: None,
        }
    }

    #[must_use]
    pub const fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Backend queries: newest first, optional type filter, OR-search, limit, offset.
    pub fn to_queries(&self) -> Vec<Query> {
        let mut queries = vec![Query::order_desc(CREATED_AT)];

        let filter = self.filter.trim();
        if !filter.is_empty() && filter != ALL_FILTER {
            queries.push(Query::equal("type", filter));
        }

        let search = self.query.trim();
        if !search.is_empty() {
            queries.push(Query::or(vec![
                Query::search("name", search),
                Query::search("address", search),
                Query::search("type", search),
            ]));
        }

        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            queries.push(Query::limit(limit));
        }
        if let Some(offset) = self.offset.filter(|offset| *offset > 0) {
            queries.push(Query::offset(offset));
        }

        queries
    }
}

pub struct PropertyService<B> {
    backend: Arc<B>,
    collection: CollectionRef,
}

impl<B> Clone for PropertyService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            collection: self.collection.clone(),
        }
    }
}

impl<B: Backend> PropertyService<B> {
    pub const fn new(backend: Arc<B>, collection: CollectionRef) -> Self {
        Self {
            backend,
            collection,
        }
    }

    /// Oldest-first strip of the first listings ever published.
    pub async fn get_latest_properties(&self) -> Vec<Property> {
        self.try_latest_properties().await.unwrap_or_else(|error| {
            tracing::error!("{}", error);
            Vec::new()
        })
    }

    pub async fn try_latest_properties(&self) -> QueryResult<Vec<Property>> {
        self.list(&[Query::order_asc(CREATED_AT), Query::limit(LATEST_LIMIT)])
            .await
    }

    pub async fn get_properties(&self, filter: &PropertyFilter) -> Vec<Property> {
        self.try_properties(filter).await.unwrap_or_else(|error| {
            tracing::error!("{}", error);
            Vec::new()
        })
    }

    pub async fn try_properties(&self, filter: &PropertyFilter) -> QueryResult<Vec<Property>> {
        self.list(&filter.to_queries()).await
    }

    /// A single listing, or `None` when it does not exist or the call fails.
    pub async fn get_property_by_id(&self, id: &str) -> Option<Property> {
        match self.try_property_by_id(id).await {
            Ok(property) => property,
            Err(error) => {
                tracing::error!("{}", error);
                None
            }
        }
    }

    /// `Ok(None)` for an unknown id; other failures are errors.
    pub async fn try_property_by_id(&self, id: &str) -> QueryResult<Option<Property>> {
        let (database_id, collection_id) = self.collection.resolve()?;
        match self
            .backend
            .get_document(database_id, collection_id, id.trim())
            .await
        {
            Ok(document) => Ok(Some(Property::from(document))),
            Err(error) if error.is_not_found() => {
                tracing::debug!("Property {} not found", id);
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn list(&self, queries: &[Query]) -> QueryResult<Vec<Property>> {
        let (database_id, collection_id) = self.collection.resolve()?;
        let page = self
            .backend
            .list_documents(database_id, collection_id, queries)
            .await?;
        Ok(page.documents.into_iter().map(Property::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::backend::MemoryBackend;

    const DB: &str = "restate";
    const COLLECTION: &str = "properties";

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, day, 12, 0, 0).unwrap()
    }

    fn seeded() -> (Arc<MemoryBackend>, PropertyService<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let listings = [
            (1, "Lakeview Apartment", "1 Lake Shore Dr", "Apartment"),
            (2, "City Loft", "20 Main St", "Apartment"),
            (3, "Lake House", "7 Lake Rd", "House"),
            (4, "Harbor Flat", "5 Lakeside Ave", "Apartment"),
            (5, "Pine Villa", "9 Forest Ln", "Villa"),
            (6, "Quiet Studio", "3 Lake St", "Studio"),
            (7, "Downtown Apartment", "40 Lake Blvd", "Apartment"),
            (8, "Garden Condo", "12 Elm St", "Condo"),
        ];
        for (day, name, address, kind) in listings {
            backend.insert_document(
                DB,
                COLLECTION,
                at(day),
                json!({ "name": name, "address": address, "type": kind }),
            );
        }
        let service = PropertyService::new(
            Arc::clone(&backend),
            CollectionRef::new(DB, COLLECTION),
        );
        (backend, service)
    }

    #[test]
    fn all_filter_builds_only_ordering() {
        let queries = PropertyFilter::new(ALL_FILTER, "", None).to_queries();
        assert_eq!(queries, vec![Query::order_desc(CREATED_AT)]);
    }

    #[test]
    fn full_filter_builds_equal_or_and_limit() {
        let queries = PropertyFilter::new("Apartment", "lake", Some(3)).to_queries();
        assert_eq!(queries.len(), 4);
        assert_eq!(queries[1], Query::equal("type", "Apartment"));
        assert!(matches!(&queries[2], Query::Or(inner) if inner.len() == 3));
        assert_eq!(queries[3], Query::limit(3));
    }

    #[tokio::test]
    async fn latest_properties_are_oldest_first_and_capped() {
        let (_backend, service) = seeded();
        let latest = service.get_latest_properties().await;
        assert_eq!(latest.len(), LATEST_LIMIT);
        assert_eq!(latest[0].name, "Lakeview Apartment");
        assert!(latest
            .windows(2)
            .all(|pair| pair[0].created_at <= pair[1].created_at));
    }

    #[tokio::test]
    async fn all_filter_returns_newest_first_without_type_filter() {
        let (_backend, service) = seeded();
        let properties = service
            .get_properties(&PropertyFilter::new(ALL_FILTER, "", None))
            .await;
        assert_eq!(properties.len(), 8);
        assert_eq!(properties[0].name, "Garden Condo");
        assert!(properties
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn type_filter_and_search_are_combined() {
        let (_backend, service) = seeded();
        let properties = service
            .get_properties(&PropertyFilter::new("Apartment", "lake", Some(3)))
            .await;
        assert_eq!(properties.len(), 3);
        assert!(properties.iter().all(|property| property.kind == "Apartment"));
        assert!(properties.iter().all(|property| property.mentions("lake")));
        assert_eq!(properties[0].name, "Downtown Apartment");
    }

    #[tokio::test]
    async fn offset_pages_through_listings() {
        let (_backend, service) = seeded();
        let first = service
            .get_properties(&PropertyFilter::new(ALL_FILTER, "", Some(3)))
            .await;
        let second = service
            .get_properties(&PropertyFilter::new(ALL_FILTER, "", Some(3)).with_offset(3))
            .await;
        assert_eq!(
            PropertyFilter::new(ALL_FILTER, "", Some(3))
                .with_offset(3)
                .to_queries()
                .last(),
            Some(&Query::offset(3))
        );
        assert_eq!(second.len(), 3);
        assert_eq!(second[0].name, "Pine Villa");
        assert!(first.iter().all(|property| !second.contains(property)));
    }

    #[tokio::test]
    async fn unknown_id_returns_none() {
        let (_backend, service) = seeded();
        assert!(service.get_property_by_id("does-not-exist").await.is_none());
        assert!(service
            .try_property_by_id("does-not-exist")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn known_id_returns_property() {
        let (backend, service) = seeded();
        let document = backend.insert_document(
            DB,
            COLLECTION,
            at(20),
            json!({ "name": "Sea Cottage", "address": "1 Bay Rd", "type": "House" }),
        );
        let property = service.get_property_by_id(&document.id).await.unwrap();
        assert_eq!(property.name, "Sea Cottage");
    }

    #[tokio::test]
    async fn failures_degrade_to_empty_results() {
        let (backend, service) = seeded();
        backend.set_offline(true);
        assert!(service.get_latest_properties().await.is_empty());
        assert!(service
            .get_properties(&PropertyFilter::default())
            .await
            .is_empty());
        assert!(service.try_latest_properties().await.is_err());
    }

    #[tokio::test]
    async fn missing_collection_config_degrades_to_empty() {
        let backend = Arc::new(MemoryBackend::new());
        let service = PropertyService::new(backend, CollectionRef::default());
        assert!(service.get_latest_properties().await.is_empty());
        assert!(service.get_property_by_id("any").await.is_none());
    }
}
