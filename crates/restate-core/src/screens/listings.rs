use crate::backend::Backend;
use crate::listings::{PropertyFilter, PropertyService, ALL_FILTER};
use crate::models::{Property, User};
use crate::state::{GlobalSnapshot, ProviderScope, StateError};

/// Size of the "Our Recommendation" list on the home tab.
pub const RECOMMENDED_LIMIT: usize = 6;

/// Home tab: greeting, featured strip, recommendations.
pub struct HomeScreen<B> {
    listings: PropertyService<B>,
    global: GlobalSnapshot,
    pub filter: String,
    pub featured: Vec<Property>,
    pub recommended: Vec<Property>,
    loading: bool,
}

impl<B: Backend> HomeScreen<B> {
    pub fn mount(listings: PropertyService<B>, scope: &ProviderScope<B>) -> Result<Self, StateError> {
        Ok(Self {
            listings,
            global: scope.use_global_context()?.snapshot(),
            filter: ALL_FILTER.to_string(),
            featured: Vec::new(),
            recommended: Vec::new(),
            loading: false,
        })
    }

    pub fn user(&self) -> Option<&User> {
        self.global.user.as_ref()
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub async fn load(&mut self) {
        self.loading = true;
        self.featured = self.listings.get_latest_properties().await;
        self.recommended = self
            .listings
            .get_properties(&PropertyFilter::new(
                self.filter.clone(),
                "",
                Some(RECOMMENDED_LIMIT),
            ))
            .await;
        self.loading = false;
    }

    /// Change the category chip and reload recommendations.
    pub async fn set_filter(&mut self, filter: impl Into<String>) {
        self.filter = filter.into();
        self.load().await;
    }
}

/// Explore tab: search box plus category filter over every listing.
pub struct ExploreScreen<B> {
    listings: PropertyService<B>,
    pub filter: String,
    pub query: String,
    pub results: Vec<Property>,
}

impl<B: Backend> ExploreScreen<B> {
    pub fn new(listings: PropertyService<B>) -> Self {
        Self {
            listings,
            filter: ALL_FILTER.to_string(),
            query: String::new(),
            results: Vec::new(),
        }
    }

    pub async fn search(&mut self) -> &[Property] {
        let filter = PropertyFilter::new(self.filter.clone(), self.query.clone(), None);
        self.results = self.listings.get_properties(&filter).await;
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::config::CollectionRef;
    use crate::screens::fixtures::harness;

    fn service(h: &crate::screens::fixtures::Harness) -> PropertyService<crate::backend::MemoryBackend> {
        for (day, name, kind) in [
            (1, "Lake Cabin", "House"),
            (2, "Bay Apartment", "Apartment"),
            (3, "Hill Villa", "Villa"),
        ] {
            h.backend.insert_document(
                "db",
                "properties",
                Utc.with_ymd_and_hms(2024, 9, day, 8, 0, 0).unwrap(),
                json!({ "name": name, "address": "Somewhere", "type": kind }),
            );
        }
        PropertyService::new(Arc::clone(&h.backend), CollectionRef::new("db", "properties"))
    }

    #[tokio::test]
    async fn home_loads_featured_and_filtered_recommendations() {
        let h = harness();
        let mut screen = HomeScreen::mount(service(&h), &h.scope).unwrap();
        screen.load().await;
        assert_eq!(screen.featured.len(), 3);
        assert_eq!(screen.featured[0].name, "Lake Cabin");
        assert_eq!(screen.recommended[0].name, "Hill Villa");
        assert!(screen.user().is_none());

        screen.set_filter("Apartment").await;
        assert_eq!(screen.recommended.len(), 1);
        assert_eq!(screen.recommended[0].kind, "Apartment");
        assert!(!screen.loading());
    }

    #[tokio::test]
    async fn explore_searches_across_fields() {
        let h = harness();
        let mut screen = ExploreScreen::new(service(&h));
        screen.query = "villa".to_string();
        let results = screen.search().await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Hill Villa");
    }
}
