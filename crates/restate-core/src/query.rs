//! Document query builder.
//!
//! Queries are encoded the way the Appwrite REST API expects them: one JSON
//! object per query, passed as repeated `queries[]` parameters.

use serde_json::{json, Value};

/// System attribute holding a document's creation timestamp.
pub const CREATED_AT: &str = "$createdAt";

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    OrderAsc(String),
    OrderDesc(String),
    Equal { attribute: String, values: Vec<Value> },
    Search { attribute: String, value: String },
    Limit(usize),
    Offset(usize),
    Or(Vec<Query>),
}

impl Query {
    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Self::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Self::OrderDesc(attribute.into())
    }

    pub fn equal(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            values: vec![value.into()],
        }
    }

    pub fn search(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Search {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub const fn limit(limit: usize) -> Self {
        Self::Limit(limit)
    }

    pub const fn offset(offset: usize) -> Self {
        Self::Offset(offset)
    }

    pub const fn or(queries: Vec<Self>) -> Self {
        Self::Or(queries)
    }

    /// JSON object form of this query.
    pub fn to_value(&self) -> Value {
        match self {
            Self::OrderAsc(attribute) => json!({ "method": "orderAsc", "attribute": attribute }),
            Self::OrderDesc(attribute) => {
                json!({ "method": "orderDesc", "attribute": attribute })
            }
            Self::Equal { attribute, values } => {
                json!({ "method": "equal", "attribute": attribute, "values": values })
            }
            Self::Search { attribute, value } => {
                json!({ "method": "search", "attribute": attribute, "values": [value] })
            }
            Self::Limit(limit) => json!({ "method": "limit", "values": [limit] }),
            Self::Offset(offset) => json!({ "method": "offset", "values": [offset] }),
            Self::Or(queries) => json!({
                "method": "or",
                "values": queries.iter().map(Self::to_value).collect::<Vec<_>>(),
            }),
        }
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.to_value())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn order_and_limit_encode_as_json() {
        assert_eq!(
            Query::order_desc(CREATED_AT).to_string(),
            r#"{"attribute":"$createdAt","method":"orderDesc"}"#
        );
        assert_eq!(
            Query::limit(5).to_string(),
            r#"{"method":"limit","values":[5]}"#
        );
    }

    #[test]
    fn or_nests_inner_queries() {
        let query = Query::or(vec![
            Query::search("name", "lake"),
            Query::search("address", "lake"),
        ]);
        let value = query.to_value();
        assert_eq!(value["method"], "or");
        assert_eq!(value["values"][1]["attribute"], "address");
        assert_eq!(value["values"][0]["values"][0], "lake");
    }
}
