use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use super::Document;

/// Read-only projection of a property listing document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    /// Remaining attributes (price, rating, image, relations, ...).
    pub attributes: Map<String, Value>,
}

impl From<Document> for Property {
    fn from(document: Document) -> Self {
        let mut attributes = document.fields;
        let mut take_text = |key: &str| match attributes.remove(key) {
            Some(Value::String(value)) => value,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        let name = take_text("name");
        let address = take_text("address");
        let kind = take_text("type");
        attributes.retain(|key, _| !key.starts_with('$'));

        Self {
            id: document.id,
            name,
            address,
            kind,
            created_at: document.created_at,
            attributes,
        }
    }
}

impl Property {
    /// Whether `needle` occurs in the name, address, or type (case-insensitive).
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.name, &self.address, &self.kind]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
