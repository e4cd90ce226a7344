use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored record in an Appwrite collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$collectionId", default)]
    pub collection_id: String,
    #[serde(rename = "$databaseId", default)]
    pub database_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// String attribute, or `None` when absent or not a string.
    pub fn text(&self, attribute: &str) -> Option<&str> {
        self.fields.get(attribute).and_then(Value::as_str)
    }

    /// Attribute value including the `$`-prefixed system attributes.
    pub fn attribute(&self, attribute: &str) -> Option<Value> {
        match attribute {
            "$id" => Some(Value::String(self.id.clone())),
            "$createdAt" => Some(Value::String(self.created_at.to_rfc3339())),
            "$updatedAt" => Some(Value::String(self.updated_at.to_rfc3339())),
            _ => self.fields.get(attribute).cloned(),
        }
    }
}

/// Page of documents returned by a list call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Document>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keeps_custom_attributes() {
        let payload = r#"{
            "$id": "prop-1",
            "$collectionId": "properties",
            "$databaseId": "restate",
            "$createdAt": "2024-11-02T09:00:00.000+00:00",
            "$updatedAt": "2024-11-02T09:00:00.000+00:00",
            "$permissions": [],
            "name": "Lakeside Loft",
            "price": 420000
        }"#;
        let document: Document = serde_json::from_str(payload).unwrap();
        assert_eq!(document.text("name"), Some("Lakeside Loft"));
        assert_eq!(document.text("price"), None);
        assert_eq!(
            document.attribute("$id"),
            Some(Value::String("prop-1".to_string()))
        );
    }
}
