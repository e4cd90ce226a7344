//! Backend configuration for client apps.
//!
//! Provides `AppwriteConfig`, the set of public identifiers every Restate
//! front end needs to reach the Appwrite project: endpoint, project id,
//! database id, and the per-collection ids. Values come from the process
//! environment and are intentionally not validated here; a missing value
//! surfaces as `Error::NotConfigured` on the first backend call that needs it.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Platform identifier registered with the Appwrite project.
pub const DEFAULT_PLATFORM: &str = "com.jsm.restate";
/// Deep-link scheme used for verification and OAuth redirects.
pub const APP_SCHEME: &str = "restate";

pub const ENV_ENDPOINT: &str = "APPWRITE_ENDPOINT";
pub const ENV_PROJECT_ID: &str = "APPWRITE_PROJECT_ID";
pub const ENV_DATABASE_ID: &str = "APPWRITE_DATABASE_ID";
pub const ENV_PROPERTIES_COLLECTION_ID: &str = "APPWRITE_PROPERTIES_COLLECTION_ID";
pub const ENV_GALLERIES_COLLECTION_ID: &str = "APPWRITE_GALLERIES_COLLECTION_ID";
pub const ENV_REVIEWS_COLLECTION_ID: &str = "APPWRITE_REVIEWS_COLLECTION_ID";
pub const ENV_AGENTS_COLLECTION_ID: &str = "APPWRITE_AGENTS_COLLECTION_ID";
pub const ENV_VERIFICATION_URL: &str = "RESTATE_VERIFICATION_URL";

/// Public Appwrite identifiers. Secret credentials never live here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppwriteConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub database_id: Option<String>,
    #[serde(default)]
    pub properties_collection_id: Option<String>,
    #[serde(default)]
    pub galleries_collection_id: Option<String>,
    #[serde(default)]
    pub reviews_collection_id: Option<String>,
    #[serde(default)]
    pub agents_collection_id: Option<String>,
    #[serde(default)]
    pub verification_url: Option<String>,
}

impl AppwriteConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| normalize_text_option(lookup(name));
        Self {
            endpoint: read(ENV_ENDPOINT),
            project_id: read(ENV_PROJECT_ID),
            platform: None,
            database_id: read(ENV_DATABASE_ID),
            properties_collection_id: read(ENV_PROPERTIES_COLLECTION_ID),
            galleries_collection_id: read(ENV_GALLERIES_COLLECTION_ID),
            reviews_collection_id: read(ENV_REVIEWS_COLLECTION_ID),
            agents_collection_id: read(ENV_AGENTS_COLLECTION_ID),
            verification_url: read(ENV_VERIFICATION_URL),
        }
    }

    /// Overlay values from `other`, keeping ours where `other` is empty.
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
            normalize_text_option(preferred).or_else(|| normalize_text_option(fallback))
        }

        Self {
            endpoint: pick(other.endpoint, self.endpoint),
            project_id: pick(other.project_id, self.project_id),
            platform: pick(other.platform, self.platform),
            database_id: pick(other.database_id, self.database_id),
            properties_collection_id: pick(
                other.properties_collection_id,
                self.properties_collection_id,
            ),
            galleries_collection_id: pick(
                other.galleries_collection_id,
                self.galleries_collection_id,
            ),
            reviews_collection_id: pick(other.reviews_collection_id, self.reviews_collection_id),
            agents_collection_id: pick(other.agents_collection_id, self.agents_collection_id),
            verification_url: pick(other.verification_url, self.verification_url),
        }
    }

    pub fn platform(&self) -> &str {
        self.platform.as_deref().unwrap_or(DEFAULT_PLATFORM)
    }

    /// Where verification emails should link back to.
    pub fn verification_url(&self) -> String {
        normalize_text_option(self.verification_url.clone())
            .unwrap_or_else(|| format!("{APP_SCHEME}://verify-email"))
    }

    /// Collection coordinates for property listings.
    pub fn properties_collection(&self) -> CollectionRef {
        CollectionRef {
            database_id: normalize_text_option(self.database_id.clone()),
            collection_id: normalize_text_option(self.properties_collection_id.clone()),
        }
    }
}

/// Database/collection pair, resolved lazily at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionRef {
    pub database_id: Option<String>,
    pub collection_id: Option<String>,
}

impl CollectionRef {
    pub fn new(database_id: impl Into<String>, collection_id: impl Into<String>) -> Self {
        Self {
            database_id: Some(database_id.into()),
            collection_id: Some(collection_id.into()),
        }
    }

    pub fn resolve(&self) -> Result<(&str, &str)> {
        let database_id = self
            .database_id
            .as_deref()
            .ok_or(Error::NotConfigured(ENV_DATABASE_ID))?;
        let collection_id = self
            .collection_id
            .as_deref()
            .ok_or(Error::NotConfigured(ENV_PROPERTIES_COLLECTION_ID))?;
        Ok((database_id, collection_id))
    }
}

/// Normalize an Appwrite endpoint so it always ends in `/v1`.
pub fn normalize_endpoint(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::NotConfigured(ENV_ENDPOINT));
    }
    if !is_http_url(trimmed) {
        return Err(Error::InvalidConfiguration(
            "Appwrite endpoint must include http:// or https://".to_string(),
        ));
    }
    if trimmed.ends_with("/v1") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{trimmed}/v1"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn from_lookup_reads_and_trims_values() {
        let config = AppwriteConfig::from_lookup(lookup_from(&[
            (ENV_ENDPOINT, " https://cloud.appwrite.io/v1 "),
            (ENV_PROJECT_ID, "restate"),
            (ENV_DATABASE_ID, "  "),
        ]));
        assert_eq!(
            config.endpoint.as_deref(),
            Some("https://cloud.appwrite.io/v1")
        );
        assert_eq!(config.project_id.as_deref(), Some("restate"));
        assert_eq!(config.database_id, None);
        assert_eq!(config.platform(), DEFAULT_PLATFORM);
    }

    #[test]
    fn missing_collection_surfaces_on_resolve() {
        let config = AppwriteConfig::from_lookup(lookup_from(&[(ENV_DATABASE_ID, "db")]));
        let error = config.properties_collection().resolve().unwrap_err();
        assert!(matches!(
            error,
            Error::NotConfigured(ENV_PROPERTIES_COLLECTION_ID)
        ));
    }

    #[test]
    fn merged_with_prefers_overlay_values() {
        let base = AppwriteConfig {
            endpoint: Some("https://env.example.com/v1".to_string()),
            project_id: Some("env-project".to_string()),
            ..Default::default()
        };
        let overlay = AppwriteConfig {
            project_id: Some("profile-project".to_string()),
            database_id: Some(" ".to_string()),
            ..Default::default()
        };
        let merged = base.merged_with(overlay);
        assert_eq!(merged.endpoint.as_deref(), Some("https://env.example.com/v1"));
        assert_eq!(merged.project_id.as_deref(), Some("profile-project"));
        assert_eq!(merged.database_id, None);
    }

    #[test]
    fn verification_url_defaults_to_app_scheme() {
        assert_eq!(
            AppwriteConfig::default().verification_url(),
            "restate://verify-email"
        );
    }

    #[test]
    fn normalize_endpoint_appends_version_path() {
        assert_eq!(
            normalize_endpoint("https://cloud.appwrite.io/").unwrap(),
            "https://cloud.appwrite.io/v1"
        );
        assert_eq!(
            normalize_endpoint("https://cloud.appwrite.io/v1").unwrap(),
            "https://cloud.appwrite.io/v1"
        );
        assert!(normalize_endpoint("cloud.appwrite.io").is_err());
    }
}
