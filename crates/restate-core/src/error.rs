//! Error types for restate-core

use thiserror::Error;

/// Result type alias using restate-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by backend calls
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration value was never provided
    #[error("Backend is not configured: missing {0}")]
    NotConfigured(&'static str),

    /// A configuration value was provided but is unusable
    #[error("Invalid backend configuration: {0}")]
    InvalidConfiguration(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error response returned by the backend
    #[error("{message} ({status})")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// Session persistence error
    #[error("Session storage error: {0}")]
    SessionStorage(String),
}

impl Error {
    /// Whether the backend reported a missing resource.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Api { status: 404, .. })
    }

    /// Whether the caller has no valid session.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Human-readable message without transport decoration.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
