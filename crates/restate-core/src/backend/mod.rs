//! Backend-as-a-service collaborator.
//!
//! `Backend` lists the Appwrite operations Restate consumes. `AppwriteClient`
//! talks to a real project over HTTP; `MemoryBackend` keeps everything in
//! process for tests and offline demos.

mod appwrite;
mod memory;

use std::fmt;
use std::sync::{Arc, Mutex};

pub use appwrite::AppwriteClient;
pub use memory::MemoryBackend;

use crate::error::{Error, Result};
use crate::models::{Account, Document, DocumentList, Session, Token};
use crate::query::Query;

/// Session id that addresses the caller's active session.
pub const CURRENT_SESSION: &str = "current";

/// Remote operations consumed by the facades.
///
/// Every call is an opaque remote request with its own failure modes
/// (network, validation, not found); implementations never retry.
#[allow(async_fn_in_trait)]
pub trait Backend {
    async fn create_email_password_session(&self, email: &str, password: &str)
        -> Result<Session>;

    /// Exchange a `userId`/`secret` pair (OAuth callback, magic link) for a session.
    async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session>;

    async fn delete_session(&self, session_id: &str) -> Result<()>;

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account>;

    async fn create_verification(&self, url: &str) -> Result<Token>;

    async fn update_verification(&self, user_id: &str, secret: &str) -> Result<Token>;

    async fn get_account(&self) -> Result<Account>;

    /// URL of an avatar image rendered from the initials of `name`.
    fn initials_avatar_url(&self, name: &str) -> Result<String>;

    /// URL that starts an OAuth2 flow ending in a `userId`/`secret` redirect.
    fn oauth2_token_url(&self, provider: OAuthProvider, success: &str, failure: &str)
        -> Result<String>;

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList>;

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Apple,
    Github,
    Facebook,
}

impl OAuthProvider {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Apple => "apple",
            Self::Github => "github",
            Self::Facebook => "facebook",
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "apple" => Ok(Self::Apple),
            "github" => Ok(Self::Github),
            "facebook" => Ok(Self::Facebook),
            other => Err(Error::InvalidConfiguration(format!(
                "unsupported OAuth provider '{other}'"
            ))),
        }
    }
}

/// Client-generated document/account id, valid for Appwrite's id rules.
pub fn unique_id() -> String {
    uuid::Uuid::now_v7().simple().to_string()
}

/// Storage for the opaque session cookies the backend hands out.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> Result<Option<String>>;
    fn save_session(&self, cookies: &str) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

/// Process-local session storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    cookies: Arc<Mutex<Option<String>>>,
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> Result<Option<String>> {
        let guard = self
            .cookies
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        Ok(guard.clone())
    }

    fn save_session(&self, cookies: &str) -> Result<()> {
        let mut guard = self
            .cookies
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = Some(cookies.to_string());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut guard = self
            .cookies
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))?;
        *guard = None;
        Ok(())
    }
}
