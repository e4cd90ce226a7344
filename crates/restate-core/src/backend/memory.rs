//! In-process backend with Appwrite-like semantics.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::{unique_id, Backend, OAuthProvider, CURRENT_SESSION};
use crate::error::{Error, Result};
use crate::models::{Account, Document, DocumentList, Session, Token};
use crate::query::{Query, CREATED_AT};
use crate::util::initials;

const DEFAULT_LIST_LIMIT: usize = 25;
const MIN_PASSWORD_LEN: usize = 8;

/// In-memory `Backend` for testing and offline demos.
///
/// Mirrors the Appwrite behaviors the facades depend on: unique emails,
/// a single active session, 401 for guests, 404 for unknown documents, and
/// the default page size of 25.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    accounts: Vec<StoredAccount>,
    current_session: Option<Session>,
    sessions_created: usize,
    account_fetches: usize,
    verifications: Vec<SentVerification>,
    login_tokens: Vec<Token>,
    collections: HashMap<(String, String), Vec<Document>>,
    offline: bool,
    failing: HashSet<String>,
}

#[derive(Debug, Clone)]
struct StoredAccount {
    account: Account,
    password: String,
}

/// Verification email "sent" by the memory backend.
#[derive(Debug, Clone)]
pub struct SentVerification {
    pub token: Token,
    pub url: String,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Simulate a network outage for every subsequent call.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Make every call to `operation` fail until cleared.
    pub fn fail_operation(&self, operation: &str) {
        self.lock().failing.insert(operation.to_string());
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Register an account directly, bypassing the account API.
    pub fn seed_account(&self, email: &str, password: &str, name: &str) -> Account {
        let account = new_account(&unique_id(), email, name);
        self.lock().accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });
        account
    }

    /// Issue a one-time login token, as an OAuth callback would carry.
    pub fn issue_login_token(&self, user_id: &str) -> Token {
        let token = new_token(user_id);
        self.lock().login_tokens.push(token.clone());
        token
    }

    /// Store a document with an explicit creation time.
    pub fn insert_document(
        &self,
        database_id: &str,
        collection_id: &str,
        created_at: DateTime<Utc>,
        fields: Value,
    ) -> Document {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let document = Document {
            id: unique_id(),
            collection_id: collection_id.to_string(),
            database_id: database_id.to_string(),
            created_at,
            updated_at: created_at,
            fields,
        };
        self.lock()
            .collections
            .entry((database_id.to_string(), collection_id.to_string()))
            .or_default()
            .push(document.clone());
        document
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.lock()
            .accounts
            .iter()
            .map(|stored| stored.account.clone())
            .collect()
    }

    pub fn has_active_session(&self) -> bool {
        self.lock().current_session.is_some()
    }

    /// Total sessions ever created.
    pub fn sessions_created(&self) -> usize {
        self.lock().sessions_created
    }

    /// Number of `get_account` calls that reached the backend.
    pub fn account_fetches(&self) -> usize {
        self.lock().account_fetches
    }

    pub fn sent_verifications(&self) -> Vec<SentVerification> {
        self.lock().verifications.clone()
    }

    fn enter(&self, operation: &str) -> Result<MutexGuard<'_, MemoryState>> {
        let state = self.lock();
        if state.offline {
            return Err(Error::Unavailable("memory backend is offline".to_string()));
        }
        if state.failing.contains(operation) {
            return Err(Error::Unavailable(format!("{operation} failed")));
        }
        Ok(state)
    }
}

impl MemoryState {
    fn current_account(&self) -> Result<&StoredAccount> {
        let session = self.current_session.as_ref().ok_or_else(guest_error)?;
        self.accounts
            .iter()
            .find(|stored| stored.account.id == session.user_id)
            .ok_or_else(guest_error)
    }

    fn open_session(&mut self, user_id: &str, provider: &str) -> Result<Session> {
        if self.current_session.is_some() {
            return Err(api_error(
                401,
                "user_session_already_exists",
                "Creation of a session is prohibited when a session is active.",
            ));
        }
        let session = Session {
            id: unique_id(),
            user_id: user_id.to_string(),
            expire: Some(Utc::now() + chrono::Duration::days(365)),
            provider: provider.to_string(),
            secret: String::new(),
            current: true,
        };
        self.current_session = Some(session.clone());
        self.sessions_created += 1;
        Ok(session)
    }
}

impl Backend for MemoryBackend {
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let mut state = self.enter("create_email_password_session")?;
        let user_id = state
            .accounts
            .iter()
            .find(|stored| {
                stored.account.email.eq_ignore_ascii_case(email) && stored.password == password
            })
            .map(|stored| stored.account.id.clone())
            .ok_or_else(|| {
                api_error(
                    401,
                    "user_invalid_credentials",
                    "Invalid credentials. Please check the email and password.",
                )
            })?;
        state.open_session(&user_id, "email")
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session> {
        let mut state = self.enter("create_session")?;
        let position = state
            .login_tokens
            .iter()
            .position(|token| token.user_id == user_id && token.secret == secret)
            .ok_or_else(|| {
                api_error(
                    401,
                    "user_invalid_token",
                    "Invalid token passed in the request.",
                )
            })?;
        state.login_tokens.remove(position);
        state.open_session(user_id, "token")
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let mut state = self.enter("delete_session")?;
        let matches = state
            .current_session
            .as_ref()
            .is_some_and(|session| session_id == CURRENT_SESSION || session.id == session_id);
        if !matches {
            return Err(guest_error());
        }
        state.current_session = None;
        Ok(())
    }

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account> {
        let mut state = self.enter("create_account")?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(api_error(
                400,
                "general_argument_invalid",
                "Invalid `password` param: Password must be between 8 and 256 characters long.",
            ));
        }
        let taken = state.accounts.iter().any(|stored| {
            stored.account.id == user_id || stored.account.email.eq_ignore_ascii_case(email)
        });
        if taken {
            return Err(api_error(
                409,
                "user_already_exists",
                "A user with the same id, email, or phone already exists in this project.",
            ));
        }

        let account = new_account(user_id, email, name);
        state.accounts.push(StoredAccount {
            account: account.clone(),
            password: password.to_string(),
        });
        Ok(account)
    }

    async fn create_verification(&self, url: &str) -> Result<Token> {
        let mut state = self.enter("create_verification")?;
        let user_id = state.current_account()?.account.id.clone();
        let token = new_token(&user_id);
        state.verifications.push(SentVerification {
            token: token.clone(),
            url: url.to_string(),
        });
        Ok(token)
    }

    async fn update_verification(&self, user_id: &str, secret: &str) -> Result<Token> {
        let mut state = self.enter("update_verification")?;
        let token = state
            .verifications
            .iter()
            .map(|sent| sent.token.clone())
            .find(|token| token.user_id == user_id && token.secret == secret)
            .ok_or_else(|| {
                api_error(
                    401,
                    "user_invalid_token",
                    "Invalid token passed in the request.",
                )
            })?;
        if let Some(stored) = state
            .accounts
            .iter_mut()
            .find(|stored| stored.account.id == user_id)
        {
            stored.account.email_verification = true;
        }
        Ok(token)
    }

    async fn get_account(&self) -> Result<Account> {
        // Suspend once so concurrent callers interleave like real network calls.
        tokio::task::yield_now().await;
        let mut state = self.enter("get_account")?;
        state.account_fetches += 1;
        Ok(state.current_account()?.account.clone())
    }

    fn initials_avatar_url(&self, name: &str) -> Result<String> {
        Ok(format!(
            "memory://avatars/initials?name={}&initials={}",
            urlencoding::encode(name),
            initials(name)
        ))
    }

    fn oauth2_token_url(
        &self,
        provider: OAuthProvider,
        success: &str,
        failure: &str,
    ) -> Result<String> {
        Ok(format!(
            "memory://account/tokens/oauth2/{provider}?success={}&failure={}",
            urlencoding::encode(success),
            urlencoding::encode(failure)
        ))
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let state = self.enter("list_documents")?;
        let documents = state
            .collections
            .get(&(database_id.to_string(), collection_id.to_string()))
            .ok_or_else(|| {
                api_error(
                    404,
                    "collection_not_found",
                    "Collection with the requested ID could not be found.",
                )
            })?;
        Ok(apply_queries(documents, queries))
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document> {
        let state = self.enter("get_document")?;
        state
            .collections
            .get(&(database_id.to_string(), collection_id.to_string()))
            .and_then(|documents| documents.iter().find(|doc| doc.id == document_id))
            .cloned()
            .ok_or_else(|| {
                api_error(
                    404,
                    "document_not_found",
                    "Document with the requested ID could not be found.",
                )
            })
    }
}

fn apply_queries(documents: &[Document], queries: &[Query]) -> DocumentList {
    let mut matching = documents
        .iter()
        .filter(|document| queries.iter().all(|query| matches(document, query)))
        .cloned()
        .collect::<Vec<_>>();
    let total = matching.len() as u64;

    let orders = queries
        .iter()
        .filter_map(|query| match query {
            Query::OrderAsc(attribute) => Some((attribute.as_str(), false)),
            Query::OrderDesc(attribute) => Some((attribute.as_str(), true)),
            _ => None,
        })
        .collect::<Vec<_>>();
    matching.sort_by(|left, right| {
        orders
            .iter()
            .map(|(attribute, descending)| {
                let ordering = compare_attribute(left, right, attribute);
                if *descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    let offset = queries
        .iter()
        .find_map(|query| match query {
            Query::Offset(offset) => Some(*offset),
            _ => None,
        })
        .unwrap_or(0);
    let limit = queries
        .iter()
        .find_map(|query| match query {
            Query::Limit(limit) => Some(*limit),
            _ => None,
        })
        .unwrap_or(DEFAULT_LIST_LIMIT);

    DocumentList {
        total,
        documents: matching.into_iter().skip(offset).take(limit).collect(),
    }
}

fn matches(document: &Document, query: &Query) -> bool {
    match query {
        Query::Equal { attribute, values } => document
            .attribute(attribute)
            .is_some_and(|value| values.contains(&value)),
        Query::Search { attribute, value } => {
            let Some(text) = document
                .attribute(attribute)
                .and_then(|value| value.as_str().map(str::to_lowercase))
            else {
                return false;
            };
            value
                .to_lowercase()
                .split_whitespace()
                .any(|word| text.contains(word))
        }
        Query::Or(inner) => inner.iter().any(|query| matches(document, query)),
        Query::OrderAsc(_) | Query::OrderDesc(_) | Query::Limit(_) | Query::Offset(_) => true,
    }
}

fn compare_attribute(left: &Document, right: &Document, attribute: &str) -> Ordering {
    if attribute == CREATED_AT {
        return left.created_at.cmp(&right.created_at);
    }
    match (left.attribute(attribute), right.attribute(attribute)) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn new_account(user_id: &str, email: &str, name: &str) -> Account {
    Account {
        id: user_id.to_string(),
        created_at: Utc::now(),
        name: name.to_string(),
        email: email.to_string(),
        email_verification: false,
        status: true,
    }
}

fn new_token(user_id: &str) -> Token {
    Token {
        id: unique_id(),
        user_id: user_id.to_string(),
        secret: unique_id(),
        expire: Some(Utc::now() + chrono::Duration::hours(1)),
    }
}

fn guest_error() -> Error {
    api_error(
        401,
        "general_unauthorized_scope",
        "User (role: guests) missing scope (account)",
    )
}

fn api_error(status: u16, kind: &str, message: &str) -> Error {
    Error::Api {
        status,
        kind: kind.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 11, day, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn second_session_is_rejected_while_one_is_active() {
        let backend = MemoryBackend::new();
        backend.seed_account("jane@example.com", "password123", "Jane");

        backend
            .create_email_password_session("jane@example.com", "password123")
            .await
            .unwrap();
        let error = backend
            .create_email_password_session("jane@example.com", "password123")
            .await
            .unwrap_err();
        assert!(error.is_unauthorized());
    }

    #[tokio::test]
    async fn list_applies_filters_order_and_default_limit() {
        let backend = MemoryBackend::new();
        for day in 1..=28 {
            let kind = if day % 2 == 0 { "House" } else { "Villa" };
            backend.insert_document(
                "db",
                "properties",
                at(day),
                json!({ "name": format!("Listing {day}"), "type": kind }),
            );
        }

        let all = backend
            .list_documents("db", "properties", &[Query::order_desc(CREATED_AT)])
            .await
            .unwrap();
        assert_eq!(all.total, 28);
        assert_eq!(all.documents.len(), DEFAULT_LIST_LIMIT);
        assert_eq!(all.documents[0].created_at, at(28));

        let houses = backend
            .list_documents(
                "db",
                "properties",
                &[Query::equal("type", "House"), Query::limit(3)],
            )
            .await
            .unwrap();
        assert_eq!(houses.total, 14);
        assert_eq!(houses.documents.len(), 3);
        assert!(houses
            .documents
            .iter()
            .all(|doc| doc.text("type") == Some("House")));
    }

    #[tokio::test]
    async fn unknown_document_is_not_found() {
        let backend = MemoryBackend::new();
        backend.insert_document("db", "properties", at(1), json!({ "name": "Only" }));
        let error = backend
            .get_document("db", "properties", "missing")
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test]
    async fn offline_backend_fails_every_call() {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        assert!(matches!(
            backend.get_account().await,
            Err(Error::Unavailable(_))
        ));
    }
}
