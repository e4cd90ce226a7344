//! Appwrite REST client.

use reqwest::header::{HeaderValue, ORIGIN};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{Backend, OAuthProvider, SessionPersistence};
use crate::config::{normalize_endpoint, AppwriteConfig, ENV_ENDPOINT, ENV_PROJECT_ID};
use crate::error::{Error, Result};
use crate::models::{Account, Document, DocumentList, Session, Token};
use crate::query::Query;
use crate::util::{compact_text, normalize_text_option};

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const RESPONSE_FORMAT_HEADER: &str = "X-Appwrite-Response-Format";
const RESPONSE_FORMAT: &str = "1.6.0";
const FALLBACK_COOKIES_HEADER: &str = "X-Fallback-Cookies";

/// HTTP client for an Appwrite project.
///
/// Endpoint and project id are optional at construction; requests made
/// without them fail with `Error::NotConfigured`.
#[derive(Clone)]
pub struct AppwriteClient<S: SessionPersistence> {
    endpoint: Option<String>,
    project_id: Option<String>,
    /// `appwrite-<os>://<platform>`, how Appwrite identifies a registered native client.
    origin: String,
    client: Client,
    store: S,
}

impl<S: SessionPersistence> AppwriteClient<S> {
    pub fn new(config: &AppwriteConfig, store: S) -> Result<Self> {
        let endpoint = normalize_text_option(config.endpoint.clone())
            .map(|endpoint| normalize_endpoint(&endpoint))
            .transpose()?;

        Ok(Self {
            endpoint,
            project_id: normalize_text_option(config.project_id.clone()),
            origin: format!("appwrite-{}://{}", std::env::consts::OS, config.platform()),
            client: Client::builder().build()?,
            store,
        })
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    fn endpoint(&self) -> Result<&str> {
        self.endpoint
            .as_deref()
            .ok_or(Error::NotConfigured(ENV_ENDPOINT))
    }

    fn project_id(&self) -> Result<&str> {
        self.project_id
            .as_deref()
            .ok_or(Error::NotConfigured(ENV_PROJECT_ID))
    }

    fn url(&self, path: &str) -> Result<String> {
        Ok(format!("{}{path}", self.endpoint()?))
    }

    fn prepare(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let mut request = request
            .header(PROJECT_HEADER, self.project_id()?)
            .header(RESPONSE_FORMAT_HEADER, RESPONSE_FORMAT)
            .header(ORIGIN, self.origin.as_str());
        if let Some(cookies) = self.store.load_session()? {
            request = request.header(FALLBACK_COOKIES_HEADER, cookies);
        }
        Ok(request)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        let response = self.prepare(request)?.send().await?;
        if let Some(cookies) = response
            .headers()
            .get(FALLBACK_COOKIES_HEADER)
            .and_then(|value: &HeaderValue| value.to_str().ok())
        {
            self.store.save_session(cookies)?;
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(parse_api_error(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.execute(request).await?;
        Ok(response.json::<T>().await?)
    }
}

impl<S: SessionPersistence> Backend for AppwriteClient<S> {
    async fn create_email_password_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session> {
        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });
        let request = self
            .client
            .post(self.url("/account/sessions/email")?)
            .json(&payload);
        self.send_json(request).await
    }

    async fn create_session(&self, user_id: &str, secret: &str) -> Result<Session> {
        let payload = serde_json::json!({
            "userId": user_id,
            "secret": secret,
        });
        let request = self
            .client
            .post(self.url("/account/sessions/token")?)
            .json(&payload);
        self.send_json(request).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let path = format!("/account/sessions/{}", urlencoding::encode(session_id));
        let request = self.client.delete(self.url(&path)?);
        match self.execute(request).await {
            Ok(_) => self.store.clear_session(),
            Err(error) if error.is_unauthorized() => {
                // The stored cookie no longer names a live session.
                self.store.clear_session()?;
                Err(error)
            }
            Err(error) => Err(error),
        }
    }

    async fn create_account(
        &self,
        user_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account> {
        let payload = serde_json::json!({
            "userId": user_id,
            "email": email,
            "password": password,
            "name": name,
        });
        let request = self.client.post(self.url("/account")?).json(&payload);
        self.send_json(request).await
    }

    async fn create_verification(&self, url: &str) -> Result<Token> {
        let payload = serde_json::json!({ "url": url });
        let request = self
            .client
            .post(self.url("/account/verification")?)
            .json(&payload);
        self.send_json(request).await
    }

    async fn update_verification(&self, user_id: &str, secret: &str) -> Result<Token> {
        let payload = serde_json::json!({
            "userId": user_id,
            "secret": secret,
        });
        let request = self
            .client
            .put(self.url("/account/verification")?)
            .json(&payload);
        self.send_json(request).await
    }

    async fn get_account(&self) -> Result<Account> {
        let request = self.client.get(self.url("/account")?);
        self.send_json(request).await
    }

    fn initials_avatar_url(&self, name: &str) -> Result<String> {
        Ok(format!(
            "{}/avatars/initials?name={}&project={}",
            self.endpoint()?,
            urlencoding::encode(name),
            urlencoding::encode(self.project_id()?),
        ))
    }

    fn oauth2_token_url(
        &self,
        provider: OAuthProvider,
        success: &str,
        failure: &str,
    ) -> Result<String> {
        Ok(format!(
            "{}/account/tokens/oauth2/{}?success={}&failure={}&project={}",
            self.endpoint()?,
            provider.as_str(),
            urlencoding::encode(success),
            urlencoding::encode(failure),
            urlencoding::encode(self.project_id()?),
        ))
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        let path = format!(
            "/databases/{}/collections/{}/documents",
            urlencoding::encode(database_id),
            urlencoding::encode(collection_id),
        );
        let params = queries
            .iter()
            .map(|query| ("queries[]", query.to_string()))
            .collect::<Vec<_>>();
        let request = self.client.get(self.url(&path)?).query(&params);
        self.send_json(request).await
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document> {
        let path = format!(
            "/databases/{}/collections/{}/documents/{}",
            urlencoding::encode(database_id),
            urlencoding::encode(collection_id),
            urlencoding::encode(document_id),
        );
        let request = self.client.get(self.url(&path)?);
        self.send_json(request).await
    }
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorResponse {
    message: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> Error {
    let (kind, message) = match serde_json::from_str::<AppwriteErrorResponse>(body) {
        Ok(payload) => (
            payload.kind.unwrap_or_default(),
            payload
                .message
                .map(|message| message.trim().to_string())
                .filter(|message| !message.is_empty()),
        ),
        Err(_) => (String::new(), None),
    };

    let message = message.unwrap_or_else(|| {
        let trimmed = compact_text(body);
        if trimmed.is_empty() {
            format!("HTTP {}", status.as_u16())
        } else {
            trimmed
        }
    });

    Error::Api {
        status: status.as_u16(),
        kind,
        message,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::backend::MemorySessionStore;

    fn configured_client() -> AppwriteClient<MemorySessionStore> {
        let config = AppwriteConfig {
            endpoint: Some("https://cloud.appwrite.io".to_string()),
            project_id: Some("restate".to_string()),
            ..Default::default()
        };
        AppwriteClient::new(&config, MemorySessionStore::default()).unwrap()
    }

    #[test]
    fn parse_api_error_reads_appwrite_payload() {
        let body = r#"{"message":"Invalid credentials. Please check the email and password.","code":401,"type":"user_invalid_credentials","version":"1.6.0"}"#;
        let error = parse_api_error(StatusCode::UNAUTHORIZED, body);
        match error {
            Error::Api {
                status,
                kind,
                message,
            } => {
                assert_eq!(status, 401);
                assert_eq!(kind, "user_invalid_credentials");
                assert!(message.starts_with("Invalid credentials"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_api_error_falls_back_to_status() {
        let error = parse_api_error(StatusCode::BAD_GATEWAY, "  ");
        assert_eq!(error.user_message(), "HTTP 502");
    }

    #[test]
    fn avatar_url_encodes_name_and_project() {
        let url = configured_client().initials_avatar_url("Jane Doe").unwrap();
        assert_eq!(
            url,
            "https://cloud.appwrite.io/v1/avatars/initials?name=Jane%20Doe&project=restate"
        );
    }

    #[test]
    fn oauth_url_targets_provider() {
        let url = configured_client()
            .oauth2_token_url(OAuthProvider::Google, "restate://", "restate://")
            .unwrap();
        assert!(url.starts_with("https://cloud.appwrite.io/v1/account/tokens/oauth2/google?"));
        assert!(url.contains("success=restate%3A%2F%2F"));
    }

    #[test]
    fn requests_identify_project_platform_and_session() {
        let client = configured_client();
        client.store.save_session("a_session_restate=abc").unwrap();

        let request = client
            .prepare(client.client.get(client.url("/account").unwrap()))
            .unwrap()
            .build()
            .unwrap();
        let headers = request.headers();
        assert_eq!(headers[PROJECT_HEADER], "restate");
        assert_eq!(
            headers[ORIGIN],
            format!("appwrite-{}://com.jsm.restate", std::env::consts::OS).as_str()
        );
        assert_eq!(headers[FALLBACK_COOKIES_HEADER], "a_session_restate=abc");
    }

    #[test]
    fn custom_platform_changes_origin() {
        let config = AppwriteConfig {
            platform: Some("com.example.homes".to_string()),
            ..AppwriteConfig::default()
        };
        let client = AppwriteClient::new(&config, MemorySessionStore::default()).unwrap();
        assert!(client.origin().ends_with("://com.example.homes"));
    }

    #[test]
    fn missing_endpoint_fails_on_use_not_construction() {
        let client =
            AppwriteClient::new(&AppwriteConfig::default(), MemorySessionStore::default())
                .unwrap();
        let error = client.initials_avatar_url("Jane").unwrap_err();
        assert!(matches!(error, Error::NotConfigured(ENV_ENDPOINT)));
    }
}
