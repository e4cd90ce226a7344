//! Auth facade over the backend account service.
//!
//! Login and registration propagate `AuthError`; logout and current-user
//! retrieval absorb failures into `false` / `None`. Callers that need the
//! underlying error use the `try_` variants.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::backend::{unique_id, Backend, OAuthProvider, CURRENT_SESSION};
use crate::config::AppwriteConfig;
use crate::error::Error;
use crate::models::{Account, Session, User};
use crate::util::link_credentials;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("{}", .0.user_message())]
    Backend(#[from] Error),
    #[error("Registration failed while {stage}: {}", .source.user_message())]
    Registration {
        stage: RegistrationStage,
        /// Account created before the failing stage, if any.
        account_id: Option<String>,
        source: Error,
    },
    #[error("OAuth login failed: {0}")]
    OAuth(&'static str),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Steps of a registration, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    CreateAccount,
    CreateSession,
    SendVerification,
}

impl fmt::Display for RegistrationStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::CreateAccount => "creating the account",
            Self::CreateSession => "signing in the new account",
            Self::SendVerification => "sending the verification email",
        })
    }
}

pub struct AuthService<B> {
    backend: Arc<B>,
    verification_url: String,
}

impl<B> Clone for AuthService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            verification_url: self.verification_url.clone(),
        }
    }
}

impl<B: Backend> AuthService<B> {
    pub fn new(backend: Arc<B>, config: &AppwriteConfig) -> Self {
        Self {
            backend,
            verification_url: config.verification_url(),
        }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Session> {
        validate_credentials(email, password)?;
        let session = self
            .backend
            .create_email_password_session(email.trim(), password)
            .await?;
        tracing::info!("Signed in user {}", session.user_id);
        Ok(session)
    }

    /// Delete the current session. Never fails; `false` means the backend refused.
    pub async fn logout(&self) -> bool {
        match self.try_logout().await {
            Ok(()) => true,
            Err(error) => {
                tracing::error!("Logout failed: {}", error);
                false
            }
        }
    }

    pub async fn try_logout(&self) -> AuthResult<()> {
        self.backend.delete_session(CURRENT_SESSION).await?;
        tracing::info!("Signed out current session");
        Ok(())
    }

    /// Create an account, sign it in, and request a verification email.
    ///
    /// Best-effort: an account created before a later step fails stays in
    /// place (clients cannot delete accounts) and its id is reported in the
    /// error. A session opened for a registration whose verification request
    /// fails is deleted again.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> AuthResult<Account> {
        validate_credentials(email, password)?;
        if name.trim().is_empty() {
            return Err(AuthError::InvalidInput("Name is required"));
        }
        let email = email.trim();

        let account = self
            .backend
            .create_account(&unique_id(), email, password, name.trim())
            .await
            .map_err(|source| AuthError::Registration {
                stage: RegistrationStage::CreateAccount,
                account_id: None,
                source,
            })?;

        if let Err(source) = self
            .backend
            .create_email_password_session(email, password)
            .await
        {
            tracing::warn!("Account {} created but sign-in failed", account.id);
            return Err(AuthError::Registration {
                stage: RegistrationStage::CreateSession,
                account_id: Some(account.id),
                source,
            });
        }

        if let Err(source) = self
            .backend
            .create_verification(&self.verification_url)
            .await
        {
            tracing::warn!(
                "Verification email for account {} failed; closing session",
                account.id
            );
            if let Err(error) = self.backend.delete_session(CURRENT_SESSION).await {
                tracing::error!("Failed to close registration session: {}", error);
            }
            return Err(AuthError::Registration {
                stage: RegistrationStage::SendVerification,
                account_id: Some(account.id),
                source,
            });
        }

        tracing::info!("Registered account {}", account.id);
        Ok(account)
    }

    /// Confirm an email address with the `userId`/`secret` from the verification link.
    pub async fn verify_email(&self, user_id: &str, secret: &str) -> AuthResult<()> {
        if user_id.trim().is_empty() || secret.trim().is_empty() {
            return Err(AuthError::InvalidInput(
                "Verification link is missing userId or secret",
            ));
        }
        self.backend.update_verification(user_id, secret).await?;
        Ok(())
    }

    /// The signed-in user with an initials avatar, or `None` on any failure.
    pub async fn get_current_user(&self) -> Option<User> {
        match self.try_current_user().await {
            Ok(user) => Some(user),
            Err(error) => {
                tracing::debug!("No current user: {}", error);
                None
            }
        }
    }

    pub async fn try_current_user(&self) -> AuthResult<User> {
        let account = self.backend.get_account().await?;
        let avatar = self.backend.initials_avatar_url(&account.name)?;
        Ok(User::from_account(account, avatar))
    }

    /// URL to open in a browser to start an OAuth2 login.
    pub fn oauth_authorize_url(
        &self,
        provider: OAuthProvider,
        redirect_url: &str,
    ) -> AuthResult<String> {
        Ok(self
            .backend
            .oauth2_token_url(provider, redirect_url, redirect_url)?)
    }

    /// Finish an OAuth2 login from the redirect URL the browser landed on.
    pub async fn complete_oauth(&self, callback_url: &str) -> AuthResult<Session> {
        let (user_id, secret) = parse_oauth_callback(callback_url)?;
        let session = self.backend.create_session(&user_id, &secret).await?;
        tracing::info!("Signed in user {} via OAuth", session.user_id);
        Ok(session)
    }
}

fn validate_credentials(email: &str, password: &str) -> AuthResult<()> {
    if email.trim().is_empty() {
        return Err(AuthError::InvalidInput("Email is required"));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("Password is required"));
    }
    Ok(())
}

/// Extract `userId` and `secret` from an OAuth redirect URL.
pub fn parse_oauth_callback(callback_url: &str) -> AuthResult<(String, String)> {
    match link_credentials(callback_url) {
        Some((Some(user_id), Some(secret))) => Ok((user_id, secret)),
        Some(_) => Err(AuthError::OAuth("callback is missing userId or secret")),
        None => Err(AuthError::OAuth("callback is not a valid URL")),
    }
}
