use super::{Alert, Navigation, Route, ScreenOutcome};
use crate::auth::AuthService;
use crate::backend::Backend;
use crate::util::{link_credentials, normalize_text_option};

const VERIFIED: &str = "Email verified successfully!";
const FALLBACK_FAILURE: &str = "Verification failed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyEmailStatus {
    /// Link parameters are missing; nothing to verify.
    Idle,
    Verifying,
    Verified,
    Failed(String),
}

/// Landing screen for the verification deep link (`/verify-email?userId=..&secret=..`).
pub struct VerifyEmailScreen<B> {
    auth: AuthService<B>,
    user_id: Option<String>,
    secret: Option<String>,
    status: VerifyEmailStatus,
}

impl<B: Backend> VerifyEmailScreen<B> {
    pub fn new(auth: AuthService<B>, user_id: Option<String>, secret: Option<String>) -> Self {
        Self {
            auth,
            user_id: normalize_text_option(user_id),
            secret: normalize_text_option(secret),
            status: VerifyEmailStatus::Idle,
        }
    }

    /// Build from the full deep-link URL the app was opened with.
    pub fn from_link(auth: AuthService<B>, link: &str) -> Self {
        let (user_id, secret) = link_credentials(link).unwrap_or_default();
        Self::new(auth, user_id, secret)
    }

    pub const fn status(&self) -> &VerifyEmailStatus {
        &self.status
    }

    /// Runs once the link parameters are known.
    pub async fn on_params(&mut self) -> ScreenOutcome {
        let (Some(user_id), Some(secret)) = (self.user_id.clone(), self.secret.clone()) else {
            return ScreenOutcome::none();
        };
        tracing::debug!("Verifying email for user {}", user_id);

        self.status = VerifyEmailStatus::Verifying;
        match self.auth.verify_email(&user_id, &secret).await {
            Ok(()) => {
                self.status = VerifyEmailStatus::Verified;
                ScreenOutcome::alert(Alert::success(VERIFIED)).then(Navigation::Push(Route::SignIn))
            }
            Err(error) => {
                let message = error.to_string();
                let message = if message.trim().is_empty() {
                    FALLBACK_FAILURE.to_string()
                } else {
                    message
                };
                self.status = VerifyEmailStatus::Failed(message.clone());
                ScreenOutcome::alert(Alert::error(message))
            }
        }
    }
}
