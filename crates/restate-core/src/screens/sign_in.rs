use std::sync::Arc;

use super::{filled, Alert, Navigation, Route, ScreenOutcome};
use crate::auth::AuthService;
use crate::backend::Backend;
use crate::state::{GlobalProvider, ProviderScope, StateError};

const MISSING_FIELDS: &str = "Please enter your email and password";
const INVALID_CREDENTIALS: &str = "Invalid email or password. Please try again!";

pub struct SignInScreen<B> {
    auth: AuthService<B>,
    global: Arc<GlobalProvider<B>>,
    pub email: String,
    pub password: String,
    loading: bool,
}

impl<B: Backend> SignInScreen<B> {
    pub fn mount(auth: AuthService<B>, scope: &ProviderScope<B>) -> Result<Self, StateError> {
        Ok(Self {
            auth,
            global: scope.use_global_context()?,
            email: String::new(),
            password: String::new(),
            loading: false,
        })
    }

    /// Whether a submit is in flight; the sign-in button is disabled meanwhile.
    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub async fn submit(&mut self) -> ScreenOutcome {
        let (Some(email), false) = (filled(&self.email), self.password.is_empty()) else {
            return ScreenOutcome::alert(Alert::error(MISSING_FIELDS));
        };
        let email = email.to_string();

        self.loading = true;
        let result = self.auth.login(&email, &self.password).await;
        self.loading = false;

        match result {
            Ok(_) => {
                self.global.refetch(None).await;
                ScreenOutcome::none().then(Navigation::Push(Route::Home))
            }
            Err(error) => {
                tracing::warn!("Sign-in failed: {}", error);
                ScreenOutcome::alert(Alert::error(INVALID_CREDENTIALS))
            }
        }
    }
}
