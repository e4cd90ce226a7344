use std::sync::Arc;

use super::{filled, Alert, Navigation, Route, ScreenOutcome};
use crate::auth::{AuthError, AuthService};
use crate::backend::Backend;
use crate::state::{GlobalProvider, ProviderScope, StateError};

const MISSING_FIELDS: &str = "Please fill in all fields.";
const CREATED: &str = "Account created successfully. You can now log in.";
const FALLBACK_FAILURE: &str = "Registration failed.";

pub struct SignUpScreen<B> {
    auth: AuthService<B>,
    global: Arc<GlobalProvider<B>>,
    pub name: String,
    pub email: String,
    pub password: String,
    loading: bool,
}

impl<B: Backend> SignUpScreen<B> {
    pub fn mount(auth: AuthService<B>, scope: &ProviderScope<B>) -> Result<Self, StateError> {
        Ok(Self {
            auth,
            global: scope.use_global_context()?,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            loading: false,
        })
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub async fn submit(&mut self) -> ScreenOutcome {
        let (Some(name), Some(email), false) = (
            filled(&self.name),
            filled(&self.email),
            self.password.is_empty(),
        ) else {
            return ScreenOutcome::alert(Alert::error(MISSING_FIELDS));
        };
        let (name, email) = (name.to_string(), email.to_string());

        self.loading = true;
        let result = self.auth.register(&email, &self.password, &name).await;
        self.loading = false;

        match result {
            Ok(_) => {
                self.global.refetch(None).await;
                ScreenOutcome::alert(Alert::success(CREATED)).then(Navigation::Push(Route::SignIn))
            }
            Err(error) => ScreenOutcome::alert(Alert::error(failure_message(&error))),
        }
    }

    /// Link below the form.
    pub const fn sign_in_link() -> Navigation {
        Navigation::Push(Route::SignIn)
    }
}

fn failure_message(error: &AuthError) -> String {
    let message = error.to_string();
    if message.trim().is_empty() {
        FALLBACK_FAILURE.to_string()
    } else {
        message
    }
}
