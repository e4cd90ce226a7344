//! Headless screen controllers.
//!
//! Each screen keeps its form state and turns a submit into a
//! `ScreenOutcome`: an optional alert to show and an optional navigation.
//! Rendering is left to the front end.

mod listings;
mod sign_in;
mod sign_up;
mod tabs;
mod verify_email;

use std::fmt;

pub use listings::{ExploreScreen, HomeScreen, RECOMMENDED_LIMIT};
pub use sign_in::SignInScreen;
pub use sign_up::SignUpScreen;
pub use tabs::{Tab, TabBarStyle, TabItem, TabsLayout};
pub use verify_email::{VerifyEmailScreen, VerifyEmailStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Explore,
    Profile,
    SignIn,
    SignUp,
    VerifyEmail,
}

impl Route {
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Explore => "/explore",
            Self::Profile => "/profile",
            Self::SignIn => "/sign-in",
            Self::SignUp => "/sign-up",
            Self::VerifyEmail => "/verify-email",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Push(Route),
    Replace(Route),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            title: "Success".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScreenOutcome {
    pub alert: Option<Alert>,
    pub navigation: Option<Navigation>,
}

impl ScreenOutcome {
    pub const fn none() -> Self {
        Self {
            alert: None,
            navigation: None,
        }
    }

    pub const fn alert(alert: Alert) -> Self {
        Self {
            alert: Some(alert),
            navigation: None,
        }
    }

    #[must_use]
    pub fn then(mut self, navigation: Navigation) -> Self {
        self.navigation = Some(navigation);
        self
    }
}

/// Trim a form field, returning `None` when it is blank.
fn filled(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use crate::auth::AuthService;
    use crate::backend::MemoryBackend;
    use crate::config::AppwriteConfig;
    use crate::state::{GlobalProvider, ProviderScope};

    pub struct Harness {
        pub backend: Arc<MemoryBackend>,
        pub auth: AuthService<MemoryBackend>,
        pub provider: Arc<GlobalProvider<MemoryBackend>>,
        pub scope: ProviderScope<MemoryBackend>,
    }

    pub fn harness() -> Harness {
        let backend = Arc::new(MemoryBackend::new());
        let auth = AuthService::new(Arc::clone(&backend), &AppwriteConfig::default());
        let provider = Arc::new(GlobalProvider::new(auth.clone()));
        let scope = ProviderScope::new(Arc::clone(&provider));
        Harness {
            backend,
            auth,
            provider,
            scope,
        }
    }
}
