//! Current-user state shared across screens.
//!
//! `GlobalProvider` owns the cached "current user" and is handed to screens
//! through a `ProviderScope`. Lifecycle per fetch:
//! `Uninitialized -> Loading -> Resolved(Some(user) | None)`.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crate::auth::AuthService;
use crate::backend::Backend;
use crate::models::User;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("use_global_context must be used within a GlobalProvider")]
    OutsideProvider,
}

/// Extra parameters passed along with a refetch request.
pub type RefetchParams = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UserState {
    #[default]
    Uninitialized,
    Loading,
    Resolved(Option<User>),
}

/// What screens read from the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalSnapshot {
    pub is_logged_in: bool,
    pub user: Option<User>,
    pub loading: bool,
}

pub struct GlobalProvider<B> {
    auth: AuthService<B>,
    state: Mutex<UserState>,
    last_params: Mutex<RefetchParams>,
    fetch_gate: tokio::sync::Mutex<()>,
}

impl<B: Backend> GlobalProvider<B> {
    pub fn new(auth: AuthService<B>) -> Self {
        Self {
            auth,
            state: Mutex::new(UserState::Uninitialized),
            last_params: Mutex::new(RefetchParams::new()),
            fetch_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// First fetch; later calls are no-ops once a fetch has started.
    pub async fn mount(&self) {
        let _gate = self.fetch_gate.lock().await;
        if matches!(self.current_state(), UserState::Uninitialized) {
            self.fetch(None).await;
        }
    }

    /// Re-fetch the current user. Concurrent calls run one after another.
    pub async fn refetch(&self, params: Option<RefetchParams>) {
        let _gate = self.fetch_gate.lock().await;
        self.fetch(params).await;
    }

    /// Callers hold `fetch_gate`.
    async fn fetch(&self, params: Option<RefetchParams>) {
        let params = params.unwrap_or_default();
        tracing::debug!("Refetching current user (params: {:?})", params);
        *lock(&self.last_params) = params;
        *lock(&self.state) = UserState::Loading;

        let user = self.auth.get_current_user().await;
        *lock(&self.state) = UserState::Resolved(user);
    }

    /// Forget the cached user without asking the backend.
    pub fn invalidate(&self) {
        *lock(&self.state) = UserState::Resolved(None);
    }

    pub fn current_state(&self) -> UserState {
        lock(&self.state).clone()
    }

    pub fn last_params(&self) -> RefetchParams {
        lock(&self.last_params).clone()
    }

    pub fn snapshot(&self) -> GlobalSnapshot {
        match self.current_state() {
            UserState::Uninitialized => GlobalSnapshot::default(),
            UserState::Loading => GlobalSnapshot {
                loading: true,
                ..GlobalSnapshot::default()
            },
            UserState::Resolved(user) => GlobalSnapshot {
                is_logged_in: user.is_some(),
                user,
                loading: false,
            },
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.snapshot().is_logged_in
    }

    pub fn user(&self) -> Option<User> {
        self.snapshot().user
    }

    pub fn loading(&self) -> bool {
        self.snapshot().loading
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// The part of the app tree a screen is mounted in.
pub struct ProviderScope<B> {
    provider: Option<Arc<GlobalProvider<B>>>,
}

impl<B> Clone for ProviderScope<B> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
        }
    }
}

impl<B: Backend> ProviderScope<B> {
    pub const fn new(provider: Arc<GlobalProvider<B>>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A scope with no provider above it.
    pub const fn detached() -> Self {
        Self { provider: None }
    }

    pub fn use_global_context(&self) -> Result<Arc<GlobalProvider<B>>, StateError> {
        self.provider.clone().ok_or(StateError::OutsideProvider)
    }
}
