//! Appwrite session persistence in the OS keychain.

#[cfg(test)]
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
#[cfg(test)]
use std::sync::OnceLock;

#[cfg(not(test))]
use keyring::Entry;
use restate_core::backend::SessionPersistence;
use restate_core::{Error, Result};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "restate-cli";

/// Stores the `X-Fallback-Cookies` value of a profile's session.
///
/// The keychain is read once per process; clones share the cached value so
/// requests within one command never wait on a keychain round-trip.
#[derive(Debug, Clone)]
pub struct KeyringSessionStore {
    username: String,
    cache: Arc<Mutex<CachedCookies>>,
}

#[derive(Debug, Default)]
struct CachedCookies {
    loaded: bool,
    cookies: Option<String>,
}

impl KeyringSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("appwrite_session:{profile_name}"),
            cache: Arc::new(Mutex::new(CachedCookies::default())),
        }
    }

    fn cache(&self) -> Result<MutexGuard<'_, CachedCookies>> {
        self.cache
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(test)]
    fn test_guard() -> Result<MutexGuard<'static, HashMap<String, String>>> {
        Self::test_store()
            .lock()
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }

    #[cfg(not(test))]
    fn read_stored(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(cookies) => Ok(Some(cookies)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn read_stored(&self) -> Result<Option<String>> {
        Ok(Self::test_guard()?.get(&self.username).cloned())
    }

    #[cfg(not(test))]
    fn write_stored(&self, cookies: &str) -> Result<()> {
        self.entry()?
            .set_password(cookies)
            .map_err(|error| Error::SessionStorage(error.to_string()))
    }

    #[cfg(test)]
    fn write_stored(&self, cookies: &str) -> Result<()> {
        Self::test_guard()?.insert(self.username.clone(), cookies.to_string());
        Ok(())
    }

    #[cfg(not(test))]
    fn delete_stored(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SessionStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn delete_stored(&self) -> Result<()> {
        Self::test_guard()?.remove(&self.username);
        Ok(())
    }
}

impl SessionPersistence for KeyringSessionStore {
    fn load_session(&self) -> Result<Option<String>> {
        let mut cache = self.cache()?;
        if !cache.loaded {
            cache.cookies = self.read_stored()?;
            cache.loaded = true;
        }
        Ok(cache.cookies.clone())
    }

    fn save_session(&self, cookies: &str) -> Result<()> {
        let mut cache = self.cache()?;
        cache.cookies = Some(cookies.to_string());
        cache.loaded = true;
        if let Err(error) = self.write_stored(cookies) {
            tracing::warn!("Session kept for this run only: {}", error);
        }
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut cache = self.cache()?;
        cache.cookies = None;
        cache.loaded = true;
        self.delete_stored()
    }
}
