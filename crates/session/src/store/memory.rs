//! In-memory store backends.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::{Cookie, CookieStore, LocalStore};
use crate::error::StoreError;

/// In-memory cookie jar.
///
/// Suitable for tests and for embedding the session layer in a process that
/// does not need the session to outlive it.
#[derive(Debug, Default)]
pub struct InMemoryCookieStore {
    cookies: RwLock<HashMap<String, Cookie>>,
}

impl InMemoryCookieStore {
    /// Creates an empty cookie jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CookieStore for InMemoryCookieStore {
    async fn get(&self, name: &str) -> Result<Option<Cookie>, StoreError> {
        let cookies = self.cookies.read().await;
        Ok(cookies.get(name).filter(|c| !c.is_expired()).cloned())
    }

    async fn set(&self, cookie: Cookie) -> Result<(), StoreError> {
        self.cookies
            .write()
            .await
            .insert(cookie.name.clone(), cookie);
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.cookies.write().await.remove(name);
        Ok(())
    }
}

/// In-memory key/value store.
#[derive(Debug, Default)]
pub struct InMemoryLocalStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryLocalStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl LocalStore for InMemoryLocalStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
