//! Session persistence.
//!
//! A session is written to two places: a cookie store (token and login flag,
//! seven-day expiry) and a durable local key/value store (token, flag, cached
//! user and cart). The cookie copy is authoritative for whether a session
//! exists; the local copy is a cache for profile data.
//!
//! Both stores sit behind traits so that callers can substitute in-memory
//! fakes in tests and file-backed stores in the CLI.

mod file;
mod memory;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use oakline_core::{AccessScope, CartSnapshot, UserProfile};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::StoreError;

pub use file::{FileCookieStore, FileLocalStore};
pub use memory::{InMemoryCookieStore, InMemoryLocalStore};

/// Session cookie lifetime in days.
pub const COOKIE_TTL_DAYS: i64 = 7;

/// Literal value of the login-flag cookie for a live session.
const LOGGED_IN: &str = "true";

/// A single cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Expiry instant; `None` for a session cookie.
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

impl Cookie {
    /// Create a cookie without an expiry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
        }
    }

    /// Set the cookie to expire `max_age` from now.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.expires = Some(Utc::now() + max_age);
        self
    }

    /// Returns `true` once the expiry instant has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires.is_some_and(|expires| expires <= Utc::now())
    }
}

/// Cookie storage backend.
///
/// Implementations must treat expired cookies as absent.
#[async_trait::async_trait]
pub trait CookieStore: Send + Sync {
    /// Retrieve a live cookie by name.
    async fn get(&self, name: &str) -> Result<Option<Cookie>, StoreError>;

    /// Store a cookie, replacing any cookie with the same name.
    async fn set(&self, cookie: Cookie) -> Result<(), StoreError>;

    /// Remove a cookie. Removing a missing cookie is not an error.
    async fn remove(&self, name: &str) -> Result<(), StoreError>;
}

/// Durable key/value storage backend.
#[async_trait::async_trait]
pub trait LocalStore: Send + Sync {
    /// Retrieve a value by key.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store a value, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Names under which a session is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageKeys {
    /// Cookie holding the bearer token.
    pub token_cookie: &'static str,
    /// Cookie holding the `"true"` login flag.
    pub flag_cookie: &'static str,
    /// Local-store key for the token copy.
    pub token_key: &'static str,
    /// Local-store key for the login-flag copy.
    pub flag_key: &'static str,
    /// Local-store key for the cached user JSON.
    pub user_key: &'static str,
    /// Local-store key for the cached cart JSON.
    pub cart_key: &'static str,
}

impl StorageKeys {
    /// Storefront customer keys.
    pub const CUSTOMER: Self = Self {
        token_cookie: "userToken",
        flag_cookie: "isLoggedIn",
        token_key: "userToken",
        flag_key: "isLoggedIn",
        user_key: "user",
        cart_key: "cart",
    };

    /// Admin console keys.
    pub const ADMIN: Self = Self {
        token_cookie: "adminToken",
        flag_cookie: "isAdminLoggedIn",
        token_key: "adminToken",
        flag_key: "isAdminLoggedIn",
        user_key: "adminUser",
        cart_key: "adminCart",
    };

    /// Keys for the given access scope.
    #[must_use]
    pub const fn for_scope(scope: AccessScope) -> Self {
        match scope {
            AccessScope::Customer => Self::CUSTOMER,
            AccessScope::Admin => Self::ADMIN,
        }
    }
}

/// Dual-persistence session store.
///
/// Every mutation replaces the whole session; concurrent writers are
/// last-write-wins. Read accessors never fail: store errors are logged and
/// read as "absent".
#[derive(Clone)]
pub struct SessionStore {
    cookies: Arc<dyn CookieStore>,
    local: Arc<dyn LocalStore>,
    keys: StorageKeys,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a store over the given backends.
    #[must_use]
    pub fn new(
        cookies: Arc<dyn CookieStore>,
        local: Arc<dyn LocalStore>,
        keys: StorageKeys,
    ) -> Self {
        Self {
            cookies,
            local,
            keys,
        }
    }

    /// Create a store backed by fresh in-memory stores.
    #[must_use]
    pub fn in_memory(keys: StorageKeys) -> Self {
        Self::new(
            Arc::new(InMemoryCookieStore::new()),
            Arc::new(InMemoryLocalStore::new()),
            keys,
        )
    }

    /// The keys this store writes under.
    #[must_use]
    pub const fn keys(&self) -> StorageKeys {
        self.keys
    }

    /// Persist a new session, replacing whatever was stored before.
    ///
    /// The local copy is written first so the cached profile is in place by
    /// the time the cookies mark the session as live. A missing `user` or
    /// `cart` removes the previously cached value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if either backend fails to write.
    pub async fn persist(
        &self,
        token: &str,
        user: Option<&Value>,
        cart: Option<&Value>,
    ) -> Result<(), StoreError> {
        let keys = self.keys;

        self.local.set(keys.token_key, token).await?;
        self.local.set(keys.flag_key, LOGGED_IN).await?;
        self.write_json(keys.user_key, user).await?;
        self.write_json(keys.cart_key, cart).await?;

        let ttl = Duration::days(COOKIE_TTL_DAYS);
        self.cookies
            .set(Cookie::new(keys.token_cookie, token).with_max_age(ttl))
            .await?;
        self.cookies
            .set(Cookie::new(keys.flag_cookie, LOGGED_IN).with_max_age(ttl))
            .await?;

        debug!(scope_cookie = keys.token_cookie, "Session persisted");
        Ok(())
    }

    /// Remove every persisted trace of the session.
    ///
    /// Attempts every removal even if an earlier one fails, then reports the
    /// first failure. Clearing an already-empty store is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first `StoreError` encountered.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let keys = self.keys;
        let results = [
            self.cookies.remove(keys.token_cookie).await,
            self.cookies.remove(keys.flag_cookie).await,
            self.local.remove(keys.token_key).await,
            self.local.remove(keys.flag_key).await,
            self.local.remove(keys.user_key).await,
            self.local.remove(keys.cart_key).await,
        ];

        debug!(scope_cookie = keys.token_cookie, "Session cleared");
        results.into_iter().collect()
    }

    /// Current bearer token, read from the cookie copy only.
    pub async fn token(&self) -> Option<SecretString> {
        self.cookie_value(self.keys.token_cookie)
            .await
            .filter(|token| !token.is_empty())
            .map(SecretString::from)
    }

    /// Whether a session is live.
    ///
    /// True iff the token cookie is present and the flag cookie is exactly
    /// `"true"`. The local store is never consulted.
    pub async fn is_logged_in(&self) -> bool {
        self.token().await.is_some()
            && self.cookie_value(self.keys.flag_cookie).await.as_deref() == Some(LOGGED_IN)
    }

    /// Cached user profile exactly as it was stored, if it is a JSON object.
    pub async fn stored_user(&self) -> Option<UserProfile> {
        self.read_json(self.keys.user_key).await
    }

    /// Cached cart snapshot, if one was stored.
    pub async fn stored_cart(&self) -> Option<CartSnapshot> {
        self.read_json(self.keys.cart_key).await
    }

    async fn cookie_value(&self, name: &str) -> Option<String> {
        match self.cookies.get(name).await {
            Ok(cookie) => cookie.map(|c| c.value),
            Err(e) => {
                warn!(cookie = name, error = %e, "Failed to read cookie");
                None
            }
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.local.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Failed to read local store");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| warn!(key, error = %e, "Ignoring unparsable cached value"))
            .ok()
    }

    async fn write_json(&self, key: &str, value: Option<&Value>) -> Result<(), StoreError> {
        match value {
            Some(value) => self.local.set(key, &serde_json::to_string(value)?).await,
            None => self.local.remove(key).await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_cookie_expiry() {
        let live = Cookie::new("userToken", "t").with_max_age(Duration::days(COOKIE_TTL_DAYS));
        assert!(!live.is_expired());

        let stale = Cookie::new("userToken", "t").with_max_age(Duration::seconds(-1));
        assert!(stale.is_expired());

        assert!(!Cookie::new("session", "t").is_expired());
    }

    #[test]
    fn test_scope_keys_do_not_collide() {
        let customer = StorageKeys::for_scope(AccessScope::Customer);
        let admin = StorageKeys::for_scope(AccessScope::Admin);
        assert_eq!(customer.token_cookie, "userToken");
        assert_eq!(admin.token_cookie, "adminToken");
        assert_ne!(customer.user_key, admin.user_key);
    }

    #[tokio::test]
    async fn test_persist_then_read_back() {
        let store = SessionStore::in_memory(StorageKeys::CUSTOMER);
        let user = json!({"id": 1, "name": "A", "email": "a@b.com"});
        let cart = json!({"items": []});

        store.persist("tok123", Some(&user), Some(&cart)).await.unwrap();

        assert!(store.is_logged_in().await);
        assert_eq!(store.token().await.unwrap().expose_secret(), "tok123");
        assert_eq!(store.stored_user().await.unwrap().name(), Some("A"));
        assert_eq!(store.stored_cart().await.unwrap().as_value(), &cart);
    }

    #[tokio::test]
    async fn test_persist_replaces_previous_session() {
        let store = SessionStore::in_memory(StorageKeys::CUSTOMER);
        let cart = json!({"items": [1]});
        store
            .persist("first", Some(&json!({"id": 1, "name": "A", "email": "a@b.com"})), Some(&cart))
            .await
            .unwrap();

        store.persist("second", None, None).await.unwrap();

        assert_eq!(store.token().await.unwrap().expose_secret(), "second");
        assert!(store.stored_user().await.is_none());
        assert!(store.stored_cart().await.is_none());
    }

    #[tokio::test]
    async fn test_cookie_is_source_of_truth() {
        let cookies = Arc::new(InMemoryCookieStore::new());
        let local = Arc::new(InMemoryLocalStore::new());
        let store = SessionStore::new(cookies.clone(), local.clone(), StorageKeys::CUSTOMER);

        // Local copy alone does not make a session.
        local.set("userToken", "stale").await.unwrap();
        local.set("isLoggedIn", "true").await.unwrap();
        assert!(!store.is_logged_in().await);

        // Token cookie without the exact flag literal is not a session either.
        cookies.set(Cookie::new("userToken", "tok")).await.unwrap();
        cookies.set(Cookie::new("isLoggedIn", "1")).await.unwrap();
        assert!(!store.is_logged_in().await);

        cookies.set(Cookie::new("isLoggedIn", "true")).await.unwrap();
        assert!(store.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_clear_is_idempotent() {
        let store = SessionStore::in_memory(StorageKeys::ADMIN);
        store
            .persist("tok", Some(&json!({"id": 9, "name": "Admin", "email": "x@y.z"})), None)
            .await
            .unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(!store.is_logged_in().await);
        assert!(store.token().await.is_none());
        assert!(store.stored_user().await.is_none());
    }

    #[tokio::test]
    async fn test_unparsable_cache_reads_as_absent() {
        let local = Arc::new(InMemoryLocalStore::new());
        let store = SessionStore::new(
            Arc::new(InMemoryCookieStore::new()),
            local.clone(),
            StorageKeys::CUSTOMER,
        );
        local.set("user", "{not json").await.unwrap();

        assert!(store.stored_user().await.is_none());
    }
}
