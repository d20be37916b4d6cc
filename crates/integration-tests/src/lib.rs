//! Integration tests for Oakline.
//!
//! Every test runs the real session layer against a `wiremock` server, so no
//! external service is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p oakline-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `session_login` - Login, persistence and the pre-login boundary
//! - `session_registration` - Registration and validation errors
//! - `session_expiry` - 401 handling and redirect idempotence
//! - `session_profile` - Profile fetch and update
//! - `session_logout` - Logout with and without a cooperative service
//! - `admin_resources` - Admin services over the shared client

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use oakline_core::{AccessScope, Email};
use oakline_session::{
    Credentials, FileCookieStore, FileLocalStore, Navigator, SessionConfig, SessionManager,
    SessionStore, StorageKeys,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub use wiremock;

/// Navigator that records every navigation request.
///
/// The location stays fixed so that repeated expiries can be observed.
#[derive(Debug)]
pub struct RecordingNavigator {
    location: Option<String>,
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// A navigator currently showing `location`.
    #[must_use]
    pub fn at(location: &str) -> Arc<Self> {
        Arc::new(Self {
            location: Some(location.to_owned()),
            visits: Mutex::new(Vec::new()),
        })
    }

    /// Paths navigated to, in order.
    #[must_use]
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_location(&self) -> Option<String> {
        self.location.clone()
    }

    fn navigate(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_owned());
    }
}

/// A mock API plus a session manager pointed at it.
pub struct TestContext {
    pub server: MockServer,
    pub session: SessionManager,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestContext {
    /// Customer session with in-memory stores, browsing `/products`.
    pub async fn new() -> Self {
        Self::with_scope(AccessScope::Customer, "/products").await
    }

    /// Session for `scope` with in-memory stores, currently at `location`.
    pub async fn with_scope(scope: AccessScope, location: &str) -> Self {
        let server = MockServer::start().await;
        let store = SessionStore::in_memory(StorageKeys::for_scope(scope));
        Self::build(server, scope, store, location)
    }

    /// Customer session backed by files under `dir`.
    pub async fn with_files(dir: &Path) -> Self {
        let server = MockServer::start().await;
        Self::build(server, AccessScope::Customer, file_store(dir, AccessScope::Customer), "/products")
    }

    fn build(server: MockServer, scope: AccessScope, store: SessionStore, location: &str) -> Self {
        let navigator = RecordingNavigator::at(location);
        let session = SessionManager::new(&config_for(&server, scope), store, navigator.clone()).unwrap();
        Self {
            server,
            session,
            navigator,
        }
    }

    /// Mount a successful login for `a@b.com` returning `tok` and `user`.
    pub async fn mount_login(&self, token: &str, user: Value) {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "bearer_token": token,
                "user": user,
                "cart": {"items": []}
            })))
            .mount(&self.server)
            .await;
    }

    /// Log in as `a@b.com` through a mounted login mock.
    pub async fn login(&self) -> Value {
        self.session.login(&credentials("a@b.com", "pw")).await.unwrap()
    }
}

/// Configuration pointing at `server`.
#[must_use]
pub fn config_for(server: &MockServer, scope: AccessScope) -> SessionConfig {
    SessionConfig::new(server.uri().parse().unwrap()).with_scope(scope)
}

/// File-backed store under `dir` for `scope`.
#[must_use]
pub fn file_store(dir: &Path, scope: AccessScope) -> SessionStore {
    SessionStore::new(
        Arc::new(FileCookieStore::new(dir.join("cookies.json"))),
        Arc::new(FileLocalStore::new(dir.join("local.json"))),
        StorageKeys::for_scope(scope),
    )
}

/// Credentials from literals.
#[must_use]
pub fn credentials(email: &str, password: &str) -> Credentials {
    Credentials::new(
        Email::parse(email).unwrap(),
        SecretString::from(password.to_owned()),
    )
}

/// The sample customer used across tests.
#[must_use]
pub fn sample_user() -> Value {
    json!({"id": 1, "name": "A", "email": "a@b.com"})
}
