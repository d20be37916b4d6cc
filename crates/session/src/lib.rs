//! Oakline Session - session manager and authenticated API client.
//!
//! Both the storefront and the admin console talk to the same remote API.
//! This crate owns everything between a caller and that API:
//!
//! - [`SessionManager`] - login, registration, logout and profile operations
//! - [`ApiClient`] - shared client that attaches the bearer token to every
//!   request and turns a 401 into a cleared session plus a single redirect
//! - [`SessionStore`] - dual persistence (cookie jar + local store) with the
//!   cookie copy as the source of truth
//! - [`envelope`] - normalization of `{"data": ...}` style responses
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use oakline_session::{
//!     Credentials, HeadlessNavigator, SessionConfig, SessionManager, SessionStore, StorageKeys,
//! };
//!
//! let config = SessionConfig::from_env()?;
//! let store = SessionStore::in_memory(StorageKeys::for_scope(config.scope));
//! let session = SessionManager::new(&config, store, Arc::new(HeadlessNavigator))?;
//!
//! session.login(&Credentials::new(email, password)).await?;
//! let me = session.current_user().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod manager;
pub mod navigator;
pub mod store;

pub use client::{ApiClient, ApiRequest, Auth, FilePart, MultipartForm, RequestBody};
pub use config::{ConfigError, SessionConfig};
pub use error::{ApiError, SessionError, StoreError};
pub use manager::{Credentials, ProfileChanges, Registration, SessionManager};
pub use navigator::{HeadlessNavigator, Navigator};
pub use store::{
    COOKIE_TTL_DAYS, Cookie, CookieStore, FileCookieStore, FileLocalStore, InMemoryCookieStore,
    InMemoryLocalStore, LocalStore, SessionStore, StorageKeys,
};
