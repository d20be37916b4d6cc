//! Command implementations and the shared session context they run in.
//!
//! # Environment Variables
//!
//! Everything `SessionConfig::from_env` reads, plus:
//! - `OAKLINE_DATA_DIR` - Directory holding the cookie jar and local store (default: .oakline)
//! - `OAKLINE_PASSWORD` - Password for `login`/`register` when `--password` is omitted

pub mod admin;
pub mod session;

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use oakline_core::{AccessScope, EmailError};
use oakline_session::{
    ConfigError, FileCookieStore, FileLocalStore, Navigator, SessionConfig, SessionManager,
    SessionStore, StorageKeys,
};
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".oakline";
const COOKIE_FILE: &str = "cookies.json";
const LOCAL_FILE: &str = "local.json";

/// Errors raised by the CLI itself, before or around a session call.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("No password given; pass --password or set OAKLINE_PASSWORD")]
    MissingPassword,

    #[error("Not logged in; run `oak login` first")]
    NotLoggedIn,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Api(#[from] oakline_session::ApiError),
}

/// Navigator for a terminal session.
///
/// A CLI is never "on" the login page, so an expired session always produces
/// one hint telling the user how to sign in again.
#[derive(Debug, Clone, Copy)]
pub struct TerminalNavigator {
    scope: AccessScope,
}

impl TerminalNavigator {
    #[must_use]
    pub const fn new(scope: AccessScope) -> Self {
        Self { scope }
    }
}

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> Option<String> {
        Some("oak".to_string())
    }

    fn navigate(&self, path: &str) {
        tracing::warn!(
            login = path,
            "Session expired. Run `oak --scope {} login` to sign in again",
            self.scope
        );
    }
}

/// Session manager plus where its state lives on disk.
pub struct Context {
    pub session: SessionManager,
    pub scope: AccessScope,
    pub data_dir: PathBuf,
}

impl Context {
    /// Load configuration and open the file-backed stores.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Config` if the environment is incomplete and
    /// `CommandError::Api` if the HTTP client cannot be built.
    pub fn from_env(scope: Option<AccessScope>) -> Result<Self, CommandError> {
        let mut config = SessionConfig::from_env()?;
        if let Some(scope) = scope {
            config = config.with_scope(scope);
        }

        let data_dir = std::env::var("OAKLINE_DATA_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from);

        Self::open(&config, data_dir)
    }

    /// Open a context for `config` with stores under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::Api` if the HTTP client cannot be built.
    pub fn open(config: &SessionConfig, data_dir: PathBuf) -> Result<Self, CommandError> {
        let store = SessionStore::new(
            Arc::new(FileCookieStore::new(data_dir.join(COOKIE_FILE))),
            Arc::new(FileLocalStore::new(data_dir.join(LOCAL_FILE))),
            StorageKeys::for_scope(config.scope),
        );
        let session =
            SessionManager::new(config, store, Arc::new(TerminalNavigator::new(config.scope)))?;

        tracing::debug!(data_dir = %data_dir.display(), scope = %config.scope, "Session context ready");

        Ok(Self {
            session,
            scope: config.scope,
            data_dir,
        })
    }
}

/// Resolve a password from the flag/env value, or read one line from stdin.
///
/// # Errors
///
/// Returns `CommandError::MissingPassword` if neither source yields one.
pub fn resolve_password(given: Option<String>) -> Result<SecretString, CommandError> {
    if let Some(password) = given.filter(|p| !p.is_empty()) {
        return Ok(SecretString::from(password));
    }

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(CommandError::MissingPassword);
    }
    Ok(SecretString::from(line.to_owned()))
}

/// Print a JSON payload for the user.
#[allow(clippy::print_stdout)]
pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

/// Print a single line for the user.
#[allow(clippy::print_stdout)]
pub fn print_line(line: &str) {
    println!("{line}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use oakline_core::SessionState;

    use super::*;

    #[tokio::test]
    async fn test_context_uses_scope_keys_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig::new("http://localhost:8000/api".parse().unwrap())
            .with_scope(AccessScope::Admin);

        let ctx = Context::open(&config, dir.path().to_path_buf()).unwrap();

        assert_eq!(ctx.scope, AccessScope::Admin);
        assert_eq!(ctx.session.api().store().keys(), StorageKeys::ADMIN);
        assert_eq!(ctx.session.state().await, SessionState::Anonymous);

        ctx.session
            .api()
            .store()
            .persist("tok", None, None)
            .await
            .unwrap();
        assert!(dir.path().join(COOKIE_FILE).exists());
        assert!(dir.path().join(LOCAL_FILE).exists());

        let reopened = Context::open(&config, dir.path().to_path_buf()).unwrap();
        assert!(reopened.session.is_logged_in().await);
    }

    #[test]
    fn test_terminal_navigator_is_never_on_login_page() {
        let navigator = TerminalNavigator::new(AccessScope::Customer);
        assert_eq!(navigator.current_location().as_deref(), Some("oak"));
    }

    #[test]
    fn test_resolve_password_prefers_given_value() {
        use secrecy::ExposeSecret;

        let password = resolve_password(Some("hunter2".to_string())).unwrap();
        assert_eq!(password.expose_secret(), "hunter2");
    }
}
