//! Session layer configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `OAKLINE_API_BASE_URL` - Base URL of the remote API (e.g., `https://api.oakline.example/api`)
//!
//! ## Optional
//! - `OAKLINE_LOGIN_PATH` - Login entry point to navigate to on session expiry (default: /login)
//! - `OAKLINE_HTTP_TIMEOUT_SECS` - Per-request timeout in seconds (default: 30)
//! - `OAKLINE_SCOPE` - `customer` or `admin`; selects the cookie names (default: customer)

use std::time::Duration;

use oakline_core::AccessScope;
use thiserror::Error;
use url::Url;

const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Session layer configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL every request path is resolved against (always ends in `/`)
    pub api_base_url: Url,
    /// Login entry point used by the session-expiry redirect
    pub login_path: String,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Which cookie/local-store key set to use
    pub scope: AccessScope,
}

impl SessionConfig {
    /// Configuration with defaults for everything but the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url: with_trailing_slash(api_base_url),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            scope: AccessScope::default(),
        }
    }

    /// Override the login entry point.
    #[must_use]
    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    /// Override the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Override the access scope.
    #[must_use]
    pub const fn with_scope(mut self, scope: AccessScope) -> Self {
        self.scope = scope;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the base URL is missing or any variable is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("OAKLINE_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("OAKLINE_API_BASE_URL".to_string(), e.to_string())
            })?;
        let login_path = get_env_or_default("OAKLINE_LOGIN_PATH", DEFAULT_LOGIN_PATH);
        let timeout_secs = get_env_or_default(
            "OAKLINE_HTTP_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("OAKLINE_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
        })?;
        let scope = get_env_or_default("OAKLINE_SCOPE", "customer")
            .parse::<AccessScope>()
            .map_err(|e| ConfigError::InvalidEnvVar("OAKLINE_SCOPE".to_string(), e))?;

        Ok(Self::new(api_base_url)
            .with_login_path(login_path)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_scope(scope))
    }
}

/// `Url::join` treats the last segment as a file unless the path ends in `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
