//! Error types for the session layer.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by [`SessionManager`](crate::SessionManager) operations.
///
/// Each variant carries a single human-readable message normalized from the
/// remote service's error payload, ready to show to the user.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Login was rejected (bad credentials or no token in the response).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Registration was rejected, optionally for a specific form field.
    #[error("Registration failed: {message}")]
    Registration {
        /// Field the first validation message belongs to, if field-scoped.
        field: Option<String>,
        /// First validation message, or the generic remote message.
        message: String,
    },

    /// Fetching the canonical user profile failed.
    #[error("Profile fetch failed: {0}")]
    ProfileFetch(String),

    /// Updating the user profile failed.
    #[error("Profile update failed: {0}")]
    ProfileUpdate(String),

    /// The session could not be persisted after a successful login.
    #[error("Session store error: {0}")]
    Store(#[from] StoreError),
}

impl SessionError {
    /// The normalized message without the error-kind prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Authentication(message)
            | Self::ProfileFetch(message)
            | Self::ProfileUpdate(message)
            | Self::Registration { message, .. } => message.clone(),
            Self::Store(err) => err.to_string(),
        }
    }
}

/// Errors returned by [`ApiClient`](crate::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status other than 401.
    #[error("API returned {status}{}", describe(.message.as_deref()))]
    Status {
        /// Response status.
        status: StatusCode,
        /// Message extracted from the error payload, if any.
        message: Option<String>,
        /// Raw error payload (`Value::Null` when the body was not JSON).
        body: Value,
    },

    /// An authenticated call was answered with 401. The session has already
    /// been cleared by the time the caller sees this.
    #[error("Session expired{}", describe(.message.as_deref()))]
    SessionExpired {
        /// Message extracted from the error payload, if any.
        message: Option<String>,
        /// Raw error payload.
        body: Value,
    },

    /// The response body could not be decoded into the expected type.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request path could not be joined onto the base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Message the remote service supplied with a rejection, if any.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::SessionExpired { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// Raw rejection payload, if the service answered at all.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Status { body, .. } | Self::SessionExpired { body, .. } => Some(body),
            _ => None,
        }
    }

    /// HTTP status of a rejection.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::SessionExpired { .. } => Some(StatusCode::UNAUTHORIZED),
            _ => None,
        }
    }

    /// Returns `true` if this call triggered the session-expiry handler.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }
}

fn describe(message: Option<&str>) -> String {
    message.map(|m| format!(": {m}")).unwrap_or_default()
}

/// Errors from the cookie and local stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be parsed or encoded.
    #[error("corrupt store data: {0}")]
    Corrupt(#[from] serde_json::Error),
}
