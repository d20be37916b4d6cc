//! Error types for admin console services.

use oakline_session::ApiError;
use thiserror::Error;

/// Errors returned by admin resource services.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The remote call failed (transport, non-success status or expired session).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The payload did not match the expected resource shape.
    #[error("Unexpected {resource} payload: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A resource name that the admin console does not manage.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),
}

impl AdminError {
    /// Returns `true` if the session expired during the call.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_session_expired())
    }

    /// Message from the service, if it sent one.
    #[must_use]
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.remote_message(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn test_session_expiry_passes_through() {
        let err = AdminError::from(ApiError::SessionExpired {
            message: Some("Unauthenticated.".to_string()),
            body: Value::Null,
        });
        assert!(err.is_session_expired());
        assert_eq!(err.remote_message(), Some("Unauthenticated."));
    }

    #[test]
    fn test_unknown_resource_display() {
        let err = AdminError::UnknownResource("chairs".to_string());
        assert_eq!(err.to_string(), "Unknown resource: chairs");
        assert!(!err.is_session_expired());
    }
}
