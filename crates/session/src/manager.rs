//! Session manager: login, registration, logout and profile operations.

use std::sync::Arc;

use oakline_core::{CartSnapshot, Email, SessionState, UserProfile};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::client::{ApiClient, ApiRequest};
use crate::config::SessionConfig;
use crate::envelope::{bearer_token, error_message, first_validation_error, member};
use crate::error::{ApiError, SessionError};
use crate::navigator::Navigator;
use crate::store::SessionStore;

const LOGIN_ENDPOINT: &str = "login";
const REGISTER_ENDPOINT: &str = "register";
const LOGOUT_ENDPOINT: &str = "logout";
const USER_ENDPOINT: &str = "user";
const PROFILE_ENDPOINT: &str = "user/profile";

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const PROFILE_FETCH_FAILED: &str = "Failed to fetch user profile";
const PROFILE_UPDATE_FAILED: &str = "Failed to update profile";

/// Login credentials.
#[derive(Clone)]
pub struct Credentials {
    /// Account email.
    pub email: Email,
    /// Account password.
    pub password: SecretString,
}

impl Credentials {
    /// Bundle an email and password.
    #[must_use]
    pub const fn new(email: Email, password: SecretString) -> Self {
        Self { email, password }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account registration form.
///
/// Password confirmation is sent as-is; the remote service decides whether
/// the two match.
#[derive(Clone)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: Email,
    /// Chosen password.
    pub password: SecretString,
    /// Password typed a second time.
    pub password_confirmation: SecretString,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Optional delivery address.
    pub address: Option<String>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("address", &self.address)
            .finish()
    }
}

#[derive(Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
    password_confirmation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<&'a str>,
}

/// Partial profile update. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ProfileChanges {
    /// Returns `true` if no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.address.is_none()
    }
}

/// Owns the session lifecycle and the shared authenticated client.
///
/// # Lifecycle
///
/// `Anonymous` until a login (or a registration that returns a token)
/// succeeds, then `Authenticated` until [`logout`](Self::logout) or any
/// authenticated call is answered with 401. See [`ApiClient`] for the
/// request/response contract every call follows.
#[derive(Debug, Clone)]
pub struct SessionManager {
    api: ApiClient,
}

impl SessionManager {
    /// Create a session manager and its API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(
        config: &SessionConfig,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        Ok(Self::from_client(ApiClient::new(config, store, navigator)?))
    }

    /// Wrap an existing client.
    #[must_use]
    pub const fn from_client(api: ApiClient) -> Self {
        Self { api }
    }

    /// The shared client. Hand clones of it to every other API consumer.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Log in and persist the session.
    ///
    /// Returns the raw response payload. Persisted state changes only on
    /// success.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Authentication` with the service's message (or
    /// "Login failed") if the service rejects the credentials or returns no
    /// token, and `SessionError::Store` if the session cannot be persisted.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Value, SessionError> {
        let body = json!({
            "email": credentials.email.as_str(),
            "password": credentials.password.expose_secret(),
        });

        let payload = self
            .api
            .send(ApiRequest::post(LOGIN_ENDPOINT).anonymous().json(body))
            .await
            .map_err(|e| SessionError::Authentication(rejection_message(&e, LOGIN_FAILED)))?;

        let Some(token) = bearer_token(&payload) else {
            warn!("Login response did not include a token");
            return Err(SessionError::Authentication(
                error_message(&payload).unwrap_or_else(|| LOGIN_FAILED.to_string()),
            ));
        };

        self.start_session(&token, &payload).await?;
        info!("Logged in");
        Ok(payload)
    }

    /// Create an account.
    ///
    /// Persists a session only if the response carries a token; some flows
    /// require a separate login afterwards. Returns the raw response payload.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Registration` carrying the first field's first
    /// validation message when the service reports a field-keyed error map,
    /// otherwise the service's message (or "Registration failed").
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> Result<Value, SessionError> {
        let body = RegisterBody {
            name: &registration.name,
            email: registration.email.as_str(),
            password: registration.password.expose_secret(),
            password_confirmation: registration.password_confirmation.expose_secret(),
            phone: registration.phone.as_deref(),
            address: registration.address.as_deref(),
        };
        let body = serde_json::to_value(body).map_err(|e| SessionError::Registration {
            field: None,
            message: e.to_string(),
        })?;

        let payload = self
            .api
            .send(ApiRequest::post(REGISTER_ENDPOINT).anonymous().json(body))
            .await
            .map_err(|e| registration_error(&e))?;

        if let Some(token) = bearer_token(&payload) {
            self.start_session(&token, &payload).await?;
            info!("Registered and logged in");
        } else {
            debug!("Registered without a token; login deferred");
        }

        Ok(payload)
    }

    /// Log out.
    ///
    /// Tells the service (best effort, only when a token exists) and then
    /// clears the persisted session no matter what the service said. Never
    /// fails; problems are logged. A stale token rejected with 401 does not
    /// trigger the login redirect.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if self.api.store().token().await.is_some() {
            let request = ApiRequest::post(LOGOUT_ENDPOINT).without_redirect();
            match self.api.send(request).await {
                Ok(_) => debug!("Remote logout acknowledged"),
                Err(e) => warn!(error = %e, "Remote logout failed, clearing local session anyway"),
            }
        }

        if let Err(e) = self.api.store().clear().await {
            warn!(error = %e, "Failed to clear session store during logout");
        }
        info!("Logged out");
    }

    /// Whether a session is live, judged by the cookie copy alone.
    pub async fn is_logged_in(&self) -> bool {
        self.api.store().is_logged_in().await
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> SessionState {
        if self.is_logged_in().await {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    /// Current bearer token.
    pub async fn token(&self) -> Option<SecretString> {
        self.api.store().token().await
    }

    /// Cached user profile from the last login. `None` before any login.
    pub async fn stored_user(&self) -> Option<UserProfile> {
        self.api.store().stored_user().await
    }

    /// Cached cart from the last login. `None` before any login.
    pub async fn stored_cart(&self) -> Option<CartSnapshot> {
        self.api.store().stored_cart().await
    }

    /// Fetch the canonical profile from the service.
    ///
    /// Accepts both `{"data": {...}}` and bare responses.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ProfileFetch` with the service's message (or a
    /// generic message). A 401 also clears the session as a side effect.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<UserProfile, SessionError> {
        self.api
            .fetch(ApiRequest::get(USER_ENDPOINT), &[])
            .await
            .map_err(|e| SessionError::ProfileFetch(rejection_message(&e, PROFILE_FETCH_FAILED)))
    }

    /// Apply a partial profile update and return the service's response verbatim.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::ProfileUpdate` with the service's message (or a
    /// generic message). A 401 also clears the session as a side effect.
    #[instrument(skip(self, changes))]
    pub async fn update_profile(&self, changes: &ProfileChanges) -> Result<Value, SessionError> {
        let body = serde_json::to_value(changes)
            .map_err(|e| SessionError::ProfileUpdate(e.to_string()))?;

        self.api
            .send(ApiRequest::put(PROFILE_ENDPOINT).json(body))
            .await
            .map_err(|e| SessionError::ProfileUpdate(rejection_message(&e, PROFILE_UPDATE_FAILED)))
    }

    async fn start_session(&self, token: &str, payload: &Value) -> Result<(), SessionError> {
        self.api
            .store()
            .persist(token, member(payload, "user"), member(payload, "cart"))
            .await?;
        self.api.session_started();
        Ok(())
    }
}

/// The service's message for a rejection, or `fallback`.
fn rejection_message(err: &ApiError, fallback: &str) -> String {
    err.remote_message().map_or_else(
        || {
            warn!(error = %err, "Request failed without a service message");
            fallback.to_string()
        },
        str::to_owned,
    )
}

fn registration_error(err: &ApiError) -> SessionError {
    if let Some((field, message)) = err.body().and_then(first_validation_error) {
        return SessionError::Registration {
            field: Some(field),
            message,
        };
    }
    SessionError::Registration {
        field: None,
        message: rejection_message(err, REGISTRATION_FAILED),
    }
}
