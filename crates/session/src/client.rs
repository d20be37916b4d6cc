//! Authenticated API client shared by every consumer of the remote API.
//!
//! All calls go through [`ApiClient::send`], which owns both halves of the
//! auth contract:
//!
//! - **Request phase**: the bearer token from the session store is attached
//!   to every [`Auth::Required`] request. Callers never touch the header.
//! - **Response phase**: a 401 on an [`Auth::Required`] request clears the
//!   session and, when the host is on a page other than the login page,
//!   requests navigation to the login entry point. The caller still receives
//!   [`ApiError::SessionExpired`]. Requests built with
//!   [`ApiRequest::without_redirect`] only clear the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{Span, debug, field, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::envelope::{error_message, unwrap_envelope};
use crate::error::ApiError;
use crate::navigator::{Navigator, is_login_location};
use crate::store::SessionStore;

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Form field used to tunnel a non-POST verb through a multipart POST.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Whether a request is made on behalf of the signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Auth {
    /// Attach the bearer token and treat 401 as session expiry.
    #[default]
    Required,
    /// Send without a token; a 401 is an ordinary rejection.
    Anonymous,
}

/// A file attached to a multipart request.
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name (e.g., `image`).
    pub field: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type, if known.
    pub mime: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Create a file part with no MIME type.
    #[must_use]
    pub fn new(field: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            mime: None,
            bytes,
        }
    }

    /// Set the MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// A multipart form body.
///
/// Kept as plain data until send time so requests stay cloneable and
/// inspectable; converted to a `reqwest` form in [`ApiClient::send`].
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Add a file.
    #[must_use]
    pub fn file(mut self, file: FilePart) -> Self {
        self.files.push(file);
        self
    }

    /// Text fields in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Value of the first text field called `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Attached files.
    #[must_use]
    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    fn into_reqwest(self) -> Result<reqwest::multipart::Form, ApiError> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for file in self.files {
            let mut part = reqwest::multipart::Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(mime) = file.mime {
                part = part.mime_str(&mime)?;
            }
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

/// Request body encodings.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// `application/json`.
    Json(Value),
    /// `multipart/form-data`.
    Multipart(MultipartForm),
}

/// A request to the remote API, relative to the configured base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    auth: Auth,
    redirect_on_expiry: bool,
    query: Vec<(String, String)>,
    body: Option<RequestBody>,
}

impl ApiRequest {
    /// A request with the given verb and path.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            auth: Auth::Required,
            redirect_on_expiry: true,
            query: Vec::new(),
            body: None,
        }
    }

    /// `GET path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE path`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Send without the bearer token.
    #[must_use]
    pub const fn anonymous(mut self) -> Self {
        self.auth = Auth::Anonymous;
        self
    }

    /// On a 401, clear the session but do not ask the navigator to show the
    /// login page.
    #[must_use]
    pub const fn without_redirect(mut self) -> Self {
        self.redirect_on_expiry = false;
        self
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a multipart body.
    ///
    /// Multipart bodies always travel as POST. Any other verb is carried in a
    /// `_method` form field so the server can route it.
    #[must_use]
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// The request verb as configured.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The request path as configured.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The auth mode.
    #[must_use]
    pub const fn auth(&self) -> Auth {
        self.auth
    }

    /// Verb and body as they go over the wire, with the `_method` override applied.
    fn into_transport(self) -> (Method, Option<RequestBody>) {
        match self.body {
            Some(RequestBody::Multipart(form)) if self.method != Method::POST => {
                let form = form.text(METHOD_OVERRIDE_FIELD, self.method.as_str());
                (Method::POST, Some(RequestBody::Multipart(form)))
            }
            body => (self.method, body),
        }
    }
}

/// Authenticated client for the remote API.
///
/// Cheap to clone; every clone shares the HTTP connection pool, the session
/// store and the expiry state. Hand one instance to every consumer.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    login_path: String,
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
    /// Set once a login redirect has been requested; reset by the next login.
    redirect_issued: AtomicBool,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("login_path", &self.inner.login_path)
            .field("store", &self.inner.store)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(
        config: &SessionConfig,
        store: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                login_path: config.login_path.clone(),
                store,
                navigator,
                redirect_issued: AtomicBool::new(false),
            }),
        })
    }

    /// The session store the client reads its token from.
    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    /// The configured login entry point.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.inner.login_path
    }

    /// Send a request and return the decoded JSON body.
    ///
    /// An empty body decodes as `Value::Null`; a non-JSON success body is
    /// returned as a JSON string.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionExpired` for a 401 on an authenticated
    /// request (after clearing the session), `ApiError::Status` for any other
    /// non-success status, and `ApiError::Http` on transport failure.
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, request_id = field::Empty)
    )]
    pub async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let request_id = Uuid::new_v4();
        Span::current().record("request_id", field::display(request_id));

        let auth = request.auth;
        let redirect_on_expiry = request.redirect_on_expiry;
        let url = self.url_for(&request.path, &request.query)?;
        let (method, body) = request.into_transport();

        let mut builder = self
            .inner
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(REQUEST_ID_HEADER, request_id.to_string());

        if auth == Auth::Required
            && let Some(token) = self.inner.store.token().await
        {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match body {
            Some(RequestBody::Json(json)) => builder.json(&json),
            Some(RequestBody::Multipart(form)) => builder.multipart(form.into_reqwest()?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let body = decode_body(&bytes);

        debug!(status = status.as_u16(), "API response");

        if status == StatusCode::UNAUTHORIZED && auth == Auth::Required {
            if redirect_on_expiry {
                self.expire_session().await;
            } else {
                self.clear_store().await;
            }
            return Err(ApiError::SessionExpired {
                message: error_message(&body),
                body,
            });
        }

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                message: error_message(&body),
                body,
            });
        }

        Ok(body)
    }

    /// Send a request, strip envelopes and decode the payload as `T`.
    ///
    /// `envelope_keys` are tried in addition to `data`.
    ///
    /// # Errors
    ///
    /// Everything [`send`](Self::send) returns, plus `ApiError::Decode` if the
    /// unwrapped payload does not match `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        envelope_keys: &[&str],
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_value(unwrap_envelope(body, envelope_keys))?)
    }

    /// Clear the session and redirect to the login entry point.
    ///
    /// Runs automatically on any authenticated 401. Idempotent: after the
    /// first call, further calls leave the store cleared and request no
    /// additional navigation until the next successful login.
    pub async fn expire_session(&self) {
        self.clear_store().await;

        let Some(location) = self.inner.navigator.current_location() else {
            return;
        };
        if is_login_location(&location, &self.inner.login_path) {
            return;
        }
        if self.inner.redirect_issued.swap(true, Ordering::AcqRel) {
            return;
        }

        warn!(from = %location, to = %self.inner.login_path, "Session expired, redirecting to login");
        self.inner.navigator.navigate(&self.inner.login_path);
    }

    async fn clear_store(&self) {
        if let Err(e) = self.inner.store.clear().await {
            warn!(error = %e, "Failed to clear expired session");
        }
    }

    /// Re-arm the expiry redirect after a new session is established.
    pub(crate) fn session_started(&self) {
        self.inner.redirect_issued.store(false, Ordering::Release);
    }

    fn url_for(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;
    use wiremock::matchers::{header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::store::StorageKeys;

    #[derive(Default)]
    struct RecordingNavigator {
        location: Option<String>,
        visits: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn current_location(&self) -> Option<String> {
            self.location.clone()
        }

        fn navigate(&self, path: &str) {
            self.visits.lock().unwrap().push(path.to_string());
        }
    }

    fn client_for(server: &MockServer, navigator: Arc<dyn Navigator>) -> ApiClient {
        let config = SessionConfig::new(server.uri().parse().unwrap());
        ApiClient::new(&config, SessionStore::in_memory(StorageKeys::CUSTOMER), navigator)
            .unwrap()
    }

    #[test]
    fn test_multipart_put_is_tunnelled_through_post() {
        let request = ApiRequest::put("products/4")
            .multipart(MultipartForm::new().text("name", "Walnut desk"));

        let (method, body) = request.into_transport();
        assert_eq!(method, Method::POST);
        let Some(RequestBody::Multipart(form)) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.field("_method"), Some("PUT"));
        assert_eq!(form.field("name"), Some("Walnut desk"));
    }

    #[test]
    fn test_multipart_post_has_no_override() {
        let request = ApiRequest::post("products").multipart(MultipartForm::new());
        let (method, body) = request.into_transport();
        assert_eq!(method, Method::POST);
        let Some(RequestBody::Multipart(form)) = body else {
            panic!("expected multipart body");
        };
        assert_eq!(form.field("_method"), None);
    }

    #[test]
    fn test_json_put_keeps_verb() {
        let (method, _) = ApiRequest::put("user/profile").json(json!({})).into_transport();
        assert_eq!(method, Method::PUT);
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b" \n"), Value::Null);
        assert_eq!(decode_body(b"{\"id\":1}"), json!({"id": 1}));
        assert_eq!(decode_body(b"Deleted"), json!("Deleted"));
    }

    #[tokio::test]
    async fn test_attaches_bearer_token_and_request_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .and(header("authorization", "Bearer tok123"))
            .and(header_exists(REQUEST_ID_HEADER))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(RecordingNavigator::default()));
        client.store().persist("tok123", None, None).await.unwrap();

        let body = client.send(ApiRequest::get("/categories")).await.unwrap();
        assert_eq!(body, json!({"data": []}));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "nope"})))
            .mount(&server)
            .await;

        let navigator = Arc::new(RecordingNavigator {
            location: Some("/account".to_string()),
            ..Default::default()
        });
        let client = client_for(&server, navigator.clone());
        client.store().persist("tok123", None, None).await.unwrap();

        let err = client
            .send(ApiRequest::post("login").anonymous().json(json!({})))
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::Status { status: StatusCode::UNAUTHORIZED, .. }));
        assert_eq!(err.remote_message(), Some("nope"));
        // An anonymous 401 leaves the existing session alone.
        assert!(client.store().is_logged_in().await);
        assert!(navigator.visits.lock().unwrap().is_empty());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests.first().unwrap().headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_query_parameters_are_appended() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products"))
            .and(wiremock::matchers::query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Arc::new(RecordingNavigator::default()));
        client
            .send(ApiRequest::get("products").query("page", "2"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_expire_session_redirects_once() {
        let server = MockServer::start().await;
        let navigator = Arc::new(RecordingNavigator {
            location: Some("/admin/orders".to_string()),
            ..Default::default()
        });
        let client = client_for(&server, navigator.clone());
        client.store().persist("tok", None, None).await.unwrap();

        client.expire_session().await;
        client.expire_session().await;

        assert!(!client.store().is_logged_in().await);
        assert_eq!(*navigator.visits.lock().unwrap(), vec!["/login".to_string()]);

        // A new session re-arms the redirect.
        client.session_started();
        client.expire_session().await;
        assert_eq!(navigator.visits.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_expire_session_on_login_page_does_not_navigate() {
        let server = MockServer::start().await;
        let navigator = Arc::new(RecordingNavigator {
            location: Some("/login?next=/admin".to_string()),
            ..Default::default()
        });
        let client = client_for(&server, navigator.clone());

        client.expire_session().await;

        assert!(navigator.visits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized_without_redirect_only_clears() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logout"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthenticated."})))
            .mount(&server)
            .await;
        let navigator = Arc::new(RecordingNavigator {
            location: Some("/account".to_string()),
            ..Default::default()
        });
        let client = client_for(&server, navigator.clone());
        client.store().persist("stale", None, None).await.unwrap();

        let err = client
            .send(ApiRequest::post("logout").without_redirect())
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::SessionExpired { .. }));
        assert!(!client.store().is_logged_in().await);
        assert!(navigator.visits.lock().unwrap().is_empty());

        // The redirect is still armed for the next real expiry.
        client.expire_session().await;
        assert_eq!(*navigator.visits.lock().unwrap(), vec!["/login".to_string()]);
    }
}
