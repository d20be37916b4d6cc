//! Generic CRUD services over the admin API.
//!
//! Every admin resource follows the same REST layout (`GET /products`,
//! `GET /products/{id}`, `POST /products`, `PUT /products/{id}`,
//! `DELETE /products/{id}`), so one service type covers all of them.
//! [`ResourceKind`] carries the per-resource differences: path, envelope
//! keys and whether images may be uploaded.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use oakline_session::envelope::unwrap_envelope;
use oakline_session::{ApiClient, ApiRequest, MultipartForm};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::AdminError;

/// Resources managed from the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Categories,
    Products,
    Students,
    Projects,
    Services,
    Testimonials,
    Quotes,
    LocationCosts,
    Orders,
}

impl ResourceKind {
    /// Every resource, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Categories,
        Self::Products,
        Self::Students,
        Self::Projects,
        Self::Services,
        Self::Testimonials,
        Self::Quotes,
        Self::LocationCosts,
        Self::Orders,
    ];

    /// Collection path relative to the API base URL.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Products => "products",
            Self::Students => "students",
            Self::Projects => "projects",
            Self::Services => "services",
            Self::Testimonials => "testimonials",
            Self::Quotes => "quotes",
            Self::LocationCosts => "location-costs",
            Self::Orders => "orders",
        }
    }

    /// Envelope keys tried in addition to `data`.
    #[must_use]
    pub const fn envelope_keys(self) -> &'static [&'static str] {
        match self {
            Self::Students => &["student", "Enrollment"],
            _ => &[],
        }
    }

    /// Whether create/update accept an image upload.
    #[must_use]
    pub const fn accepts_images(self) -> bool {
        matches!(self, Self::Categories | Self::Products | Self::Projects)
    }

    fn member_path(self, id: impl fmt::Display) -> String {
        format!("{}/{id}", self.path())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for ResourceKind {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.path() == normalized)
            .ok_or_else(|| AdminError::UnknownResource(s.to_string()))
    }
}

/// A record type served by one admin resource.
pub trait Resource: DeserializeOwned + Send + Sync + 'static {
    /// Typed record identifier.
    type Id: fmt::Display + Send + Sync;

    /// Which resource this record belongs to.
    const KIND: ResourceKind;
}

/// Records that may carry an uploaded image.
pub trait ImageResource: Resource {}

// =============================================================================
// Untyped operations
// =============================================================================

/// Untyped access to any resource. Payloads come back envelope-stripped.
#[derive(Debug, Clone)]
pub struct RawResource {
    api: ApiClient,
    kind: ResourceKind,
}

impl RawResource {
    /// Bind `kind` to a client.
    #[must_use]
    pub const fn new(api: ApiClient, kind: ResourceKind) -> Self {
        Self { api, kind }
    }

    /// The resource this service addresses.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// List records, optionally filtered by query parameters.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails.
    #[instrument(skip(self, query), fields(resource = %self.kind))]
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Value, AdminError> {
        let request = query
            .iter()
            .fold(ApiRequest::get(self.kind.path()), |request, (key, value)| {
                request.query(*key, *value)
            });
        self.send(request).await
    }

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails.
    #[instrument(skip(self), fields(resource = %self.kind))]
    pub async fn get(&self, id: i64) -> Result<Value, AdminError> {
        self.send(ApiRequest::get(self.kind.member_path(id))).await
    }

    /// Delete one record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails.
    #[instrument(skip(self), fields(resource = %self.kind))]
    pub async fn delete(&self, id: i64) -> Result<(), AdminError> {
        self.api
            .send(ApiRequest::delete(self.kind.member_path(id)))
            .await?;
        debug!(id, "Deleted");
        Ok(())
    }

    async fn send(&self, request: ApiRequest) -> Result<Value, AdminError> {
        let body = self.api.send(request).await?;
        Ok(unwrap_envelope(body, self.kind.envelope_keys()))
    }
}

// =============================================================================
// Typed operations
// =============================================================================

/// Typed CRUD service for records of type `R`.
pub struct ResourceService<R> {
    raw: RawResource,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            raw: self.raw.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> fmt::Debug for ResourceService<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceService")
            .field("kind", &self.raw.kind)
            .finish_non_exhaustive()
    }
}

impl<R: Resource> ResourceService<R> {
    /// Bind the service to a client.
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self {
            raw: RawResource::new(api, R::KIND),
            _record: PhantomData,
        }
    }

    /// List all records.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails and `AdminError::Parse`
    /// if the payload is not a list of `R`.
    pub async fn list(&self) -> Result<Vec<R>, AdminError> {
        decode(R::KIND, self.raw.list(&[]).await?)
    }

    /// List records matching the given query parameters.
    ///
    /// # Errors
    ///
    /// As [`list`](Self::list).
    pub async fn list_where(&self, query: &[(&str, &str)]) -> Result<Vec<R>, AdminError> {
        decode(R::KIND, self.raw.list(query).await?)
    }

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails and `AdminError::Parse`
    /// if the payload is not an `R`.
    pub async fn get(&self, id: R::Id) -> Result<R, AdminError> {
        let request = ApiRequest::get(R::KIND.member_path(id));
        decode(R::KIND, self.raw.send(request).await?)
    }

    /// Create a record from a JSON body and return it as stored.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails and `AdminError::Parse`
    /// if the body cannot be encoded or the response is not an `R`.
    #[instrument(skip(self, body), fields(resource = %R::KIND))]
    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<R, AdminError> {
        let request = ApiRequest::post(R::KIND.path()).json(encode(R::KIND, body)?);
        decode(R::KIND, self.raw.send(request).await?)
    }

    /// Update a record from a JSON body and return it as stored.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create).
    #[instrument(skip(self, body), fields(resource = %R::KIND, id = %id))]
    pub async fn update<B: Serialize + ?Sized>(&self, id: R::Id, body: &B) -> Result<R, AdminError> {
        let request = ApiRequest::put(R::KIND.member_path(id)).json(encode(R::KIND, body)?);
        decode(R::KIND, self.raw.send(request).await?)
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Api` if the request fails.
    pub async fn delete(&self, id: R::Id) -> Result<(), AdminError> {
        self.raw
            .api
            .send(ApiRequest::delete(R::KIND.member_path(&id)))
            .await?;
        debug!(resource = %R::KIND, id = %id, "Deleted");
        Ok(())
    }
}

impl<R: ImageResource> ResourceService<R> {
    /// Create a record from a multipart form carrying an image.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create).
    #[instrument(skip(self, form), fields(resource = %R::KIND))]
    pub async fn create_with_image(&self, form: MultipartForm) -> Result<R, AdminError> {
        let request = ApiRequest::post(R::KIND.path()).multipart(form);
        decode(R::KIND, self.raw.send(request).await?)
    }

    /// Update a record from a multipart form carrying an image.
    ///
    /// Sent as a POST with `_method=PUT`, since the service only parses
    /// multipart bodies on POST.
    ///
    /// # Errors
    ///
    /// As [`create`](Self::create).
    #[instrument(skip(self, form), fields(resource = %R::KIND, id = %id))]
    pub async fn update_with_image(&self, id: R::Id, form: MultipartForm) -> Result<R, AdminError> {
        let request = ApiRequest::put(R::KIND.member_path(id)).multipart(form);
        decode(R::KIND, self.raw.send(request).await?)
    }
}

fn decode<T: DeserializeOwned>(kind: ResourceKind, value: Value) -> Result<T, AdminError> {
    serde_json::from_value(value).map_err(|source| AdminError::Parse {
        resource: kind.path(),
        source,
    })
}

fn encode<B: Serialize + ?Sized>(kind: ResourceKind, body: &B) -> Result<Value, AdminError> {
    serde_json::to_value(body).map_err(|source| AdminError::Parse {
        resource: kind.path(),
        source,
    })
}
