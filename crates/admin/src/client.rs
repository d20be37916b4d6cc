//! Entry point for admin console services.

use oakline_session::ApiClient;

use crate::models::{
    Category, LocationCost, Order, Product, Project, Quote, Service, Student, Testimonial,
};
use crate::resources::{RawResource, ResourceKind, ResourceService};

/// Admin console services sharing one authenticated client.
///
/// Build it from the session manager's client so that every admin call
/// carries the admin token and every 401 ends the admin session.
#[derive(Debug, Clone)]
pub struct AdminClient {
    api: ApiClient,
}

impl AdminClient {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// The underlying client.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Untyped access to any resource.
    #[must_use]
    pub fn resource(&self, kind: ResourceKind) -> RawResource {
        RawResource::new(self.api.clone(), kind)
    }

    #[must_use]
    pub fn categories(&self) -> ResourceService<Category> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn products(&self) -> ResourceService<Product> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn students(&self) -> ResourceService<Student> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn projects(&self) -> ResourceService<Project> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn services(&self) -> ResourceService<Service> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn testimonials(&self) -> ResourceService<Testimonial> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn quotes(&self) -> ResourceService<Quote> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn location_costs(&self) -> ResourceService<LocationCost> {
        ResourceService::new(self.api.clone())
    }

    #[must_use]
    pub fn orders(&self) -> ResourceService<Order> {
        ResourceService::new(self.api.clone())
    }
}
