//! Oakline Admin - typed services for the admin console.
//!
//! The admin console manages the catalog (categories, products), workshop
//! enrollments (students), showcase content (projects, services,
//! testimonials) and sales (quotes, delivery costs, orders). Every call goes
//! through the shared [`oakline_session::ApiClient`], so the admin bearer
//! token is attached automatically and a 401 ends the admin session.
//!
//! # Security
//!
//! Use an [`oakline_session::SessionStore`] built with
//! [`oakline_session::StorageKeys::ADMIN`] so the admin session never shares
//! cookies with a storefront customer session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod error;
pub mod models;
pub mod resources;

pub use client::AdminClient;
pub use error::AdminError;
pub use models::*;
pub use resources::{ImageResource, RawResource, Resource, ResourceKind, ResourceService};
