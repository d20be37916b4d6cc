//! Records managed from the admin console.
//!
//! Each record names the fields the console works with and keeps everything
//! else the service sends in `extra`, so a record can be fetched, edited and
//! sent back without dropping fields this crate does not know about.

pub mod catalog;
pub mod content;
pub mod enrollment;
pub mod sales;

pub use catalog::{Category, Product};
pub use content::{Project, Service, Testimonial};
pub use enrollment::Student;
pub use sales::{LocationCost, Order, Quote};
