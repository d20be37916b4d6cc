//! Core types for Oakline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod lenient;
pub mod price;
pub mod status;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::Price;
pub use status::*;
pub use user::{CartSnapshot, UserProfile};
