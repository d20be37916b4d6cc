//! Oakline Core - Shared domain types.
//!
//! This crate provides the types shared by every Oakline component:
//! - `session` - Session manager and authenticated API client
//! - `admin` - Admin console resource services
//! - `cli` - Command-line access to the remote API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no persistence, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, prices, user/cart payloads and session states

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
