//! User profile and cart payloads cached by the session layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::UserId;

/// Profile of the signed-in user as returned by the remote service.
///
/// The profile is cached and handed back exactly as the service sent it,
/// nulls and unknown fields included. The accessors read the fields the
/// storefront cares about without imposing a schema on the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(Map<String, Value>);

impl UserProfile {
    /// Wrap a raw profile object.
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Remote user ID. Accepts a number or a numeric string.
    #[must_use]
    pub fn id(&self) -> Option<UserId> {
        self.0
            .get("id")
            .and_then(|id| UserId::deserialize(id).ok())
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.text("name")
    }

    /// Email address, as the service spells it.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.text("email")
    }

    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.text("phone")
    }

    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.text("address")
    }

    /// Any field by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Borrow the raw fields.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume the profile and return it as a JSON object.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Cached cart contents.
///
/// The session layer neither owns nor validates the cart; it only remembers
/// the last snapshot the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartSnapshot(Value);

impl CartSnapshot {
    /// Wrap a raw cart payload.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the raw payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the snapshot and return the raw payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}
