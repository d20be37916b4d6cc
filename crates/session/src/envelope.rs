//! Response-shape normalization.
//!
//! The remote API is inconsistent about how it wraps payloads: some endpoints
//! return the record directly, others nest it under `data` (sometimes twice),
//! and the enrollment endpoints use `student` or `Enrollment`. Error payloads
//! vary the same way. Everything here is applied once, at the client boundary.

use serde_json::{Map, Value};

/// Envelope key used by most endpoints.
pub const DATA_KEY: &str = "data";

/// Keys under which the service may place a bearer token.
const TOKEN_KEYS: &[&str] = &["bearer_token", "token", "access_token"];

/// Strip envelope wrappers from a response payload.
///
/// Descends into `data` and any of `extra_keys` for as long as the current
/// value is an object holding one of those keys with a non-null value.
///
/// ```
/// use serde_json::json;
/// use oakline_session::envelope::unwrap_envelope;
///
/// let wrapped = json!({"data": {"data": {"id": 1}}});
/// assert_eq!(unwrap_envelope(wrapped, &[]), json!({"id": 1}));
///
/// let enrollment = json!({"Enrollment": {"id": 7}});
/// assert_eq!(unwrap_envelope(enrollment, &["Enrollment"]), json!({"id": 7}));
///
/// let bare = json!({"id": 2, "name": "Oak bench"});
/// assert_eq!(unwrap_envelope(bare.clone(), &[]), bare);
/// ```
#[must_use]
pub fn unwrap_envelope(mut value: Value, extra_keys: &[&str]) -> Value {
    loop {
        let Value::Object(ref mut map) = value else {
            return value;
        };
        let Some(key) = std::iter::once(DATA_KEY)
            .chain(extra_keys.iter().copied())
            .find(|key| map.get(*key).is_some_and(|inner| !inner.is_null()))
        else {
            return value;
        };
        value = map.remove(key).unwrap_or(Value::Null);
    }
}

/// Extract a human-readable message from an error payload.
///
/// Looks at `message`, then `error`, at the top level and then inside a
/// `data` envelope. Empty strings are ignored.
#[must_use]
pub fn error_message(body: &Value) -> Option<String> {
    let lookup = |map: &Map<String, Value>| {
        ["message", "error"]
            .iter()
            .filter_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .find(|message| !message.is_empty())
            .map(str::to_owned)
    };

    let map = body.as_object()?;
    lookup(map).or_else(|| map.get(DATA_KEY).and_then(Value::as_object).and_then(lookup))
}

/// First message of the first field in a validation error map.
///
/// Handles `{"errors": {"email": ["Email already taken"]}}`, returning the
/// field name and its first message. Fields are visited in the order the
/// service sent them. A field whose value is a bare string is accepted too.
#[must_use]
pub fn first_validation_error(body: &Value) -> Option<(String, String)> {
    let errors = body.get("errors")?.as_object()?;
    errors.iter().find_map(|(field, messages)| {
        let message = match messages {
            Value::Array(items) => items.iter().find_map(Value::as_str),
            Value::String(message) => Some(message.as_str()),
            _ => None,
        }?;
        Some((field.clone(), message.to_owned()))
    })
}

/// Find the bearer token in a login or registration response.
///
/// Checks the top level first, then a `data` envelope.
#[must_use]
pub fn bearer_token(body: &Value) -> Option<String> {
    let lookup = |value: &Value| {
        TOKEN_KEYS
            .iter()
            .filter_map(|key| value.get(*key).and_then(Value::as_str))
            .find(|token| !token.is_empty())
            .map(str::to_owned)
    };

    lookup(body).or_else(|| body.get(DATA_KEY).and_then(lookup))
}

/// Find a named member (`user`, `cart`) next to the token.
///
/// Checks the top level first, then a `data` envelope. Null counts as absent.
#[must_use]
pub fn member<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    let lookup = |value: &'a Value| value.get(key).filter(|inner| !inner.is_null());
    lookup(body).or_else(|| body.get(DATA_KEY).and_then(lookup))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unwrap_envelope_stops_at_null_data() {
        let body = json!({"data": null, "message": "ok"});
        assert_eq!(unwrap_envelope(body.clone(), &[]), body);
    }

    #[test]
    fn test_unwrap_envelope_keeps_list_payloads() {
        let body = json!({"data": [{"id": 1}, {"id": 2}], "meta": {"total": 2}});
        assert_eq!(unwrap_envelope(body, &[]), json!([{"id": 1}, {"id": 2}]));
    }

    #[test]
    fn test_unwrap_envelope_mixed_keys() {
        let body = json!({"data": {"student": {"id": 4, "name": "Ana"}}});
        assert_eq!(
            unwrap_envelope(body, &["student", "Enrollment"]),
            json!({"id": 4, "name": "Ana"})
        );
    }

    #[test]
    fn test_error_message_prefers_message() {
        let body = json!({"message": "Invalid credentials", "error": "unauthorized"});
        assert_eq!(error_message(&body).as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_error_message_falls_back_to_error_and_envelope() {
        assert_eq!(
            error_message(&json!({"error": "Token revoked"})).as_deref(),
            Some("Token revoked")
        );
        assert_eq!(
            error_message(&json!({"data": {"message": "Nested"}})).as_deref(),
            Some("Nested")
        );
    }

    #[test]
    fn test_error_message_ignores_blank_and_non_objects() {
        assert_eq!(error_message(&json!({"message": "  "})), None);
        assert_eq!(error_message(&json!("plain text")), None);
        assert_eq!(error_message(&Value::Null), None);
    }

    #[test]
    fn test_first_validation_error_uses_server_order() {
        let body = json!({
            "message": "The given data was invalid.",
            "errors": {
                "phone": ["The phone field is required."],
                "email": ["Email already taken"]
            }
        });
        assert_eq!(
            first_validation_error(&body),
            Some(("phone".to_string(), "The phone field is required.".to_string()))
        );
    }

    #[test]
    fn test_first_validation_error_skips_empty_fields() {
        let body = json!({"errors": {"name": [], "email": "Email already taken"}});
        assert_eq!(
            first_validation_error(&body),
            Some(("email".to_string(), "Email already taken".to_string()))
        );
    }

    #[test]
    fn test_bearer_token_locations() {
        assert_eq!(
            bearer_token(&json!({"bearer_token": "tok123"})).as_deref(),
            Some("tok123")
        );
        assert_eq!(
            bearer_token(&json!({"data": {"token": "nested"}})).as_deref(),
            Some("nested")
        );
        assert_eq!(bearer_token(&json!({"token": ""})), None);
        assert_eq!(bearer_token(&json!({"message": "Registered"})), None);
    }

    #[test]
    fn test_member_skips_null() {
        let body = json!({"bearer_token": "t", "user": {"id": 1}, "cart": null});
        assert_eq!(member(&body, "user"), Some(&json!({"id": 1})));
        assert_eq!(member(&body, "cart"), None);
    }
}
