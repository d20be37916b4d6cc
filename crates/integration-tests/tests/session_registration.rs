//! Registration and validation errors.

#![allow(clippy::unwrap_used)]

use oakline_core::Email;
use oakline_integration_tests::wiremock::matchers::{body_partial_json, method, path};
use oakline_integration_tests::wiremock::{Mock, ResponseTemplate};
use oakline_integration_tests::{TestContext, sample_user};
use oakline_session::{Registration, SessionError};
use secrecy::SecretString;
use serde_json::json;

fn registration() -> Registration {
    Registration {
        name: "A".to_string(),
        email: Email::parse("a@b.com").unwrap(),
        password: SecretString::from("pw12345678".to_owned()),
        password_confirmation: SecretString::from("pw12345678".to_owned()),
        phone: None,
        address: Some("12 Elm St".to_string()),
    }
}

#[tokio::test]
async fn test_field_validation_error_is_surfaced() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"email": ["Email already taken"], "name": ["Name is required"]}
        })))
        .mount(&ctx.server)
        .await;

    let err = ctx.session.register(&registration()).await.unwrap_err();

    let SessionError::Registration { field, message } = &err else {
        panic!("expected registration error, got {err:?}");
    };
    assert_eq!(field.as_deref(), Some("email"));
    assert_eq!(message, "Email already taken");
    assert!(!ctx.session.is_logged_in().await);
}

#[tokio::test]
async fn test_registration_sends_confirmation_and_optional_fields() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_partial_json(json!({
            "name": "A",
            "email": "a@b.com",
            "password_confirmation": "pw12345678",
            "address": "12 Elm St"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Registered"})))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let payload = ctx.session.register(&registration()).await.unwrap();

    assert_eq!(payload["message"], "Registered");
    assert!(!ctx.session.is_logged_in().await);
}

#[tokio::test]
async fn test_registration_with_token_logs_in() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "bearer_token": "fresh",
            "user": sample_user()
        })))
        .mount(&ctx.server)
        .await;

    ctx.session.register(&registration()).await.unwrap();

    assert!(ctx.session.is_logged_in().await);
    assert_eq!(ctx.session.stored_user().await.unwrap().name(), Some("A"));
}

#[tokio::test]
async fn test_registration_failure_without_details() {
    let ctx = TestContext::new().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let err = ctx.session.register(&registration()).await.unwrap_err();
    assert_eq!(err.message(), "Registration failed");
}
