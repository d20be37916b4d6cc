//! Profile fetch and update.

#![allow(clippy::unwrap_used)]

use oakline_core::UserId;
use oakline_integration_tests::wiremock::matchers::{body_json, header, method, path};
use oakline_integration_tests::wiremock::{Mock, ResponseTemplate};
use oakline_integration_tests::{TestContext, sample_user};
use oakline_session::{ProfileChanges, SessionError};
use serde_json::json;

#[tokio::test]
async fn test_current_user_accepts_bare_payload() {
    let ctx = TestContext::new().await;
    ctx.mount_login("tok123", sample_user()).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "name": "A", "email": "a@b.com", "phone": "555-0100"
        })))
        .mount(&ctx.server)
        .await;
    ctx.login().await;

    let me = ctx.session.current_user().await.unwrap();

    assert_eq!(me.id(), Some(UserId::new(1)));
    assert_eq!(me.phone(), Some("555-0100"));
}

#[tokio::test]
async fn test_current_user_failure_uses_generic_message() {
    let ctx = TestContext::new().await;
    ctx.mount_login("tok123", sample_user()).await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;
    ctx.login().await;

    let err = ctx.session.current_user().await.unwrap_err();
    assert!(matches!(err, SessionError::ProfileFetch(_)));
    assert_eq!(err.message(), "Failed to fetch user profile");
}

#[tokio::test]
async fn test_update_profile_returns_response_verbatim() {
    let ctx = TestContext::new().await;
    ctx.mount_login("tok123", sample_user()).await;
    let response = json!({"message": "Profile updated", "data": {"id": 1, "phone": "555-0199"}});
    Mock::given(method("PUT"))
        .and(path("/user/profile"))
        .and(header("authorization", "Bearer tok123"))
        .and(body_json(json!({"phone": "555-0199"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(response.clone()))
        .expect(1)
        .mount(&ctx.server)
        .await;
    ctx.login().await;

    let changes = ProfileChanges {
        phone: Some("555-0199".to_string()),
        ..ProfileChanges::default()
    };
    let payload = ctx.session.update_profile(&changes).await.unwrap();

    assert_eq!(payload, response);
}

#[tokio::test]
async fn test_update_profile_reports_service_message() {
    let ctx = TestContext::new().await;
    ctx.mount_login("tok123", sample_user()).await;
    Mock::given(method("PUT"))
        .and(path("/user/profile"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Phone is invalid"})),
        )
        .mount(&ctx.server)
        .await;
    ctx.login().await;

    let err = ctx
        .session
        .update_profile(&ProfileChanges {
            phone: Some("x".to_string()),
            ..ProfileChanges::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::ProfileUpdate(_)));
    assert_eq!(err.message(), "Phone is invalid");
    assert!(ctx.session.is_logged_in().await);
}
