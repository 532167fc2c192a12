//! Health endpoint integration tests.

mod common;

use common::TestHarness;

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "parkease");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let harness = TestHarness::new();

    let response = harness.server.get("/v1/parking/active").await;

    response.assert_status_unauthorized();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn token_signed_with_wrong_secret_is_unauthorized() {
    let harness = TestHarness::new();
    let forged = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &serde_json::json!({
            "sub": "branch-north",
            "aud": common::AUDIENCE,
            "iss": common::ISSUER,
            "exp": chrono::Utc::now().timestamp() + 3600,
        }),
        &jsonwebtoken::EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();

    let response = harness
        .server
        .get("/v1/parking/active")
        .add_header(TestHarness::auth_name(), common::bearer(&forged))
        .await;

    response.assert_status_unauthorized();
}
