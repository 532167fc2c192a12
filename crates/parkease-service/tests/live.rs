//! Live feed integration tests.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use common::TestHarness;

#[tokio::test]
async fn live_feed_requires_auth() {
    let harness = TestHarness::with_http_transport();

    let response = harness.server.get_websocket("/v1/parking/live").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn live_feed_streams_only_own_branch_events() {
    let harness = TestHarness::with_http_transport();

    let mut socket = harness
        .server
        .get_websocket("/v1/parking/live")
        .add_header(TestHarness::auth_name(), harness.user_auth())
        .await
        .into_websocket()
        .await;

    harness
        .server
        .post("/v1/parking/entries")
        .add_header(TestHarness::auth_name(), TestHarness::other_user_auth())
        .json(&json!({ "plate": "SOU-001" }))
        .await
        .assert_status(StatusCode::CREATED);

    harness
        .server
        .post("/v1/parking/entries")
        .add_header(TestHarness::auth_name(), harness.user_auth())
        .json(&json!({ "plate": "NOR-001" }))
        .await
        .assert_status(StatusCode::CREATED);

    let event: Value = socket.receive_json().await;
    assert_eq!(event["kind"], "entered");
    assert_eq!(event["record"]["plate"], "NOR-001");
    assert_eq!(event["record"]["branch_id"], "branch-north");

    let next = tokio::time::timeout(Duration::from_millis(200), socket.receive_text()).await;
    assert!(next.is_err(), "no further frame expected");
}

#[tokio::test]
async fn live_feed_reports_payments() {
    let harness = TestHarness::with_http_transport();
    let record = harness.park("ABC-123", 60);

    let mut socket = harness
        .server
        .get_websocket("/v1/parking/live")
        .add_header(TestHarness::auth_name(), harness.user_auth())
        .await
        .into_websocket()
        .await;

    harness
        .server
        .post(&format!("/v1/parking/{}/pay", record.id))
        .add_header(TestHarness::auth_name(), harness.user_auth())
        .json(&json!({}))
        .await
        .assert_status_ok();

    let event: Value = socket.receive_json().await;
    assert_eq!(event["kind"], "completed");
    assert_eq!(event["record"]["id"], record.id.to_string());
    assert_eq!(event["record"]["status"], "completed");
}
