//! Integration tests for notifications and the SSE feed.
//!
//! Requires a migrated database and a running server.
//! Run with: cargo test -- --ignored

use std::time::Duration;

use futures::StreamExt;
use kasir_integration_tests::TestContext;
use kasir_server::services::notifications::{TEST_NOTIFICATION, parse_payload};
use reqwest::StatusCode;
use serde_json::Value;

#[test]
fn test_trigger_payload_parses() {
    let notification = parse_payload(
        r#"{"id":"6a1f0c52-9a43-4d0e-8f0a-1b2c3d4e5f60","title":"Transaction",
            "description":"Transaction created successfully",
            "created_at":"2026-05-01T08:00:00.5+07:00","is_read":false}"#,
    )
    .unwrap();
    assert_eq!(notification.title, "Transaction");
    assert!(!notification.is_read);
}

async fn send_test(ctx: &TestContext) -> Value {
    let resp = ctx.post("/api/notifications/test").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.unwrap()
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_unread_filter_and_mark_read() {
    let ctx = TestContext::new().await;
    let sent = send_test(&ctx).await;
    assert_eq!(sent["title"], TEST_NOTIFICATION.0);
    assert_eq!(sent["is_read"], false);

    let unread = ctx.get_json("/api/notifications").await;
    let unread = unread.as_array().unwrap();
    assert!(unread.iter().any(|n| n["id"] == sent["id"]));
    assert!(unread.iter().all(|n| n["is_read"] == false));

    let id = sent["id"].as_str().unwrap();
    let resp = ctx
        .post(&format!("/api/notifications/{id}/read"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let read: Value = resp.json().await.unwrap();
    assert_eq!(read["is_read"], true);

    let unread = ctx.get_json("/api/notifications").await;
    assert!(!unread.as_array().unwrap().iter().any(|n| n["id"] == sent["id"]));
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_stream_delivers_inserts() {
    let ctx = TestContext::new().await;

    let resp = ctx.get("/api/notifications/stream").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let mut body = resp.bytes_stream();

    let mut received = String::new();
    let first = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("No unread snapshot")
        .unwrap()
        .unwrap();
    received.push_str(&String::from_utf8_lossy(&first));
    assert!(received.contains("event: unread"));

    let sent = send_test(&ctx).await;
    let id = sent["id"].as_str().unwrap().to_string();

    let delivered = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(chunk) = body.next().await {
            received.push_str(&String::from_utf8_lossy(&chunk.unwrap()));
            if received.contains("event: notification") && received.contains(&id) {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);
    assert!(delivered, "notification {id} not streamed");
}
