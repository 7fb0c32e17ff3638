//! Common test utilities for integration tests.
//!
//! Wiremock helpers for serving canned event streams and JSON bodies to a
//! real [`FeedClient`] over HTTP.

#![allow(dead_code)]

use feedline::FeedClient;
use wiremock::{MockServer, ResponseTemplate};

pub const PRO_ID: &str = "pro-123";
pub const PRO_TOKEN: &str = "test-pro-token";

/// Client pointed at the mock server, authenticated as [`PRO_ID`].
pub fn test_client(server: &MockServer) -> FeedClient {
    FeedClient::new(&server.uri())
        .expect("mock server uri is a valid base url")
        .with_auth(PRO_ID, PRO_TOKEN)
}

/// One named event with a single data line.
pub fn event(name: &str, data: &str) -> String {
    format!("event: {}\ndata: {}\n\n", name, data)
}

/// A comment-only frame, as sent for keepalives.
pub fn comment(text: &str) -> String {
    format!(": {}\n\n", text)
}

/// 200 response carrying `frames` as an event-stream body.
pub fn sse_response(frames: &[String]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(frames.concat(), "text/event-stream")
}

pub fn facts_json(cursor_id: i64, ids: &[i64]) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "proId": PRO_ID,
                "factText": format!("fact {}", id),
                "status": "ok",
                "updatedUtc": "2025-01-02T03:04:05Z",
                "isWritable": true
            })
        })
        .collect();
    serde_json::json!({
        "proId": PRO_ID,
        "cursorUpdatedUtc": "2025-01-02T03:04:05Z",
        "cursorId": cursor_id,
        "items": items
    })
    .to_string()
}

pub fn matches_json(cursor_id: i64, ids: &[i64]) -> String {
    let items: Vec<_> = ids
        .iter()
        .map(|id| {
            serde_json::json!({
                "id": id,
                "proId": PRO_ID,
                "targetProId": format!("pro-{}", id),
                "direction": "Offer",
                "score": 0.9,
                "rationale": "shared interests"
            })
        })
        .collect();
    serde_json::json!({
        "proId": PRO_ID,
        "direction": "Offer",
        "cursorUpdatedUtc": "2025-01-02T03:04:05Z",
        "cursorId": cursor_id,
        "items": items
    })
    .to_string()
}
