use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::cursor::FeedCursor;

/// A single fact about a pro.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactItem {
    pub id: i64,
    pub pro_id: String,
    pub fact_text: String,
    pub fact_hash: String,
    /// "ok", "stale" or "false"
    pub status: String,
    /// Explanation when `status` is "false"
    pub false_reason: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub last_seen_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
    /// "ok", "not" or unset
    pub review_status: Option<String>,
    pub review_updated_utc: Option<DateTime<Utc>>,
    pub is_writable: bool,
}

/// A window of facts plus the cursor reached.
///
/// Returned by the facts snapshot and updates endpoints and carried by
/// every `facts` stream event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FactsWindow {
    pub pro_id: String,
    pub cursor_updated_utc: DateTime<Utc>,
    pub cursor_id: i64,
    pub items: Vec<FactItem>,
}

impl FactsWindow {
    pub fn cursor(&self) -> FeedCursor {
        FeedCursor::new(self.cursor_updated_utc, self.cursor_id)
    }
}

/// Body of a review-status patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatusRequest {
    pub review_status: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PatchReviewStatusResponse {
    pub code: String,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_partial_window_decodes() {
        let window: FactsWindow = serde_json::from_str(r#"{"id":1,"items":[]}"#).unwrap();
        assert!(window.items.is_empty());
        assert!(window.cursor().is_zero());
    }

    #[test]
    fn test_full_window_decodes() {
        let json = r#"{
            "proId": "pro-1",
            "cursorUpdatedUtc": "2025-01-02T03:04:05.123Z",
            "cursorId": 17,
            "items": [{
                "id": 17,
                "proId": "pro-1",
                "factText": "Speaks French",
                "factHash": "abc",
                "status": "false",
                "falseReason": "contradicted",
                "createdUtc": "2025-01-01T00:00:00Z",
                "lastSeenUtc": "2025-01-02T00:00:00Z",
                "updatedUtc": "2025-01-02T03:04:05Z",
                "reviewStatus": null,
                "reviewUpdatedUtc": null,
                "isWritable": true
            }]
        }"#;

        let window: FactsWindow = serde_json::from_str(json).unwrap();
        assert_eq!(window.pro_id, "pro-1");
        assert_eq!(window.cursor().id, 17);
        assert_eq!(window.cursor().since_param(), "2025-01-02T03:04:05Z");
        assert_eq!(
            window.items[0].created_utc,
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        );

        let item = &window.items[0];
        assert_eq!(item.fact_text, "Speaks French");
        assert_eq!(item.false_reason.as_deref(), Some("contradicted"));
        assert_eq!(item.review_status, None);
        assert!(item.is_writable);
    }

    #[test]
    fn test_unset_server_cursor_is_zero() {
        let window: FactsWindow = serde_json::from_str(
            r#"{"proId":"p","cursorUpdatedUtc":"0001-01-01T00:00:00Z","cursorId":0}"#,
        )
        .unwrap();
        assert!(window.cursor().is_zero());
    }

    #[test]
    fn test_review_status_request_shape() {
        let body = serde_json::to_string(&ReviewStatusRequest {
            review_status: "ok".to_string(),
        })
        .unwrap();
        assert_eq!(body, r#"{"reviewStatus":"ok"}"#);
    }
}
