//! Typed errors for non-success HTTP responses.

use bytes::Bytes;
use std::fmt;

use crate::traits::status_text;

/// Largest body prefix read from a failed stream response before classifying it.
pub const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

/// A non-2xx response from the feed API.
///
/// Carries the status code, a human-readable message and the raw body bytes
/// so callers can inspect the server's answer themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// HTTP status code, e.g. 400, 401, 503.
    pub status: u16,
    /// Extracted message, never empty once built by [`ApiError::from_response`].
    pub message: String,
    /// Raw response body (possibly a bounded prefix for stream responses).
    pub body: Bytes,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            message: message.into(),
            body: body.into(),
        }
    }

    /// Classify a non-success response.
    ///
    /// The message is the trimmed JSON `error` string when the body has one,
    /// otherwise the trimmed body text, otherwise the status line text
    /// (`"400 Bad Request"`).
    pub fn from_response(status: u16, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let message = extract_message(&body).unwrap_or_else(|| status_text(status));
        Self {
            status,
            message,
            body,
        }
    }

    /// 401 or 403.
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }

    /// Server errors plus 408 and 429 are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        self.status >= 500 || self.status == 429 || self.status == 408
    }

    /// Body as lossy UTF-8 text.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn extract_message(body: &[u8]) -> Option<String> {
    if body.is_empty() {
        return None;
    }

    if let Ok(serde_json::Value::Object(fields)) = serde_json::from_slice(body) {
        if let Some(serde_json::Value::String(error)) = fields.get("error") {
            let error = error.trim();
            if !error.is_empty() {
                return Some(error.to_string());
            }
        }
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "api error: status={}", self.status)
        } else {
            write!(f, "api error: status={} message={:?}", self.status, self.message)
        }
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_field_wins() {
        let err = ApiError::from_response(400, r#"{"error":"bad request"}"#);
        assert_eq!(err.status, 400);
        assert_eq!(err.message, "bad request");
        assert_eq!(err.body, Bytes::from(r#"{"error":"bad request"}"#));
    }

    #[test]
    fn test_json_error_is_trimmed() {
        let err = ApiError::from_response(422, r#"{"error":"  proId is required \n"}"#);
        assert_eq!(err.message, "proId is required");
    }

    #[test]
    fn test_blank_json_error_falls_back_to_body() {
        let body = r#"{"error":"   "}"#;
        let err = ApiError::from_response(400, body);
        assert_eq!(err.message, body);
    }

    #[test]
    fn test_non_string_error_falls_back_to_body() {
        let err = ApiError::from_response(500, r#"{"error":42}"#);
        assert_eq!(err.message, r#"{"error":42}"#);
    }

    #[test]
    fn test_plain_text_body() {
        let err = ApiError::from_response(503, "  upstream unavailable\n");
        assert_eq!(err.message, "upstream unavailable");
        assert_eq!(err.body, Bytes::from("  upstream unavailable\n"));
    }

    #[test]
    fn test_empty_body_uses_status_text() {
        let err = ApiError::from_response(404, Bytes::new());
        assert_eq!(err.message, "404 Not Found");
        assert!(err.body.is_empty());
    }

    #[test]
    fn test_whitespace_body_uses_status_text() {
        let err = ApiError::from_response(502, " \r\n ");
        assert_eq!(err.message, "502 Bad Gateway");
    }

    #[test]
    fn test_display() {
        let err = ApiError::from_response(400, r#"{"error":"bad request"}"#);
        assert_eq!(err.to_string(), r#"api error: status=400 message="bad request""#);

        let bare = ApiError::new(418, "", Bytes::new());
        assert_eq!(bare.to_string(), "api error: status=418");
    }

    #[test]
    fn test_retryable_and_auth() {
        assert!(ApiError::from_response(503, "").is_retryable());
        assert!(ApiError::from_response(429, "").is_retryable());
        assert!(ApiError::from_response(408, "").is_retryable());
        assert!(!ApiError::from_response(400, "").is_retryable());

        assert!(ApiError::from_response(401, "").is_auth_failure());
        assert!(ApiError::from_response(403, "").is_auth_failure());
        assert!(!ApiError::from_response(404, "").is_auth_failure());
    }
}
