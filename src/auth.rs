//! Pro identity and request header merging.

use crate::traits::{header_value, set_header, Headers};

/// Header carrying the pro id.
pub const PRO_ID_HEADER: &str = "X-Pro-Id";
/// Header carrying the pro token.
pub const PRO_TOKEN_HEADER: &str = "X-Pro-Token";
/// Header carrying the admin key for wallet creation.
pub const ADMIN_KEY_HEADER: &str = "X-Manax-Key";

pub const ACCEPT_JSON: &str = "application/json";
pub const ACCEPT_EVENT_STREAM: &str = "text/event-stream";

/// Credentials sent with every request, when set.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pro_id: Option<String>,
    pro_token: Option<String>,
}

impl Identity {
    /// Values are trimmed; empty ones are treated as unset.
    pub fn new(pro_id: &str, pro_token: &str) -> Self {
        Self {
            pro_id: non_blank(pro_id),
            pro_token: non_blank(pro_token),
        }
    }

    /// No identity headers at all.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn pro_id(&self) -> Option<&str> {
        self.pro_id.as_deref()
    }

    pub fn pro_token(&self) -> Option<&str> {
        self.pro_token.as_deref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.pro_id.is_none() && self.pro_token.is_none()
    }

    /// Build the final header set for a request.
    ///
    /// Caller headers are copied first, identity headers then replace any
    /// same-named entry, and `Accept: application/json` is added only when the
    /// caller set no `Accept`.
    pub fn merge_headers(&self, extra: &Headers) -> Headers {
        let mut merged = extra.clone();

        if let Some(pro_id) = &self.pro_id {
            set_header(&mut merged, PRO_ID_HEADER, pro_id.as_str());
        }
        if let Some(token) = &self.pro_token {
            set_header(&mut merged, PRO_TOKEN_HEADER, token.as_str());
        }
        if header_value(&merged, "Accept").is_none() {
            merged.insert("Accept".to_string(), ACCEPT_JSON.to_string());
        }

        merged
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("pro_id", &self.pro_id)
            .field("pro_token", &self.pro_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
