//! Client configuration.
//!
//! Built in code with the `with_*` methods or read from the environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `FEEDLINE_BASE_URL` | API base URL (required) |
//! | `FEEDLINE_PRO_ID` | Pro id sent as `X-Pro-Id` |
//! | `FEEDLINE_PRO_TOKEN` | Pro token sent as `X-Pro-Token` |
//! | `FEEDLINE_CONNECT_TIMEOUT_SECS` | Connect timeout, default 10 |

use std::time::Duration;

use crate::auth::{non_blank, Identity};
use crate::error::{FeedError, FeedResult};

pub const BASE_URL_ENV: &str = "FEEDLINE_BASE_URL";
pub const PRO_ID_ENV: &str = "FEEDLINE_PRO_ID";
pub const PRO_TOKEN_ENV: &str = "FEEDLINE_PRO_TOKEN";
pub const CONNECT_TIMEOUT_ENV: &str = "FEEDLINE_CONNECT_TIMEOUT_SECS";

/// Default TCP/TLS connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for a [`FeedClient`](crate::FeedClient).
///
/// Only connecting is bounded by a timeout. Event streams stay open for as
/// long as the server keeps them.
///
/// # Example
///
/// ```ignore
/// use feedline::FeedConfig;
///
/// let config = FeedConfig::new("https://api.example.com")
///     .with_auth("pro-123", "token")
///     .with_connect_timeout(std::time::Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct FeedConfig {
    /// API base URL; any path prefix is kept
    pub base_url: String,
    pub pro_id: Option<String>,
    pub pro_token: Option<String>,
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl FeedConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pro_id: None,
            pro_token: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: concat!("feedline/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Set the pro identity sent with every request.
    pub fn with_auth(mut self, pro_id: &str, pro_token: &str) -> Self {
        self.pro_id = non_blank(pro_id);
        self.pro_token = non_blank(pro_token);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Read configuration from `FEEDLINE_*` environment variables.
    pub fn from_env() -> FeedResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> FeedResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_ENV)
            .and_then(|v| non_blank(&v))
            .ok_or_else(|| FeedError::Config(format!("{} must be set", BASE_URL_ENV)))?;

        let mut config = Self::new(base_url).with_auth(
            &lookup(PRO_ID_ENV).unwrap_or_default(),
            &lookup(PRO_TOKEN_ENV).unwrap_or_default(),
        );

        if let Some(raw) = lookup(CONNECT_TIMEOUT_ENV).and_then(|v| non_blank(&v)) {
            let secs: u64 = raw.parse().map_err(|_| {
                FeedError::Config(format!(
                    "{} must be a whole number of seconds, got {:?}",
                    CONNECT_TIMEOUT_ENV, raw
                ))
            })?;
            config.connect_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    pub fn identity(&self) -> Identity {
        Identity::new(
            self.pro_id.as_deref().unwrap_or_default(),
            self.pro_token.as_deref().unwrap_or_default(),
        )
    }
}

impl std::fmt::Debug for FeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedConfig")
            .field("base_url", &self.base_url)
            .field("pro_id", &self.pro_id)
            .field("pro_token", &self.pro_token.as_ref().map(|_| "[REDACTED]"))
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
