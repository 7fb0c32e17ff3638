//! Unified error type for feed operations.

use thiserror::Error;

use super::api::ApiError;
use super::category::ErrorCategory;
use super::stream::ProtocolError;
use crate::traits::HttpError;

/// Error type returned by a caller's handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type alias for Results using [`FeedError`].
pub type FeedResult<T> = Result<T, FeedError>;

/// Everything a feed operation can fail with.
///
/// Every variant except [`FeedError::Handler`] names the operation it came
/// from (`"stream_facts"`, `"get_matches_updates"`, ...).
#[derive(Debug, Error)]
pub enum FeedError {
    /// Rejected before any I/O.
    #[error("{operation}: {message}")]
    InvalidArgument {
        operation: &'static str,
        message: String,
    },

    /// Missing or malformed configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request could not be sent or no response headers arrived.
    #[error("{operation}: http request failed: {source}")]
    Connection {
        operation: &'static str,
        #[source]
        source: HttpError,
    },

    /// The server answered with a non-2xx status.
    #[error("{operation}: {source}")]
    Api {
        operation: &'static str,
        #[source]
        source: ApiError,
    },

    /// The response body failed mid-read.
    #[error("{operation}: read SSE event: {source}")]
    Read {
        operation: &'static str,
        #[source]
        source: HttpError,
    },

    /// The stream violated the feed protocol.
    #[error("{operation}: {source}")]
    Protocol {
        operation: &'static str,
        #[source]
        source: ProtocolError,
    },

    /// A JSON payload did not match the expected shape.
    #[error("{operation}: decode JSON: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The caller's cancel token fired.
    #[error("{operation}: cancelled")]
    Cancelled { operation: &'static str },

    /// The caller's handler failed; the error is passed through untouched.
    #[error("{0}")]
    Handler(HandlerError),
}

impl FeedError {
    pub(crate) fn invalid_argument(operation: &'static str, message: impl Into<String>) -> Self {
        FeedError::InvalidArgument {
            operation,
            message: message.into(),
        }
    }

    /// Get the error category for handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            FeedError::InvalidArgument { .. } => ErrorCategory::Client,
            FeedError::Config(_) => ErrorCategory::Configuration,
            FeedError::Connection { source, .. } | FeedError::Read { source, .. } => {
                match source {
                    HttpError::InvalidUrl(_) => ErrorCategory::Configuration,
                    HttpError::Cancelled => ErrorCategory::Cancelled,
                    _ => ErrorCategory::Network,
                }
            }
            FeedError::Api { source, .. } => {
                if source.is_auth_failure() {
                    ErrorCategory::Auth
                } else if source.is_retryable() {
                    ErrorCategory::Server
                } else {
                    ErrorCategory::Client
                }
            }
            FeedError::Protocol { .. } | FeedError::Decode { .. } => ErrorCategory::Protocol,
            FeedError::Cancelled { .. } => ErrorCategory::Cancelled,
            FeedError::Handler(_) => ErrorCategory::Handler,
        }
    }

    /// Check if another attempt might succeed.
    ///
    /// Advisory only; reconnect policy belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// True when the caller's cancel token ended the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FeedError::Cancelled { .. })
    }

    /// The typed API error, if the server rejected the request.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            FeedError::Api { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Borrow the handler's error, for downcasting.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            FeedError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Take back the handler's error unchanged.
    pub fn into_handler_error(self) -> Result<HandlerError, FeedError> {
        match self {
            FeedError::Handler(err) => Ok(err),
            other => Err(other),
        }
    }
}
