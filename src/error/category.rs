//! Error category classification.
//!
//! Categories give callers a coarse signal for their own retry and
//! reconnect policy. Nothing in this crate retries on its own.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Connection, DNS, timeout or a broken stream.
    /// Generally transient and retryable.
    Network,

    /// HTTP 401/403.
    Auth,

    /// HTTP 5xx, 408 and 429.
    /// Generally transient and retryable after delay.
    Server,

    /// The request itself was rejected (other 4xx) or invalid before sending.
    Client,

    /// The server broke the stream protocol or sent undecodable JSON.
    Protocol,

    /// The caller asked the operation to stop.
    Cancelled,

    /// Missing or malformed configuration.
    Configuration,

    /// The caller's handler returned an error.
    Handler,
}

impl ErrorCategory {
    /// Returns true if errors in this category are generally transient
    /// and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Server)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Auth => "auth",
            ErrorCategory::Server => "server",
            ErrorCategory::Client => "client",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Handler => "handler",
        }
    }

    /// Returns a short description of the category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCategory::Network => "Network connectivity issue",
            ErrorCategory::Auth => "Authentication problem",
            ErrorCategory::Server => "Server-side issue",
            ErrorCategory::Client => "Request rejected",
            ErrorCategory::Protocol => "Malformed stream data",
            ErrorCategory::Cancelled => "Cancelled by caller",
            ErrorCategory::Configuration => "Configuration problem",
            ErrorCategory::Handler => "Handler failure",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_retryable() {
        assert!(ErrorCategory::Network.is_retryable());
        assert!(ErrorCategory::Server.is_retryable());
        assert!(!ErrorCategory::Auth.is_retryable());
        assert!(!ErrorCategory::Client.is_retryable());
        assert!(!ErrorCategory::Protocol.is_retryable());
        assert!(!ErrorCategory::Cancelled.is_retryable());
        assert!(!ErrorCategory::Configuration.is_retryable());
        assert!(!ErrorCategory::Handler.is_retryable());
    }

    #[test]
    fn test_category_display() {
        assert_eq!(format!("{}", ErrorCategory::Network), "network");
        assert_eq!(format!("{}", ErrorCategory::Protocol), "protocol");
        assert_eq!(ErrorCategory::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_category_description() {
        assert!(ErrorCategory::Network.description().contains("Network"));
        assert!(ErrorCategory::Auth.description().contains("Authentication"));
    }
}
