//! Protocol violations seen inside an open event stream.

use thiserror::Error;

/// The server sent something a feed cannot accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// A matching (or unnamed) event carried no data lines.
    #[error("received event {event:?} with empty data payload")]
    EmptyPayload { event: &'static str },
}
