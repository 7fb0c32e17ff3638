//! Feedline - client for the pro facts and matches feeds
//!
//! REST calls and Server-Sent Events subscriptions over one [`FeedClient`].
//! This library exposes modules for use in integration tests.

pub mod adapters;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod sse;
pub mod stream;
pub mod traits;

pub use auth::Identity;
pub use client::FeedClient;
pub use config::FeedConfig;
pub use error::{ApiError, ErrorCategory, FeedError, FeedResult, HandlerError, ProtocolError};
pub use models::{
    FactItem, FactsWindow, FeedCursor, MatchFilters, MatchItem, MatchesSnapshot, MatchesUpdate,
    MatchingDirection, SpeechAudioUpload, SpeechStatusResponse, SpeechTextUpload,
    SpeechUploadResponse,
};
pub use stream::{CancelToken, FeedPayload, FeedSession, MatchesStreamOptions};
