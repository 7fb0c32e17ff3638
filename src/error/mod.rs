//! Error handling for feed operations.
//!
//! - **Error Categories**: coarse classification for caller-side policy
//! - **Domain errors**: [`ApiError`] for non-2xx responses, [`ProtocolError`]
//!   for broken streams
//! - **Unified Error Type**: [`FeedError`] with [`FeedResult<T>`]
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection, timeout, broken body | Yes |
//! | Server | 5xx, 408, 429 | Yes |
//! | Auth | 401, 403 | No |
//! | Client | Other 4xx, invalid arguments | No |
//! | Protocol | Empty payloads, bad JSON | No |
//! | Cancelled | Caller stopped the operation | No |
//! | Configuration | Bad base URL or settings | No |
//! | Handler | Caller's handler failed | No |

mod api;
mod category;
mod feed_error;
mod stream;

pub use api::{ApiError, MAX_ERROR_BODY_BYTES};
pub use category::ErrorCategory;
pub use feed_error::{FeedError, FeedResult, HandlerError};
pub use stream::ProtocolError;
