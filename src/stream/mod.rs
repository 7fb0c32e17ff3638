//! Event stream sessions.
//!
//! Two feeds share one driver, [`FeedSession`]:
//! - `facts` via [`FeedClient::stream_facts`](crate::FeedClient::stream_facts)
//! - `matches` via [`FeedClient::stream_matches`](crate::FeedClient::stream_matches)
//!
//! Both are available as a callback loop (`stream_*`) or as a pull session
//! (`subscribe_*`) that also converts into a `futures::Stream`.

mod cancel;
mod facts;
mod matches;
mod session;

pub use cancel::CancelToken;
pub use matches::MatchesStreamOptions;
pub use session::{FeedPayload, FeedSession};
