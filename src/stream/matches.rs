//! The `matches` feed: pushes match updates newer than a caller cursor.

use super::cancel::CancelToken;
use super::session::{FeedPayload, FeedSession};
use crate::client::{require_pro_id, FeedClient};
use crate::error::{FeedError, FeedResult, HandlerError};
use crate::models::{FeedCursor, MatchFilters, MatchesUpdate, MatchingDirection};

const STREAM_MATCHES: &str = "stream_matches";
const MATCHES_STREAM_PATH: &str = "/api/matches/items/stream";

impl FeedPayload for MatchesUpdate {
    const EVENT_NAME: &'static str = "matches";
}

/// Query options for the matches stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchesStreamOptions {
    pub direction: MatchingDirection,
    pub filters: MatchFilters,
}

impl MatchesStreamOptions {
    pub fn new(direction: MatchingDirection) -> Self {
        Self {
            direction,
            filters: MatchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: MatchFilters) -> Self {
        self.filters = filters;
        self
    }
}

impl FeedClient {
    /// Open the matches stream after `cursor` and return a pull session.
    ///
    /// The cursor must carry a real timestamp (neither the Unix epoch nor
    /// year one) and a non-negative id.
    pub async fn subscribe_matches(
        &self,
        cancel: &CancelToken,
        pro_id: &str,
        cursor: FeedCursor,
        options: &MatchesStreamOptions,
    ) -> FeedResult<FeedSession<MatchesUpdate>> {
        let pro_id = require_pro_id(STREAM_MATCHES, pro_id)?;
        if cursor.id < 0 {
            return Err(FeedError::invalid_argument(
                STREAM_MATCHES,
                "cursor id must be >= 0",
            ));
        }
        if cursor.is_zero() {
            return Err(FeedError::invalid_argument(
                STREAM_MATCHES,
                "cursor timestamp must not be zero",
            ));
        }

        let mut query = vec![
            ("proId", pro_id),
            ("sinceUpdatedUtc", cursor.since_param()),
            ("sinceId", cursor.id.to_string()),
            ("direction", options.direction.as_str().to_string()),
        ];
        query.extend(options.filters.query_pairs());

        let request = self.stream_request(MATCHES_STREAM_PATH, &query);
        FeedSession::open(self.http(), request, cancel, STREAM_MATCHES).await
    }

    /// Stream match updates into `handler` until the server closes the
    /// stream, the handler fails or `cancel` fires.
    ///
    /// Each update carries the next cursor; reconnecting with it resumes
    /// where this stream stopped.
    pub async fn stream_matches<F>(
        &self,
        cancel: &CancelToken,
        pro_id: &str,
        cursor: FeedCursor,
        options: &MatchesStreamOptions,
        handler: F,
    ) -> FeedResult<()>
    where
        F: FnMut(MatchesUpdate) -> Result<(), HandlerError>,
    {
        self.subscribe_matches(cancel, pro_id, cursor, options)
            .await?
            .run(handler)
            .await
    }
}
