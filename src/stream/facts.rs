//! The `facts` feed: replays the pro's current facts window on connect,
//! then pushes a new window whenever facts change.

use super::cancel::CancelToken;
use super::session::{FeedPayload, FeedSession};
use crate::client::{require_pro_id, FeedClient};
use crate::error::{FeedResult, HandlerError};
use crate::models::FactsWindow;

const STREAM_FACTS: &str = "stream_facts";
const FACTS_STREAM_PATH: &str = "/api/facts/items/stream";

impl FeedPayload for FactsWindow {
    const EVENT_NAME: &'static str = "facts";
}

impl FeedClient {
    /// Open the facts stream for `pro_id` and return a pull session.
    pub async fn subscribe_facts(
        &self,
        cancel: &CancelToken,
        pro_id: &str,
    ) -> FeedResult<FeedSession<FactsWindow>> {
        let pro_id = require_pro_id(STREAM_FACTS, pro_id)?;
        let request = self.stream_request(FACTS_STREAM_PATH, &[("proId", pro_id)]);
        FeedSession::open(self.http(), request, cancel, STREAM_FACTS).await
    }

    /// Stream facts windows into `handler` until the server closes the
    /// stream, the handler fails or `cancel` fires.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let cancel = CancelToken::new();
    /// client
    ///     .stream_facts(&cancel, "pro-123", |window| {
    ///         println!("{} facts, cursor {:?}", window.items.len(), window.cursor());
    ///         Ok(())
    ///     })
    ///     .await?;
    /// ```
    pub async fn stream_facts<F>(
        &self,
        cancel: &CancelToken,
        pro_id: &str,
        handler: F,
    ) -> FeedResult<()>
    where
        F: FnMut(FactsWindow) -> Result<(), HandlerError>,
    {
        self.subscribe_facts(cancel, pro_id).await?.run(handler).await
    }
}
