//! Generic event-stream session.
//!
//! A [`FeedSession`] owns one open response body. It reads frames, drops
//! keepalives and unrelated events, decodes matching payloads and hands them
//! out one at a time. Nothing is read ahead of the consumer.

use bytes::BytesMut;
use futures::stream::{self, Stream, StreamExt};
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tracing::{debug, trace};

use super::cancel::CancelToken;
use crate::error::{
    ApiError, FeedError, FeedResult, HandlerError, ProtocolError, MAX_ERROR_BODY_BYTES,
};
use crate::sse::{Frame, FrameReader};
use crate::traits::{ByteStream, HttpClient, HttpRequest};

/// A JSON payload carried by a named stream event.
pub trait FeedPayload: DeserializeOwned + Send + 'static {
    /// Event name this payload arrives under.
    const EVENT_NAME: &'static str;
}

/// One open event stream.
///
/// The response body is released exactly once: at end of stream, on the
/// first error, or when the session is dropped. After that `next()` keeps
/// returning `Ok(None)`.
pub struct FeedSession<T> {
    operation: &'static str,
    reader: Option<FrameReader<ByteStream>>,
    cancel: CancelToken,
    _payload: PhantomData<fn() -> T>,
}

impl<T: FeedPayload> FeedSession<T> {
    /// Send `request` and wait for response headers.
    ///
    /// Non-2xx statuses are classified from a bounded body prefix and
    /// returned as [`FeedError::Api`].
    pub(crate) async fn open(
        http: &dyn HttpClient,
        request: HttpRequest,
        cancel: &CancelToken,
        operation: &'static str,
    ) -> FeedResult<Self> {
        if cancel.is_cancelled() {
            return Err(FeedError::Cancelled { operation });
        }

        debug!(operation, url = %request.url, "Opening event stream");

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FeedError::Cancelled { operation }),
            result = http.execute_stream(request) => result,
        };

        let response = match result {
            Ok(response) => response,
            Err(source) => {
                if cancel.is_cancelled() {
                    return Err(FeedError::Cancelled { operation });
                }
                return Err(FeedError::Connection { operation, source });
            }
        };

        if !response.is_success() {
            let status = response.status;
            let body = read_error_body(response.body, cancel).await;
            let source = ApiError::from_response(status, body);
            debug!(operation, status, message = %source.message, "Event stream rejected");
            return Err(FeedError::Api { operation, source });
        }

        debug!(operation, status = response.status, "Event stream open");

        Ok(Self {
            operation,
            reader: Some(FrameReader::new(response.body)),
            cancel: cancel.clone(),
            _payload: PhantomData,
        })
    }

    /// Wait for the next matching payload.
    ///
    /// `Ok(None)` means the server ended the stream.
    pub async fn next(&mut self) -> FeedResult<Option<T>> {
        loop {
            let Some(reader) = self.reader.as_mut() else {
                return Ok(None);
            };

            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                result = reader.next_frame() => Some(result),
            };

            let frame = match read {
                None => {
                    self.close();
                    return Err(FeedError::Cancelled {
                        operation: self.operation,
                    });
                }
                Some(Ok(Some(frame))) => frame,
                Some(Ok(None)) => {
                    debug!(operation = self.operation, "Event stream ended");
                    self.close();
                    return Ok(None);
                }
                Some(Err(source)) => {
                    self.close();
                    if self.cancel.is_cancelled() {
                        return Err(FeedError::Cancelled {
                            operation: self.operation,
                        });
                    }
                    return Err(FeedError::Read {
                        operation: self.operation,
                        source,
                    });
                }
            };

            match self.accept(frame) {
                Ok(Some(payload)) => return Ok(Some(payload)),
                Ok(None) => continue,
                Err(err) => {
                    self.close();
                    return Err(err);
                }
            }
        }
    }

    /// Feed every payload to `handler` until the stream ends.
    ///
    /// The handler runs inline, one payload at a time. Its error stops the
    /// loop and comes back as [`FeedError::Handler`] untouched.
    pub async fn run<F>(mut self, mut handler: F) -> FeedResult<()>
    where
        F: FnMut(T) -> Result<(), HandlerError>,
    {
        while let Some(payload) = self.next().await? {
            if let Err(err) = handler(payload) {
                self.close();
                return Err(FeedError::Handler(err));
            }
        }
        Ok(())
    }

    /// Adapt the session into a `Stream` of payloads.
    ///
    /// The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = FeedResult<T>> + Send {
        stream::unfold(Some(self), |state| async move {
            let mut session = state?;
            match session.next().await {
                Ok(Some(payload)) => Some((Ok(payload), Some(session))),
                Ok(None) => None,
                Err(err) => Some((Err(err), None)),
            }
        })
    }

    /// True once the response body has been released.
    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    fn accept(&self, frame: Frame) -> FeedResult<Option<T>> {
        if frame.is_comment_only() {
            trace!(
                operation = self.operation,
                comment = frame.comment.as_deref().unwrap_or_default(),
                "Keepalive"
            );
            return Ok(None);
        }

        if let Some(name) = frame.event_name() {
            if name != T::EVENT_NAME {
                debug!(operation = self.operation, event = name, "Skipping unrelated event");
                return Ok(None);
            }
        }

        if frame.data.is_empty() {
            return Err(FeedError::Protocol {
                operation: self.operation,
                source: ProtocolError::EmptyPayload {
                    event: T::EVENT_NAME,
                },
            });
        }

        serde_json::from_slice(&frame.data)
            .map(Some)
            .map_err(|source| FeedError::Decode {
                operation: self.operation,
                source,
            })
    }

    fn close(&mut self) {
        if self.reader.take().is_some() {
            trace!(operation = self.operation, "Released event stream body");
        }
    }
}

impl<T> std::fmt::Debug for FeedSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSession")
            .field("operation", &self.operation)
            .field("open", &self.reader.is_some())
            .finish_non_exhaustive()
    }
}

/// Read at most [`MAX_ERROR_BODY_BYTES`] of a failed response, then drop it.
///
/// Read errors and cancellation just end the read early.
async fn read_error_body(mut body: ByteStream, cancel: &CancelToken) -> BytesMut {
    let mut buf = BytesMut::new();
    while buf.len() < MAX_ERROR_BODY_BYTES {
        let chunk = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            chunk = body.next() => chunk,
        };
        match chunk {
            Some(Ok(bytes)) => {
                let room = MAX_ERROR_BODY_BYTES - buf.len();
                buf.extend_from_slice(&bytes[..bytes.len().min(room)]);
            }
            _ => break,
        }
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse, MockStream};
    use crate::traits::HttpError;
    use bytes::Bytes;
    use reqwest::Method;
    use serde::Deserialize;
    use std::time::Duration;

    const URL: &str = "https://feeds.test/api/things/stream";

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: i64,
    }

    impl FeedPayload for Thing {
        const EVENT_NAME: &'static str = "things";
    }

    fn request() -> HttpRequest {
        HttpRequest::new(Method::GET, URL.parse().unwrap())
    }

    async fn open(client: &MockHttpClient, cancel: &CancelToken) -> FeedResult<FeedSession<Thing>> {
        FeedSession::open(client, request(), cancel, "stream_things").await
    }

    fn client_with(stream: MockStream) -> MockHttpClient {
        let client = MockHttpClient::new();
        client.set_response(URL, MockResponse::Stream(stream));
        client
    }

    #[tokio::test]
    async fn test_payloads_in_order_skipping_noise() {
        let client = client_with(MockStream::ok([
            ": ping\n\n",
            "event: things\ndata: {\"id\":1}\n\n",
            "event: other\ndata: {\"id\":99}\n\n",
            "data: {\"id\":2}\n\n",
            "event: things\ndata: {\"id\":3}\n\n",
        ]));
        let cancel = CancelToken::new();
        let mut session = open(&client, &cancel).await.unwrap();

        let mut ids = Vec::new();
        while let Some(thing) = session.next().await.unwrap() {
            ids.push(thing.id);
        }

        assert_eq!(ids, vec![1, 2, 3]);
        assert!(session.is_closed());
        assert_eq!(client.closed_streams(), 1);
        assert!(session.next().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_empty_payload_is_fatal_and_closes_once() {
        let client = client_with(MockStream::ok([
            "event: things\n\n",
            "event: things\ndata: {\"id\":1}\n\n",
        ]));
        let cancel = CancelToken::new();
        let mut session = open(&client, &cancel).await.unwrap();

        let err = session.next().await.unwrap_err();
        assert!(matches!(
            err,
            FeedError::Protocol {
                source: ProtocolError::EmptyPayload { event: "things" },
                ..
            }
        ));
        assert_eq!(client.closed_streams(), 1);

        assert!(session.next().await.unwrap().is_none());
        drop(session);
        assert_eq!(client.closed_streams(), 1);
    }

    #[tokio::test]
    async fn test_bad_json_is_decode_error() {
        let client = client_with(MockStream::ok(["data: {\"id\":\"x\"}\n\n"]));
        let cancel = CancelToken::new();
        let mut session = open(&client, &cancel).await.unwrap();

        let err = session.next().await.unwrap_err();
        assert!(matches!(err, FeedError::Decode { .. }));
        assert_eq!(client.closed_streams(), 1);
    }

    #[tokio::test]
    async fn test_cancel_unblocks_pending_read() {
        let client =
            client_with(MockStream::ok(["event: things\ndata: {\"id\":1}\n\n"]).hold_open());
        let cancel = CancelToken::new();
        let mut session = open(&client, &cancel).await.unwrap();

        assert_eq!(session.next().await.unwrap(), Some(Thing { id: 1 }));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(Duration::from_secs(2), session.next())
            .await
            .expect("blocked read should unblock")
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(client.closed_streams(), 1);
    }

    #[tokio::test]
    async fn test_cancel_preferred_over_read_error() {
        let client = client_with(
            MockStream::ok(["data: {\"id\":1}\n\n"]).then_error(HttpError::Io("reset".to_string())),
        );
        let cancel = CancelToken::new();
        let mut session = open(&client, &cancel).await.unwrap();

        assert!(session.next().await.unwrap().is_some());
        cancel.cancel();

        let err = session.next().await.unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_read_error_without_cancel() {
        let client = client_with(
            MockStream::ok(["data: {\"id\":1}\n\n"]).then_error(HttpError::Io("reset".to_string())),
        );
        let cancel = CancelToken::new();
        let mut session = open(&client, &cancel).await.unwrap();

        assert!(session.next().await.unwrap().is_some());
        let err = session.next().await.unwrap_err();
        assert!(matches!(err, FeedError::Read { source: HttpError::Io(_), .. }));
        assert_eq!(client.closed_streams(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_is_classified() {
        let client = client_with(
            MockStream::ok([r#"{"error":"#, r#""bad request"}"#]).with_status(400),
        );
        let cancel = CancelToken::new();

        let err = open(&client, &cancel).await.unwrap_err();
        let api = err.api_error().expect("api error");
        assert_eq!(api.status, 400);
        assert_eq!(api.message, "bad request");
        assert_eq!(client.closed_streams(), 1);
    }

    #[tokio::test]
    async fn test_error_body_is_bounded() {
        let big = Bytes::from(vec![b'x'; MAX_ERROR_BODY_BYTES + 100]);
        let client = client_with(MockStream {
            status: 502,
            chunks: vec![Ok(big)],
            hold_open: true,
        });
        let cancel = CancelToken::new();

        let err = open(&client, &cancel).await.unwrap_err();
        assert_eq!(err.api_error().unwrap().body.len(), MAX_ERROR_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let client = MockHttpClient::new();
        client.set_response(
            URL,
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );
        let cancel = CancelToken::new();

        let err = open(&client, &cancel).await.unwrap_err();
        assert!(matches!(err, FeedError::Connection { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_already_cancelled_sends_nothing() {
        let client = client_with(MockStream::ok(["data: {\"id\":1}\n\n"]));
        let cancel = CancelToken::new();
        cancel.cancel();

        let err = open(&client, &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(client.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_run_returns_handler_error_verbatim() {
        let client = client_with(MockStream::ok([
            "data: {\"id\":1}\n\n",
            "data: {\"id\":2}\n\n",
            "data: {\"id\":3}\n\n",
        ]));
        let cancel = CancelToken::new();
        let session = open(&client, &cancel).await.unwrap();

        let mut seen = Vec::new();
        let err = session
            .run(|thing| {
                seen.push(thing.id);
                if thing.id == 2 {
                    return Err("enough".into());
                }
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(seen, vec![1, 2]);
        assert_eq!(err.to_string(), "enough");
        assert_eq!(client.closed_streams(), 1);
    }

    #[tokio::test]
    async fn test_handler_cancel_stops_before_next_payload() {
        let client = client_with(MockStream::ok([
            "data: {\"id\":1}\n\n",
            "data: {\"id\":2}\n\n",
        ]));
        let cancel = CancelToken::new();
        let session = open(&client, &cancel).await.unwrap();

        let mut seen = Vec::new();
        let trigger = cancel.clone();
        let err = session
            .run(|thing| {
                seen.push(thing.id);
                trigger.cancel();
                Ok(())
            })
            .await
            .unwrap_err();

        assert_eq!(seen, vec![1]);
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_into_stream() {
        let client = client_with(MockStream::ok([
            "data: {\"id\":1}\n\n",
            "data: {\"id\":2}\n\n",
        ]));
        let cancel = CancelToken::new();
        let session = open(&client, &cancel).await.unwrap();

        let things: Vec<_> = session.into_stream().collect().await;
        let ids: Vec<i64> = things.into_iter().map(|t| t.unwrap().id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(client.closed_streams(), 1);
    }
}
