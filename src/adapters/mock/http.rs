//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, errors or scripted event-stream bodies, and that records how
//! many stream bodies were released.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use crate::traits::{
    ByteStream, FormPart, Headers, HttpClient, HttpError, HttpRequest, RequestBody, Response,
    StreamingResponse,
};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method
    pub method: String,
    /// Full request URL including the query string
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Raw request body, if any
    pub body: Option<String>,
    /// Form fields of a multipart body, in order
    pub form: Vec<FormPart>,
}

impl RecordedRequest {
    /// Look up a recorded header, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        crate::traits::header_value(&self.headers, name)
    }

    /// Text value of a multipart form field.
    pub fn form_text(&self, name: &str) -> Option<&str> {
        self.form.iter().find_map(|part| match part {
            FormPart::Text { name: field, value } if field == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Value of a query parameter on the recorded URL.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = reqwest::Url::parse(&self.url).ok()?;
        let value = url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned());
        value
    }
}

/// Scripted body for a streaming response.
#[derive(Debug, Clone)]
pub struct MockStream {
    /// Status reported with the response headers
    pub status: u16,
    /// Chunks delivered in order
    pub chunks: Vec<Result<Bytes, HttpError>>,
    /// When set, the body never ends after the scripted chunks
    pub hold_open: bool,
}

impl MockStream {
    /// A 200 response delivering `chunks` and then ending.
    pub fn ok<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            status: 200,
            chunks: chunks.into_iter().map(|c| Ok(c.into())).collect(),
            hold_open: false,
        }
    }

    /// Keep the body open after the scripted chunks.
    pub fn hold_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Fail the body with `err` after the scripted chunks.
    pub fn then_error(mut self, err: HttpError) -> Self {
        self.chunks.push(Err(err));
        self
    }

    /// Report a different status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a buffered response
    Success(Response),
    /// Fail before any response arrives
    Error(HttpError),
    /// Return a streaming body
    Stream(MockStream),
}

/// Body wrapper that counts how many times a stream body was dropped.
struct TrackedBody {
    inner: ByteStream,
    closed: Arc<AtomicUsize>,
}

impl Stream for TrackedBody {
    type Item = Result<Bytes, HttpError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl Drop for TrackedBody {
    fn drop(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock HTTP client for testing.
///
/// # Example
///
/// ```ignore
/// use feedline::adapters::mock::{MockHttpClient, MockResponse, MockStream};
///
/// let client = MockHttpClient::new();
/// client.set_response(
///     "https://api.example.com/api/facts/items/stream",
///     MockResponse::Stream(MockStream::ok(["event: facts\ndata: {}\n\n"])),
/// );
///
/// // ... drive a session, then verify:
/// assert_eq!(client.get_requests().len(), 1);
/// assert_eq!(client.closed_streams(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct MockHttpClient {
    /// Configured responses by URL prefix
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Number of stream bodies dropped so far
    closed: Arc<AtomicUsize>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_response: Arc::new(Mutex::new(None)),
            requests: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set a response for a URL.
    ///
    /// Matched exactly first, then as a prefix (so a path matches any query).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        lock(&self.responses).insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *lock(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    /// How many streaming bodies handed out by this client have been dropped.
    pub fn closed_streams(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    fn record_request(&self, request: &HttpRequest) {
        let (body, form) = match &request.body {
            Some(RequestBody::Bytes(bytes)) => {
                (Some(String::from_utf8_lossy(bytes).into_owned()), Vec::new())
            }
            Some(RequestBody::Multipart(parts)) => (None, parts.clone()),
            None => (None, Vec::new()),
        };
        lock(&self.requests).push(RecordedRequest {
            method: request.method.to_string(),
            url: request.url.to_string(),
            headers: request.headers.clone(),
            body,
            form,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = lock(&self.responses);

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        // Longest prefix wins so nested paths can be configured separately.
        let mut matched: Option<(&String, &MockResponse)> = None;
        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern.as_str())
                && matched.map_or(true, |(best, _)| pattern.len() > best.len())
            {
                matched = Some((pattern, response));
            }
        }
        if let Some((_, response)) = matched {
            return Some(response.clone());
        }

        lock(&self.default_response).clone()
    }

    fn open_body(&self, script: MockStream) -> ByteStream {
        let scripted = stream::iter(script.chunks);
        let inner: ByteStream = if script.hold_open {
            Box::pin(scripted.chain(stream::pending()))
        } else {
            Box::pin(scripted)
        };
        Box::pin(TrackedBody {
            inner,
            closed: Arc::clone(&self.closed),
        })
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<Response, HttpError> {
        self.record_request(&request);
        let url = request.url.to_string();

        match self.get_response(&url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(MockResponse::Stream(_)) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }

    async fn execute_stream(&self, request: HttpRequest) -> Result<StreamingResponse, HttpError> {
        self.record_request(&request);
        let url = request.url.to_string();

        match self.get_response(&url) {
            Some(MockResponse::Stream(script)) => {
                let status = script.status;
                let mut headers = Headers::new();
                headers.insert("content-type".to_string(), "text/event-stream".to_string());
                Ok(StreamingResponse::new(status, headers, self.open_body(script)))
            }
            Some(MockResponse::Success(response)) => {
                let body = MockStream {
                    status: response.status,
                    chunks: vec![Ok(response.body)],
                    hold_open: false,
                };
                Ok(StreamingResponse::new(
                    response.status,
                    response.headers,
                    self.open_body(body),
                ))
            }
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
