//! Reqwest-based HTTP client adapter.
//!
//! This module provides the production transport, implementing the
//! [`HttpClient`] trait from `crate::traits`.

use async_trait::async_trait;
use futures_util::StreamExt;

use reqwest::multipart::{Form, Part};

use crate::traits::{
    FormPart, Headers, HttpClient, HttpError, HttpRequest, RequestBody, Response,
    StreamingResponse,
};

/// HTTP client implementation using reqwest.
///
/// # Example
///
/// ```ignore
/// use feedline::adapters::ReqwestHttpClient;
/// use feedline::traits::{HttpClient, HttpRequest};
///
/// let client = ReqwestHttpClient::new();
/// let url = "https://api.example.com/health".parse()?;
/// let response = client.execute(HttpRequest::new(reqwest::Method::GET, url)).await?;
/// println!("Status: {}", response.status);
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    /// Create a new ReqwestHttpClient with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a new ReqwestHttpClient with a custom reqwest::Client.
    ///
    /// Use this for connect timeouts, proxies or TLS settings. Avoid a
    /// whole-request timeout when the client will carry event streams.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying reqwest::Client.
    pub fn inner(&self) -> &reqwest::Client {
        &self.client
    }

    /// Convert a reqwest error raised before the response arrived.
    fn convert_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else if err.is_connect() {
            HttpError::ConnectionFailed(err.to_string())
        } else if err.is_builder() {
            HttpError::InvalidUrl(err.to_string())
        } else {
            HttpError::Other(err.to_string())
        }
    }

    /// Convert a reqwest error raised while reading a body.
    fn convert_body_error(err: reqwest::Error) -> HttpError {
        if err.is_timeout() {
            HttpError::Timeout(err.to_string())
        } else {
            HttpError::Io(err.to_string())
        }
    }

    /// Convert reqwest headers to our Headers type.
    fn convert_headers(headers: &reqwest::header::HeaderMap) -> Headers {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    /// Turn an [`HttpRequest`] into a reqwest builder.
    fn build(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(request.method, request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        match request.body {
            Some(RequestBody::Bytes(body)) => builder.body(body),
            Some(RequestBody::Multipart(parts)) => builder.multipart(Self::build_form(parts)),
            None => builder,
        }
    }

    /// Encode form fields in order. File parts carry their filename.
    fn build_form(parts: Vec<FormPart>) -> Form {
        parts.into_iter().fold(Form::new(), |form, part| match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                content,
            } => form.part(name, Part::bytes(content.to_vec()).file_name(file_name)),
        })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<Response, HttpError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response.bytes().await.map_err(Self::convert_body_error)?;

        Ok(Response::with_headers(status, headers, body))
    }

    async fn execute_stream(&self, request: HttpRequest) -> Result<StreamingResponse, HttpError> {
        let response = self
            .build(request)
            .send()
            .await
            .map_err(Self::convert_error)?;

        let status = response.status().as_u16();
        let headers = Self::convert_headers(response.headers());
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(Self::convert_body_error));

        Ok(StreamingResponse::new(status, headers, Box::pin(body)))
    }
}
