//! Trait abstractions for dependency injection and testability.
//!
//! # Traits
//!
//! - [`HttpClient`] - HTTP transport (buffered and streaming requests)

pub mod http;

pub use http::{
    header_value, is_success_status, set_header, status_text, ByteStream, FormPart, Headers,
    HttpClient, HttpError, HttpRequest, RequestBody, Response, StreamingResponse,
};
