//! Mock implementations for testing.
//!
//! # Available Mocks
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses and
//!   scripted event-stream bodies

pub mod http;

pub use http::{MockHttpClient, MockResponse, MockStream, RecordedRequest};
