//! Server-Sent Events framing.
//!
//! [`FrameReader`] turns a chunked response body into [`Frame`]s using the
//! line-fed [`FrameParser`]. The reader knows nothing about feeds; event
//! filtering and JSON decoding live in `crate::stream`.

mod frame;
mod parser;
mod reader;

pub use frame::{parse_sse_line, Frame, SseLine};
pub use parser::FrameParser;
pub use reader::FrameReader;
