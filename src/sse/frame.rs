//! SSE frame and line types.
//!
//! Wire format, one field per line, frames separated by a blank line:
//! - `: text` - comment / keepalive
//! - `event: <name>` - event type
//! - `data: <fragment>` - payload line (repeatable, joined with `\n`)
//! - `id: <token>` and `retry: <ms>` - recorded, never interpreted here

use std::borrow::Cow;

/// One complete SSE frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Frame {
    /// Event name; `None` is the default (unnamed) event.
    pub event_type: Option<String>,
    /// All `data` values of the frame joined with `\n`.
    pub data: Vec<u8>,
    /// Last `id` value seen.
    pub id: Option<String>,
    /// Last `retry` value seen.
    pub retry: Option<String>,
    /// Comment text, only for frames made of comment lines.
    pub comment: Option<String>,
}

impl Frame {
    /// A keepalive: has a comment and neither an event name nor data.
    pub fn is_comment_only(&self) -> bool {
        self.comment.as_deref().is_some_and(|c| !c.is_empty())
            && self.event_type.is_none()
            && self.data.is_empty()
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event_type.as_deref()
    }

    /// Payload as text, replacing invalid UTF-8.
    pub fn data_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// Represents a parsed SSE line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Empty line - ends the current frame
    Empty,
    /// Comment line, without the leading `:`
    Comment(&'a [u8]),
    /// `name:value`, with at most one leading space removed from the value.
    /// A line without `:` is a field name with an empty value.
    Field { name: &'a [u8], value: &'a [u8] },
}

/// Parse a single SSE line (no line terminator) into its component type
pub fn parse_sse_line(line: &[u8]) -> SseLine<'_> {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(rest) = line.strip_prefix(b":") {
        return SseLine::Comment(rest);
    }

    match line.iter().position(|b| *b == b':') {
        Some(idx) => {
            let value = &line[idx + 1..];
            SseLine::Field {
                name: &line[..idx],
                value: value.strip_prefix(b" ").unwrap_or(value),
            }
        }
        None => SseLine::Field {
            name: line,
            value: &[],
        },
    }
}
