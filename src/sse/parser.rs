//! Stateful line-fed frame parser.

use super::frame::{parse_sse_line, Frame, SseLine};

/// Accumulates lines and emits complete frames.
///
/// Holds nothing beyond the frame in progress. Feed it one line at a time,
/// without the `\n` terminator.
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Frame being accumulated
    frame: Frame,
    /// Any non-blank line seen since the last emitted frame
    has_lines: bool,
    /// An `event`, `data`, `id` or `retry` field has been recorded
    has_fields: bool,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a line to the parser, returning a frame when the line completes one.
    ///
    /// Blank lines before any content are swallowed, so runs of separators
    /// never produce empty frames.
    pub fn feed_line(&mut self, line: &[u8]) -> Option<Frame> {
        let line = trim_line_end(line);

        match parse_sse_line(line) {
            SseLine::Empty => {
                if self.has_lines {
                    return Some(self.take());
                }
            }
            SseLine::Comment(text) => {
                self.has_lines = true;
                // Comments inside a frame that already has fields are dropped.
                if !self.has_fields {
                    let text = String::from_utf8_lossy(text);
                    let text = text.trim();
                    self.frame.comment = (!text.is_empty()).then(|| text.to_string());
                }
            }
            SseLine::Field { name, value } => {
                self.has_lines = true;
                self.record_field(name, value);
            }
        }

        None
    }

    /// True if lines have been fed since the last emitted frame.
    pub fn has_pending(&self) -> bool {
        self.has_lines
    }

    /// Drop the frame in progress.
    pub(crate) fn reset(&mut self) {
        self.frame = Frame::default();
        self.has_lines = false;
        self.has_fields = false;
    }

    fn record_field(&mut self, name: &[u8], value: &[u8]) {
        match name {
            b"event" => {
                let value = String::from_utf8_lossy(value);
                self.frame.event_type = (!value.is_empty()).then(|| value.into_owned());
            }
            b"data" => {
                if !self.frame.data.is_empty() {
                    self.frame.data.push(b'\n');
                }
                self.frame.data.extend_from_slice(value);
            }
            b"id" => self.frame.id = Some(String::from_utf8_lossy(value).into_owned()),
            b"retry" => self.frame.retry = Some(String::from_utf8_lossy(value).into_owned()),
            _ => return,
        }
        self.has_fields = true;
        self.frame.comment = None;
    }

    fn take(&mut self) -> Frame {
        let frame = std::mem::take(&mut self.frame);
        self.has_lines = false;
        self.has_fields = false;
        frame
    }
}

fn trim_line_end(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    while let Some(rest) = line.strip_suffix(b"\r") {
        line = rest;
    }
    line
}
