//! Async frame reader over a chunked byte stream.

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tracing::trace;

use super::frame::Frame;
use super::parser::FrameParser;

/// Reads SSE frames from a stream of byte chunks.
///
/// Chunks may split lines anywhere; bytes are buffered until a `\n` arrives.
/// Meant for a single reader at a time.
#[derive(Debug)]
pub struct FrameReader<S> {
    source: S,
    buffer: BytesMut,
    /// Bytes of `buffer` already known to hold no `\n`
    scanned: usize,
    parser: FrameParser,
    finished: bool,
}

impl<S, E> FrameReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    pub fn new(source: S) -> Self {
        Self {
            source,
            buffer: BytesMut::new(),
            scanned: 0,
            parser: FrameParser::new(),
            finished: false,
        }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Ok(None)` at end of stream. A trailing frame without its
    /// terminating blank line is discarded. Errors from the source are
    /// returned unchanged.
    pub async fn next_frame(&mut self) -> Result<Option<Frame>, E> {
        loop {
            while let Some(line) = self.next_line() {
                if let Some(frame) = self.parser.feed_line(&line) {
                    return Ok(Some(frame));
                }
            }

            if self.finished {
                return Ok(None);
            }

            match self.source.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(err)) => return Err(err),
                None => {
                    self.finished = true;
                    if !self.buffer.is_empty() || self.parser.has_pending() {
                        trace!(
                            buffered = self.buffer.len(),
                            "Discarding partial SSE frame at end of stream"
                        );
                    }
                    self.buffer.clear();
                    self.scanned = 0;
                    self.parser.reset();
                    return Ok(None);
                }
            }
        }
    }

    fn next_line(&mut self) -> Option<BytesMut> {
        match self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            Some(pos) => {
                let mut line = self.buffer.split_to(self.scanned + pos + 1);
                line.truncate(line.len() - 1);
                self.scanned = 0;
                Some(line)
            }
            None => {
                self.scanned = self.buffer.len();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    type Chunk = Result<Bytes, std::io::Error>;

    type TestReader = FrameReader<stream::Iter<std::vec::IntoIter<Chunk>>>;

    fn reader_from(chunks: &[&'static str]) -> TestReader {
        let chunks: Vec<Chunk> = chunks.iter().map(|c| Ok(Bytes::from(*c))).collect();
        FrameReader::new(stream::iter(chunks))
    }

    async fn collect(mut reader: TestReader) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = reader.next_frame().await.unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[tokio::test]
    async fn test_reads_frames_in_order() {
        let reader = reader_from(&[": ping\n\nevent: facts\ndata: {\"id\":1,\"items\":[]}\n\n"]);
        let frames = collect(reader).await;

        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_comment_only());
        assert_eq!(frames[0].comment.as_deref(), Some("ping"));
        assert_eq!(frames[1].event_name(), Some("facts"));
        assert_eq!(frames[1].data, b"{\"id\":1,\"items\":[]}");
    }

    #[tokio::test]
    async fn test_lines_split_across_chunks() {
        let reader = reader_from(&[
            "ev",
            "ent: mat",
            "ches\r\nda",
            "ta: {\"a\":",
            "1}\r",
            "\n\r\n",
        ]);
        let frames = collect(reader).await;

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event_name(), Some("matches"));
        assert_eq!(frames[0].data, b"{\"a\":1}");
    }

    #[tokio::test]
    async fn test_truncated_frame_is_discarded() {
        let reader = reader_from(&["data: one\n\n", "event: facts\ndata: {\"id\":2}\n"]);
        let frames = collect(reader).await;

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, b"one");
    }

    #[tokio::test]
    async fn test_partial_line_without_newline_is_discarded() {
        let reader = reader_from(&["data: one\n\ndata: two"]);
        let frames = collect(reader).await;
        assert_eq!(frames.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_runs_produce_no_frames() {
        let reader = reader_from(&["\n\n\n", "\r\n"]);
        assert!(collect(reader).await.is_empty());
    }

    #[tokio::test]
    async fn test_end_of_stream_is_sticky() {
        let mut reader = reader_from(&["data: x\n\n"]);
        assert!(reader.next_frame().await.unwrap().is_some());
        assert!(reader.next_frame().await.unwrap().is_none());
        assert!(reader.next_frame().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_source_error_propagates_unchanged() {
        let chunks: Vec<Chunk> = vec![
            Ok(Bytes::from_static(b"data: x\n\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
        ];
        let mut reader = FrameReader::new(stream::iter(chunks));

        assert!(reader.next_frame().await.unwrap().is_some());
        let err = reader.next_frame().await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::ConnectionReset);
    }

    #[tokio::test]
    async fn test_many_data_lines_join_in_order() {
        let reader = reader_from(&["data: a\ndata: b\n", "data: c\n\n"]);
        let frames = collect(reader).await;
        assert_eq!(frames[0].data, b"a\nb\nc");
    }
}
