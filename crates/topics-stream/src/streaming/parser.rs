//! Line framing for the token stream
//!
//! Splits incoming bytes on `\n` and turns `data: ` lines into [`Frame`]s.

use bytes::BytesMut;
use tracing::trace;

use super::types::{Frame, FrameDecodeError};

/// Prefix that marks a relevant line
pub const DATA_PREFIX: &[u8] = b"data: ";

/// Payload that ends the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Frame parser state
///
/// Holds raw bytes rather than text so that a multi-byte character split
/// across two chunks is decoded only once its line is complete.
#[derive(Debug, Default)]
pub struct FrameParser {
    /// Bytes not yet split off as complete lines
    buffer: BytesMut,
    /// Prefix of `buffer` already searched for a newline
    scanned: usize,
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk to the buffer
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Pop complete lines until one yields a frame.
    ///
    /// Returns `None` once the buffer holds no complete line. Lines after a
    /// returned frame stay buffered until the next call. Each byte is
    /// searched for a newline only once, however the input is chunked.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
                self.scanned = self.buffer.len();
                return None;
            };
            let pos = self.scanned + offset;

            let line = self.buffer.split_to(pos + 1);
            self.scanned = 0;

            if let Some(frame) = process_line(&line[..pos]) {
                return Some(frame);
            }
        }
    }

    /// Number of bytes waiting for a newline
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

/// Process a single complete line
fn process_line(line: &[u8]) -> Option<Frame> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        trace!("ignoring non-data line ({} bytes)", line.len());
        return None;
    };

    let payload = String::from_utf8_lossy(payload);
    let payload = payload.trim();

    if payload == DONE_SENTINEL {
        return Some(Frame::Done);
    }

    match decode_payload(payload) {
        Ok(Some(token)) => Some(Frame::Token(token)),
        Ok(None) => None,
        Err(e) => {
            trace!("skipping frame: {}", e);
            None
        }
    }
}

/// Extract the token from an event payload.
///
/// `Ok(None)` means the payload was well formed but carried an empty token.
fn decode_payload(payload: &str) -> Result<Option<String>, FrameDecodeError> {
    let value: serde_json::Value = serde_json::from_str(payload)?;

    match value.get("content").and_then(|c| c.as_str()) {
        Some("") => Ok(None),
        Some(content) => Ok(Some(content.to_string())),
        None => Err(FrameDecodeError::MissingContent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(parser: &mut FrameParser) -> Vec<Frame> {
        std::iter::from_fn(|| parser.next_frame()).collect()
    }

    fn token(s: &str) -> Frame {
        Frame::Token(s.to_string())
    }

    #[test]
    fn test_parse_simple_token() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: {\"content\":\"Hello\"}\n");

        assert_eq!(drain(&mut parser), vec![token("Hello")]);
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_parse_multiple_frames() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: {\"content\":\"a\"}\n\ndata: {\"content\":\"b\"}\n\ndata: [DONE]\n\n");

        assert_eq!(drain(&mut parser), vec![token("a"), token("b"), Frame::Done]);
    }

    #[test]
    fn test_parse_chunked_data() {
        let mut parser = FrameParser::new();

        // First chunk - incomplete
        parser.feed(b"data: {\"con");
        assert_eq!(parser.next_frame(), None);
        assert_eq!(parser.buffered(), 11);

        // Second chunk - completes the frame
        parser.feed(b"tent\":\"hi\"}\n");
        assert_eq!(drain(&mut parser), vec![token("hi")]);
    }

    #[test]
    fn test_prefix_split_across_chunks() {
        let mut parser = FrameParser::new();
        parser.feed(b"da");
        parser.feed(b"ta");
        parser.feed(b": [DO");
        assert_eq!(parser.next_frame(), None);

        parser.feed(b"NE]\n");
        assert_eq!(parser.next_frame(), Some(Frame::Done));
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut parser = FrameParser::new();
        let line = "data: {\"content\":\"caf\u{e9} \u{1f3a4}\"}\n".as_bytes();

        // Split inside the microphone emoji
        let split = line.len() - 5;
        parser.feed(&line[..split]);
        assert_eq!(parser.next_frame(), None);
        parser.feed(&line[split..]);

        assert_eq!(drain(&mut parser), vec![token("caf\u{e9} \u{1f3a4}")]);
    }

    #[test]
    fn test_ignore_irrelevant_lines() {
        let mut parser = FrameParser::new();
        parser.feed(b": keepalive\n\nevent: message\ndata:{\"content\":\"no space\"}\nDATA: {\"content\":\"x\"}\ndata: {\"content\":\"ok\"}\n");

        assert_eq!(drain(&mut parser), vec![token("ok")]);
    }

    #[test]
    fn test_malformed_payloads_skipped() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: oops\ndata: \ndata: {\"other\":1}\ndata: {\"content\":42}\ndata: \"content\"\ndata: {\"content\":\"ok\"}\n");

        assert_eq!(drain(&mut parser), vec![token("ok")]);
    }

    #[test]
    fn test_empty_content_skipped() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: {\"content\":\"\"}\ndata: {\"content\":\" \"}\n");

        // Whitespace-only tokens are real tokens; only empty ones are dropped
        assert_eq!(drain(&mut parser), vec![token(" ")]);
    }

    #[test]
    fn test_payload_is_trimmed() {
        let mut parser = FrameParser::new();
        parser.feed(b"data:   {\"content\":\"a\"}  \r\ndata: [DONE]\r\n");

        assert_eq!(drain(&mut parser), vec![token("a"), Frame::Done]);
    }

    #[test]
    fn test_token_content_not_trimmed() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: {\"content\":\"  indented\\n\"}\n");

        assert_eq!(drain(&mut parser), vec![token("  indented\n")]);
    }

    #[test]
    fn test_lines_after_frame_stay_buffered() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: [DONE]\ndata: {\"content\":\"late\"}\n");

        assert_eq!(parser.next_frame(), Some(Frame::Done));
        assert_eq!(parser.buffered(), "data: {\"content\":\"late\"}\n".len());

        assert_eq!(parser.next_frame(), Some(token("late")));
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_large_chunk_many_lines() {
        let frames = 100_000;
        let mut parser = FrameParser::new();
        parser.feed(&b"data: {\"content\":\"x\"}\n".repeat(frames));

        let parsed = drain(&mut parser);
        assert_eq!(parsed.len(), frames);
        assert!(parsed.iter().all(|f| *f == token("x")));
        assert_eq!(parser.buffered(), 0);
    }

    #[test]
    fn test_long_line_in_small_pieces() {
        let content = "y".repeat(50_000);
        let line = format!("data: {{\"content\":\"{}\"}}\nrest", content);
        let mut parser = FrameParser::new();

        let mut frames = Vec::new();
        for piece in line.as_bytes().chunks(7) {
            parser.feed(piece);
            frames.extend(drain(&mut parser));
        }

        assert_eq!(frames, vec![token(&content)]);

        // Only the unterminated remainder is left
        assert_eq!(parser.buffered(), "rest".len());
        assert_eq!(parser.next_frame(), None);
    }

    #[test]
    fn test_sentinel_must_match_exactly() {
        let mut parser = FrameParser::new();
        parser.feed(b"data: [done]\ndata: [DONE] extra\ndata: \"[DONE]\"\n");

        assert!(drain(&mut parser).is_empty());
    }
}
