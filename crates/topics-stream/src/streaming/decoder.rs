//! Incremental decoder driving a transport to completion

use futures::stream::Stream;
use tracing::debug;

use super::parser::FrameParser;
use super::transport::Transport;
use super::types::{Frame, StreamResult};

/// Decodes one token stream.
///
/// A decoder is built per request and consumed by [`decode`](Self::decode),
/// so it can never be shared between two transports.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    parser: FrameParser,
}

impl StreamDecoder {
    /// Create a decoder with an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `transport` until the `[DONE]` sentinel or end of input.
    ///
    /// `on_token` runs once per token, in arrival order, on the calling task.
    /// `on_done` runs exactly once when the stream finishes cleanly. A failed
    /// read returns the error without calling `on_done`; whatever was
    /// buffered is dropped together with the transport.
    ///
    /// Frames that are not valid JSON or carry no `content` are skipped. A
    /// trailing line with no newline before the input ends is discarded.
    pub async fn decode<T, F, D>(
        mut self,
        mut transport: T,
        mut on_token: F,
        on_done: D,
    ) -> StreamResult<()>
    where
        T: Transport,
        F: FnMut(&str),
        D: FnOnce(),
    {
        let mut tokens = 0usize;

        while let Some(chunk) = transport.next_chunk().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    debug!("Stream failed after {} token(s): {}", tokens, e);
                    return Err(e);
                }
            };

            self.parser.feed(&chunk);

            while let Some(frame) = self.parser.next_frame() {
                match frame {
                    Frame::Token(token) => {
                        tokens += 1;
                        on_token(&token);
                    }
                    Frame::Done => {
                        debug!(
                            "Stream done after {} token(s), {} byte(s) unread",
                            tokens,
                            self.parser.buffered()
                        );
                        on_done();
                        return Ok(());
                    }
                }
            }
        }

        if self.parser.buffered() > 0 {
            debug!(
                "Discarding {} byte(s) of unterminated trailing line",
                self.parser.buffered()
            );
        }
        debug!("Stream closed after {} token(s)", tokens);

        on_done();
        Ok(())
    }

    /// Turn the decoder and a transport into a stream of tokens.
    ///
    /// The stream ends on the sentinel or at end of input, and yields a
    /// single `Err` and then ends if a read fails.
    pub fn into_token_stream<T>(self, mut transport: T) -> impl Stream<Item = StreamResult<String>> + Send
    where
        T: Transport + 'static,
    {
        let mut parser = self.parser;

        async_stream::stream! {
            while let Some(chunk) = transport.next_chunk().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                parser.feed(&chunk);

                while let Some(frame) = parser.next_frame() {
                    match frame {
                        Frame::Token(token) => yield Ok(token),
                        Frame::Done => return,
                    }
                }
            }
        }
    }
}
