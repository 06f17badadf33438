//! Token stream decoding
//!
//! The chat endpoint answers with newline-delimited frames:
//!
//! ```text
//! data: {"content": "Why"}
//! data: {"content": " not?"}
//! data: [DONE]
//! ```
//!
//! [`StreamDecoder`] reads chunks from a [`Transport`], reassembles frames
//! that straddle chunk boundaries and forwards each `content` string in
//! order. Lines without the `data: ` prefix are ignored and malformed
//! payloads are skipped; only a failing transport ends a decode with an
//! error.
//!
//! # Example
//!
//! ```no_run
//! use topics_stream::{ChatClient, ChatStreamRequest, StreamDecoder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ChatClient::new("http://localhost:8000/api")?;
//! let transport = client.open_stream(&ChatStreamRequest::new("gardening", 3)).await?;
//!
//! let mut reply = String::new();
//! StreamDecoder::new()
//!     .decode(transport, |token| reply.push_str(token), || println!("done"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod decoder;
mod parser;
mod transport;
mod types;

pub use decoder::StreamDecoder;
pub use parser::{FrameParser, DATA_PREFIX, DONE_SENTINEL};
pub use transport::{HttpTransport, StreamTransport, Transport};
pub use types::{Frame, StreamResult, TransportError};
