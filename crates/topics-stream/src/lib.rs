//! Table Topics streaming client
//!
//! Decodes the `data: ...` token stream produced by the chat endpoint into an
//! ordered sequence of text fragments for live display.
//!
//! # Example
//!
//! ```rust,no_run
//! use topics_stream::{ChatClient, ChatStreamRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ChatClient::new("http://localhost:8000/api")?;
//!     let request = ChatStreamRequest::new("space exploration", 5);
//!
//!     client
//!         .stream_chat(&request, |token| print!("{token}"), || println!())
//!         .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Custom transports
//!
//! The decoder itself only needs something that yields chunks, so it can be
//! driven by any byte stream:
//!
//! ```rust
//! use bytes::Bytes;
//! use topics_stream::streaming::{StreamDecoder, StreamTransport, TransportError};
//!
//! # tokio_test::block_on(async {
//! let chunks = vec![
//!     Ok::<_, TransportError>(Bytes::from_static(b"data: {\"content\":\"Why\"}\n")),
//!     Ok(Bytes::from_static(b"data: [DONE]\n")),
//! ];
//! let transport = StreamTransport::new(futures::stream::iter(chunks));
//!
//! let mut text = String::new();
//! StreamDecoder::new()
//!     .decode(transport, |token| text.push_str(token), || {})
//!     .await
//!     .unwrap();
//! assert_eq!(text, "Why");
//! # });
//! ```
//!
//! # Testing
//!
//! The `testing` module serves scripted streams over real HTTP:
//!
//! ```rust,ignore
//! use topics_stream::testing::{ScriptedStream, TestServer};
//!
//! let server = TestServer::start(ScriptedStream::tokens(["Why", " not?"]).router()).await?;
//! server.client.stream_chat(&request, on_token, on_done).await?;
//! ```

mod client;
pub mod conversation;
mod error;
pub mod streaming;
pub mod testing;
mod types;

pub use client::ChatClient;
pub use conversation::Conversation;
pub use error::{ChatClientError, Result};
pub use types::*;

// Re-export streaming types for convenience
pub use streaming::{StreamDecoder, Transport, TransportError};
