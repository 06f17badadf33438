//! Types for the token stream

use thiserror::Error;

/// A relevant frame extracted from the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A text fragment to forward to the caller
    Token(String),
    /// The `[DONE]` sentinel
    Done,
}

/// Errors that fail a decode.
///
/// Only the transport can fail a stream; malformed frames never surface.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP/connection error
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Server refused to open the stream
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// IO error while reading the body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other read failure reported by a custom transport
    #[error("Read error: {0}")]
    Read(String),
}

impl TransportError {
    /// Create a server error from status code and message
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }
}

/// Why a relevant frame was dropped
#[derive(Debug, Error)]
pub(crate) enum FrameDecodeError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload has no string `content` field")]
    MissingContent,
}

/// Result type for streaming operations
pub type StreamResult<T> = std::result::Result<T, TransportError>;
