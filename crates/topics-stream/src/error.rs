//! Error types for chat client operations

use thiserror::Error;

use crate::streaming::TransportError;

/// Result type alias for chat client operations
pub type Result<T> = std::result::Result<T, ChatClientError>;

/// Errors that can occur during chat client operations
#[derive(Error, Debug)]
pub enum ChatClientError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Stream could not be opened or failed mid-read
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ChatClientError {
    /// Whether the failure happened on the wire rather than before sending
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
