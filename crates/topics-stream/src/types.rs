//! Request and response types for the chat stream endpoint

use serde::{Deserialize, Serialize};

use crate::error::{ChatClientError, Result};

/// Longest theme the server accepts, in characters
pub const MAX_THEME_LEN: usize = 500;
/// Smallest number of topics that can be requested
pub const MIN_TOPICS: u32 = 1;
/// Largest number of topics that can be requested
pub const MAX_TOPICS: u32 = 20;
/// Topic count used when none is given
pub const DEFAULT_TOPICS: u32 = 10;

// =============================================================================
// Conversation Types
// =============================================================================

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single prior turn sent back to the server as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /chat/stream`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStreamRequest {
    /// Free-text theme the topics should be about
    pub theme: String,
    /// Number of topics to generate
    #[serde(default = "default_topics")]
    pub num_topics: u32,
    /// Prior conversation turns, oldest first
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

fn default_topics() -> u32 {
    DEFAULT_TOPICS
}

impl ChatStreamRequest {
    /// Create a request with no history
    pub fn new(theme: impl Into<String>, num_topics: u32) -> Self {
        Self {
            theme: theme.into(),
            num_topics,
            history: Vec::new(),
        }
    }

    /// Attach prior conversation turns
    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    /// Check the request against the bounds the server enforces.
    ///
    /// Catching these locally avoids opening a stream that can only fail
    /// with a 422.
    pub fn validate(&self) -> Result<()> {
        if self.theme.trim().is_empty() {
            return Err(ChatClientError::InvalidRequest(
                "theme must not be empty".to_string(),
            ));
        }

        let len = self.theme.chars().count();
        if len > MAX_THEME_LEN {
            return Err(ChatClientError::InvalidRequest(format!(
                "theme is {} characters, at most {} allowed",
                len, MAX_THEME_LEN
            )));
        }

        if !(MIN_TOPICS..=MAX_TOPICS).contains(&self.num_topics) {
            return Err(ChatClientError::InvalidRequest(format!(
                "num_topics must be between {} and {}, got {}",
                MIN_TOPICS, MAX_TOPICS, self.num_topics
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// Error body returned by the server on a failed request.
///
/// Validation failures carry `detail`, other failures may carry `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorResponse {
    /// Best human-readable message in the body, if any
    pub fn message(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        match &self.detail {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = ChatStreamRequest::new("space", 3).with_history(vec![
            ChatMessage::user("Generate 3 Table Topics about: cats"),
            ChatMessage::assistant("1. Why cats?"),
        ]);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "theme": "space",
                "num_topics": 3,
                "history": [
                    {"role": "user", "content": "Generate 3 Table Topics about: cats"},
                    {"role": "assistant", "content": "1. Why cats?"}
                ]
            })
        );
    }

    #[test]
    fn test_request_defaults() {
        let request: ChatStreamRequest = serde_json::from_str(r#"{"theme":"x"}"#).unwrap();
        assert_eq!(request.num_topics, DEFAULT_TOPICS);
        assert!(request.history.is_empty());
    }

    #[test]
    fn test_validate_bounds() {
        assert!(ChatStreamRequest::new("travel", 1).validate().is_ok());
        assert!(ChatStreamRequest::new("travel", 20).validate().is_ok());
        assert!(ChatStreamRequest::new("travel", 0).validate().is_err());
        assert!(ChatStreamRequest::new("travel", 21).validate().is_err());
        assert!(ChatStreamRequest::new("   ", 5).validate().is_err());
        assert!(ChatStreamRequest::new("a".repeat(500), 5).validate().is_ok());
        assert!(ChatStreamRequest::new("a".repeat(501), 5).validate().is_err());
    }

    #[test]
    fn test_error_response_message() {
        let body: ErrorResponse = serde_json::from_str(r#"{"detail":"Not Found"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("Not Found"));

        let body: ErrorResponse = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(body.message().as_deref(), Some("boom"));

        let body: ErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(body.message(), None);
    }
}
