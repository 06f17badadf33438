//! Conversation state for a chat front-end
//!
//! [`Conversation`] is owned by the UI layer and only changes through the
//! decoder callbacks ([`push_token`](Conversation::push_token),
//! [`finish`](Conversation::finish)), a failed decode
//! ([`fail`](Conversation::fail)) or the caller walking away
//! ([`abandon`](Conversation::abandon)). The decoder never touches it.

use crate::error::{ChatClientError, Result};
use crate::types::{ChatMessage, ChatStreamRequest, Role};

/// Text shown in place of the reply when a stream fails
pub const FAILURE_MESSAGE: &str = "An error occurred. Please try again.";

/// Topics longer than this are treated as prose, not questions
const MAX_TOPIC_LEN: usize = 200;

/// Transcript plus the state of the in-flight reply
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    streaming: bool,
    latest_topics: Vec<String>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// All turns, including the reply being streamed
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a reply is currently being streamed
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Topics extracted from the last completed reply that had any
    pub fn latest_topics(&self) -> &[String] {
        &self.latest_topics
    }

    /// Text of the reply being streamed (or the last one)
    pub fn current_reply(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.as_str())
    }

    /// Start a new turn.
    ///
    /// Returns the request to send, whose history is every turn before this
    /// one, and records the user turn plus an empty reply placeholder.
    pub fn begin(&mut self, theme: &str, num_topics: u32) -> Result<ChatStreamRequest> {
        if self.streaming {
            return Err(ChatClientError::InvalidRequest(
                "a reply is already streaming".to_string(),
            ));
        }

        let theme = theme.trim();
        let request = ChatStreamRequest::new(theme, num_topics).with_history(self.messages.clone());
        request.validate()?;

        self.messages.push(ChatMessage::user(format!(
            "Generate {} Table Topics about: {}",
            num_topics, theme
        )));
        self.messages.push(ChatMessage::assistant(String::new()));
        self.streaming = true;

        Ok(request)
    }

    /// Append a streamed token to the reply
    pub fn push_token(&mut self, token: &str) {
        if let Some(reply) = self.reply_mut() {
            reply.content.push_str(token);
        }
    }

    /// Mark the reply complete and pick up any topics it lists
    pub fn finish(&mut self) {
        self.streaming = false;

        let topics = self.current_reply().map(parse_topics).unwrap_or_default();
        if !topics.is_empty() {
            self.latest_topics = topics;
        }
    }

    /// Replace the reply with the failure notice
    pub fn fail(&mut self) {
        self.streaming = false;

        if let Some(reply) = self.reply_mut() {
            reply.content = FAILURE_MESSAGE.to_string();
        }
    }

    /// Stop streaming without completing, keeping the partial reply
    pub fn abandon(&mut self) {
        self.streaming = false;
    }

    fn reply_mut(&mut self) -> Option<&mut ChatMessage> {
        self.messages
            .last_mut()
            .filter(|m| m.role == Role::Assistant)
    }
}

/// Extract numbered topics from a reply.
///
/// Keeps non-blank lines with any leading `1.` or `1)` numbering removed,
/// dropping lines that end up empty or too long to be a question.
pub fn parse_topics(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| strip_numbering(line).trim().to_string())
        .filter(|line| !line.is_empty() && line.chars().count() < MAX_TOPIC_LEN)
        .collect()
}

/// Remove a leading `<digits>.` or `<digits>)` and the whitespace after it
fn strip_numbering(line: &str) -> &str {
    let rest = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == line.len() {
        return line;
    }

    match rest.strip_prefix(['.', ')']) {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}
