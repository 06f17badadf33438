//! Chat stream HTTP client implementation

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::error::Result;
use crate::streaming::{HttpTransport, StreamDecoder, TransportError};
use crate::types::*;

/// Default request timeout, covering the whole streamed body
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Default connection timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Path of the streaming endpoint, relative to the API base
const STREAM_PATH: &str = "chat/stream";

/// Client for the chat streaming endpoint
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    base_url: Url,
}

impl ChatClient {
    /// Create a new chat client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the API (e.g., "http://localhost:8000/api")
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a new chat client with custom configuration
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = parse_base_url(base_url)?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Get the URL of the streaming endpoint
    pub fn stream_url(&self) -> Result<Url> {
        self.base_url.join(STREAM_PATH).map_err(Into::into)
    }

    /// Open a chat stream and return its body as a transport.
    ///
    /// The request is not validated here; the server's answer to a bad
    /// request comes back as [`TransportError::Server`].
    #[instrument(skip(self, request), fields(theme = %request.theme))]
    pub async fn open_stream(
        &self,
        request: &ChatStreamRequest,
    ) -> std::result::Result<HttpTransport, TransportError> {
        let url = self
            .base_url
            .join(STREAM_PATH)
            .map_err(|e| TransportError::Read(format!("Invalid stream URL: {}", e)))?;

        debug!("Opening chat stream: {}", url);

        let response = self
            .client
            .post(url)
            .header("Accept", "text/event-stream")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(extract_error(response, status).await);
        }

        Ok(HttpTransport::new(response))
    }

    /// Validate the request, open the stream and decode it.
    ///
    /// Callbacks follow [`StreamDecoder::decode`]: tokens in order, then
    /// `on_done` once, unless the stream fails.
    #[instrument(skip(self, request, on_token, on_done))]
    pub async fn stream_chat<F, D>(
        &self,
        request: &ChatStreamRequest,
        on_token: F,
        on_done: D,
    ) -> Result<()>
    where
        F: FnMut(&str),
        D: FnOnce(),
    {
        request.validate()?;

        let transport = self.open_stream(request).await?;
        StreamDecoder::new()
            .decode(transport, on_token, on_done)
            .await?;

        Ok(())
    }
}

/// Parse the API base, making sure relative joins land below it
fn parse_base_url(base_url: &str) -> std::result::Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Build an error from a failed response
async fn extract_error(response: reqwest::Response, status: StatusCode) -> TransportError {
    // Try to parse error response body
    let message = response
        .json::<ErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| format!("HTTP {}", status));

    TransportError::server(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ChatClient::new("http://localhost:8000/api");
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let client = ChatClient::new("not a url");
        assert!(client.is_err());
    }

    #[test]
    fn test_stream_url() {
        let client = ChatClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            client.stream_url().unwrap().as_str(),
            "http://localhost:8000/api/chat/stream"
        );

        let client = ChatClient::new("http://localhost:8000/api/").unwrap();
        assert_eq!(
            client.stream_url().unwrap().as_str(),
            "http://localhost:8000/api/chat/stream"
        );

        let client = ChatClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.stream_url().unwrap().as_str(),
            "http://localhost:8000/chat/stream"
        );
    }
}
