//! Test utilities for topics-stream
//!
//! Provides a scripted chat endpoint served over real HTTP, for exercising
//! the client and decoder end to end.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::net::TcpListener;

use crate::{ChatClient, ChatStreamRequest, Result};

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: ChatClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Create a new test server from an axum Router
    ///
    /// # Example
    ///
    /// ```ignore
    /// use topics_stream::testing::{ScriptedStream, TestServer};
    ///
    /// let script = ScriptedStream::tokens(["Why", " not?"]);
    /// let server = TestServer::start(script.router()).await?;
    ///
    /// // Use server.client to make requests
    /// server.client.stream_chat(&request, on_token, on_done).await?;
    /// ```
    pub async fn start(router: Router) -> Result<Self> {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Create a new test server with custom timeouts
    pub async fn start_with_timeout(
        router: Router,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        // Spawn the server
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let base_url = format!("http://{}", addr);
        let client = ChatClient::with_config(&base_url, timeout, connect_timeout)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a reference to the client
    pub fn client(&self) -> &ChatClient {
        &self.client
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal if not already done
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        // Abort the task if still running
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// A chat endpoint that replays fixed chunks
///
/// Every chunk is written as its own body frame, so chunk boundaries on the
/// wire follow the script (modulo TCP coalescing, which a delay prevents).
#[derive(Debug, Clone)]
pub struct ScriptedStream {
    chunks: Vec<Bytes>,
    status: StatusCode,
    error_detail: String,
    chunk_delay: Duration,
    abort: bool,
    received: Arc<Mutex<Vec<ChatStreamRequest>>>,
}

impl ScriptedStream {
    /// Replay the given raw chunks verbatim
    pub fn new<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            status: StatusCode::OK,
            error_detail: String::new(),
            chunk_delay: Duration::ZERO,
            abort: false,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Emit each token as a frame followed by a blank line, then `[DONE]`
    pub fn tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut chunks: Vec<Bytes> = tokens
            .into_iter()
            .map(|t| {
                let payload = serde_json::json!({ "content": t.as_ref() });
                Bytes::from(format!("data: {}\n\n", payload))
            })
            .collect();
        chunks.push(Bytes::from_static(b"data: [DONE]\n\n"));

        Self::new(chunks)
    }

    /// Refuse every request with the given status and `detail` message
    pub fn failing(status: StatusCode, detail: impl Into<String>) -> Self {
        let mut script = Self::new(Vec::<Bytes>::new());
        script.status = status;
        script.error_detail = detail.into();
        script
    }

    /// Wait this long before writing each chunk
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.chunk_delay = delay;
        self
    }

    /// Break the connection after the last chunk instead of ending cleanly
    pub fn with_abort(mut self) -> Self {
        self.abort = true;
        self
    }

    /// Requests received so far
    pub fn received(&self) -> Vec<ChatStreamRequest> {
        self.received.lock().clone()
    }

    /// Router serving the script at `POST /chat/stream`
    pub fn router(&self) -> Router {
        Router::new()
            .route("/chat/stream", post(scripted_stream))
            .with_state(self.clone())
    }
}

async fn scripted_stream(
    State(script): State<ScriptedStream>,
    Json(request): Json<ChatStreamRequest>,
) -> Response {
    script.received.lock().push(request);

    if script.status != StatusCode::OK {
        let body = serde_json::json!({ "detail": script.error_detail });
        return (script.status, Json(body)).into_response();
    }

    let ScriptedStream {
        chunks,
        chunk_delay,
        abort,
        ..
    } = script;

    let body = async_stream::stream! {
        for chunk in chunks {
            if !chunk_delay.is_zero() {
                tokio::time::sleep(chunk_delay).await;
            }
            yield Ok::<_, std::io::Error>(chunk);
        }
        if abort {
            yield Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionAborted,
                "scripted abort",
            ));
        }
    };

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_format() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();
        let url = format!("http://{}", addr);
        assert_eq!(url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_tokens_script_matches_backend_framing() {
        let script = ScriptedStream::tokens(["Hi", "\"quoted\""]);
        assert_eq!(
            script.chunks,
            vec![
                Bytes::from_static(b"data: {\"content\":\"Hi\"}\n\n"),
                Bytes::from_static(b"data: {\"content\":\"\\\"quoted\\\"\"}\n\n"),
                Bytes::from_static(b"data: [DONE]\n\n"),
            ]
        );
    }
}
