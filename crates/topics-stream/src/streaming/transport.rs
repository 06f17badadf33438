//! Chunk sources the decoder can read from

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use reqwest::StatusCode;

use super::types::{StreamResult, TransportError};

/// A source of raw chunks.
///
/// Yields `Some(Ok(chunk))` per read, `Some(Err(_))` when a read fails and
/// `None` once the input has ended. Dropping the transport releases the
/// underlying resource.
#[async_trait]
pub trait Transport: Send {
    /// Read the next chunk, or `None` at end of input
    async fn next_chunk(&mut self) -> Option<StreamResult<Bytes>>;
}

/// Response body of an opened chat stream
#[derive(Debug)]
pub struct HttpTransport {
    response: reqwest::Response,
}

impl HttpTransport {
    /// Wrap a response whose status has already been checked
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// Status the server answered with
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn next_chunk(&mut self) -> Option<StreamResult<Bytes>> {
        match self.response.chunk().await {
            Ok(Some(bytes)) => Some(Ok(bytes)),
            Ok(None) => None,
            Err(e) => Some(Err(TransportError::Connection(e))),
        }
    }
}

/// Adapts any byte stream into a [`Transport`]
///
/// ```
/// use bytes::Bytes;
/// use topics_stream::streaming::{StreamTransport, TransportError};
///
/// let chunks = vec![Ok::<_, TransportError>(Bytes::from_static(b"data: [DONE]\n"))];
/// let transport = StreamTransport::new(futures::stream::iter(chunks));
/// ```
pub struct StreamTransport<S> {
    inner: S,
}

impl<S> StreamTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S, E> Transport for StreamTransport<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin + Send,
    E: Into<TransportError> + Send,
{
    async fn next_chunk(&mut self) -> Option<StreamResult<Bytes>> {
        self.inner.next().await.map(|r| r.map_err(Into::into))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stream_transport_yields_chunks_then_ends() {
        let chunks = vec![
            Ok::<_, TransportError>(Bytes::from_static(b"a")),
            Ok(Bytes::from_static(b"b")),
        ];
        let mut transport = StreamTransport::new(futures::stream::iter(chunks));

        assert_eq!(transport.next_chunk().await.unwrap().unwrap(), "a");
        assert_eq!(transport.next_chunk().await.unwrap().unwrap(), "b");
        assert!(transport.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_transport_converts_errors() {
        let chunks = vec![Err::<Bytes, _>(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        ))];
        let mut transport = StreamTransport::new(futures::stream::iter(chunks));

        let err = transport.next_chunk().await.unwrap().unwrap_err();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
