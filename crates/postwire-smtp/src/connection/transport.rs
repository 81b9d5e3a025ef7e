//! Low-level SMTP transport handling.
//!
//! The session talks to one [`Transport`], which owns exactly one byte
//! stream at a time. A TLS upgrade moves the plaintext stream into the
//! [`Connector`] and installs the stream it returns, so the old stream
//! cannot be reached afterwards.

use std::fmt;
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::complete_reply_len;
use crate::types::Reply;

/// Bidirectional byte stream a transport can own.
pub trait AsyncStream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> AsyncStream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// Owned, type-erased stream (plain TCP, TLS, or a test double).
pub type BoxedStream = Box<dyn AsyncStream>;

/// Opens streams and wraps them in TLS.
///
/// The session calls [`open`](Connector::open) at most once, and
/// [`upgrade`](Connector::upgrade) at most once after a successful STARTTLS.
pub trait Connector: Send + Sync {
    /// Opens a stream to `host:port`.
    fn open(&self, host: &str, port: u16) -> impl Future<Output = Result<BoxedStream>> + Send;

    /// Wraps `stream` in TLS, verifying the peer as `server_name`.
    ///
    /// Failures must be reported as [`Error::Security`].
    fn upgrade(
        &self,
        stream: BoxedStream,
        server_name: &str,
    ) -> impl Future<Output = Result<BoxedStream>> + Send;
}

/// Default connector: tokio TCP and rustls with the webpki root store.
#[derive(Clone)]
pub struct TcpConnector {
    tls: TlsConnector,
}

impl TcpConnector {
    /// Creates a connector trusting the bundled web PKI roots.
    #[must_use]
    pub fn new() -> Self {
        let root_store = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };

        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Self::with_tls_config(Arc::new(config))
    }

    /// Creates a connector with a caller-built TLS configuration.
    #[must_use]
    pub fn with_tls_config(config: Arc<ClientConfig>) -> Self {
        Self {
            tls: TlsConnector::from(config),
        }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TcpConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpConnector").finish_non_exhaustive()
    }
}

impl Connector for TcpConnector {
    async fn open(&self, host: &str, port: u16) -> Result<BoxedStream> {
        let stream = TcpStream::connect((host, port)).await?;
        Ok(Box::new(stream))
    }

    async fn upgrade(&self, stream: BoxedStream, server_name: &str) -> Result<BoxedStream> {
        let name = ServerName::try_from(server_name.to_string())
            .map_err(|_| Error::Security(format!("invalid server name: {server_name}")))?;

        let tls_stream = self
            .tls
            .connect(name, stream)
            .await
            .map_err(|e| Error::Security(e.to_string()))?;
        Ok(Box::new(tls_stream))
    }
}

/// The stream currently backing a session, plus unread reply bytes.
pub struct Transport {
    stream: Option<BoxedStream>,
    buffer: BytesMut,
    timeout: Duration,
}

impl Transport {
    /// Wraps an already-open stream. `timeout` bounds every read and write.
    #[must_use]
    pub fn new(stream: BoxedStream, timeout: Duration) -> Self {
        Self {
            stream: Some(stream),
            buffer: BytesMut::new(),
            timeout,
        }
    }

    /// Opens a stream through `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the peer is unreachable and
    /// [`Error::Timeout`] if `connect_timeout` elapses first.
    pub async fn open<C: Connector>(
        connector: &C,
        host: &str,
        port: u16,
        connect_timeout: Duration,
        read_timeout: Duration,
    ) -> Result<Self> {
        let stream = tokio::time::timeout(connect_timeout, connector.open(host, port))
            .await
            .map_err(|_| Error::Timeout {
                operation: "connect",
                after: connect_timeout,
            })??;
        Ok(Self::new(stream, read_timeout))
    }

    /// Returns true until [`close`](Self::close) is called or an upgrade
    /// consumes the stream without returning a new one.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn stream(&mut self) -> Result<&mut BoxedStream> {
        self.stream.as_mut().ok_or_else(|| {
            Error::Connection(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport is closed",
            ))
        })
    }

    /// Writes the whole buffer and flushes it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] on a broken stream and
    /// [`Error::Timeout`] if the write stalls past the bound.
    pub async fn send(&mut self, data: &[u8]) -> Result<()> {
        let timeout = self.timeout;
        let stream = self.stream()?;
        tokio::time::timeout(timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| Error::Timeout {
            operation: "send",
            after: timeout,
        })??;
        Ok(())
    }

    /// Reads one chunk of at most `max_bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if nothing arrives within the bound and
    /// [`Error::Connection`] if the peer closed the stream.
    pub async fn receive(&mut self, max_bytes: usize) -> Result<Vec<u8>> {
        let timeout = self.timeout;
        let stream = self.stream()?;
        let mut chunk = vec![0u8; max_bytes.max(1)];
        let n = tokio::time::timeout(timeout, stream.read(&mut chunk))
            .await
            .map_err(|_| Error::Timeout {
                operation: "reply",
                after: timeout,
            })??;

        if n == 0 {
            return Err(Error::Connection(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }

        chunk.truncate(n);
        Ok(chunk)
    }

    /// Reads one complete reply, accumulating chunks of `chunk_size` until
    /// the final line arrives. Bytes past the reply stay buffered.
    ///
    /// If the server closes the stream after sending an unterminated final
    /// line, the buffered text is returned as the reply.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Protocol`] if the reply grows beyond `max_len`, or
    /// any error from [`receive`](Self::receive) when nothing is buffered.
    pub async fn read_reply(&mut self, chunk_size: usize, max_len: usize) -> Result<Reply> {
        loop {
            if let Some(len) = complete_reply_len(&self.buffer) {
                let raw = self.buffer.split_to(len);
                return Ok(Reply::from_bytes(&raw));
            }

            if self.buffer.len() > max_len {
                return Err(Error::Protocol(format!(
                    "reply exceeds {max_len} bytes without a final line"
                )));
            }

            match self.receive(chunk_size).await {
                Ok(chunk) => self.buffer.extend_from_slice(&chunk),
                Err(Error::Connection(e))
                    if e.kind() == io::ErrorKind::UnexpectedEof && !self.buffer.is_empty() =>
                {
                    debug!(bytes = self.buffer.len(), "Server closed after a partial reply");
                    let raw = self.buffer.split();
                    return Ok(Reply::from_bytes(&raw));
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Replaces the stream with a TLS stream built by `connector`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Security`] if plaintext bytes are still buffered
    /// (they would otherwise be read as if they came over TLS) or if the
    /// handshake fails, and [`Error::Timeout`] if it stalls. The plaintext
    /// stream is gone after a handshake failure.
    pub async fn upgrade<C: Connector>(&mut self, connector: &C, server_name: &str) -> Result<()> {
        if !self.buffer.is_empty() {
            return Err(Error::Security(format!(
                "{} plaintext bytes received ahead of the TLS handshake",
                self.buffer.len()
            )));
        }

        let plain = self.stream.take().ok_or_else(|| {
            Error::Connection(io::Error::new(
                io::ErrorKind::NotConnected,
                "transport is closed",
            ))
        })?;

        let timeout = self.timeout;
        let tls = tokio::time::timeout(timeout, connector.upgrade(plain, server_name))
            .await
            .map_err(|_| Error::Timeout {
                operation: "TLS handshake",
                after: timeout,
            })??;

        self.stream = Some(tls);
        Ok(())
    }

    /// Shuts the stream down and drops it. Calling it again does nothing.
    pub async fn close(&mut self) {
        self.buffer.clear();
        if let Some(mut stream) = self.stream.take() {
            match tokio::time::timeout(self.timeout, stream.shutdown()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(?e, "Transport shutdown failed"),
                Err(_) => debug!("Transport shutdown timed out"),
            }
        }
    }
}

impl fmt::Debug for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transport")
            .field("open", &self.is_open())
            .field("buffered", &self.buffer.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}
