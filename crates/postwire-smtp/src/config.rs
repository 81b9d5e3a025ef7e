//! Session configuration.

use std::time::Duration;

/// Default SMTP port.
pub const DEFAULT_PORT: u16 = 25;

/// Default size of a single read from the transport.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Default upper bound on the size of one reply.
pub const DEFAULT_MAX_REPLY_LEN: usize = 64 * 1024;

/// Configuration for an SMTP session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Server hostname, also used as the TLS server identity.
    pub host: String,
    /// Server port (default: 25).
    pub port: u16,
    /// Bound on opening the connection.
    pub connect_timeout: Duration,
    /// Bound on each read and on the TLS handshake.
    pub read_timeout: Duration,
    /// Bytes requested per read.
    pub chunk_size: usize,
    /// Identity sent with EHLO. `None` sends a bare `EHLO`.
    pub client_id: Option<String>,
    /// Largest reply accepted before the session gives up.
    pub max_reply_len: usize,
}

impl SessionConfig {
    /// Creates a configuration for `host` with default settings.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(10),
            chunk_size: DEFAULT_CHUNK_SIZE,
            client_id: None,
            max_reply_len: DEFAULT_MAX_REPLY_LEN,
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the read chunk size. Zero is raised to one.
    #[must_use]
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Sets the EHLO identity.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the maximum reply size.
    #[must_use]
    pub const fn max_reply_len(mut self, len: usize) -> Self {
        self.max_reply_len = len;
        self
    }
}
