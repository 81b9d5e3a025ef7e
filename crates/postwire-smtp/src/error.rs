//! Error types for SMTP sessions.

use std::io;
use std::time::Duration;

use crate::connection::SessionState;
use crate::types::ReplyCode;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP session error.
///
/// None of the variants ever carry credential material; an authentication
/// rejection is not an error at all (see [`crate::AuthOutcome`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The transport could not be established, or broke mid-session.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// No reply (or connection) within the configured bound.
    #[error("timed out after {after:?} waiting for {operation}")]
    Timeout {
        /// What the session was waiting for.
        operation: &'static str,
        /// The bound that elapsed.
        after: Duration,
    },

    /// The TLS upgrade failed. The session must not continue in plaintext.
    #[error("TLS error: {0}")]
    Security(String),

    /// The server replied with a code other than the one the step requires.
    #[error("unexpected reply to {command}: {observed} instead of {expected}")]
    UnexpectedStatus {
        /// Command that drew the reply.
        command: &'static str,
        /// First three characters of the reply.
        observed: String,
        /// Code the step requires.
        expected: ReplyCode,
    },

    /// Operation invoked in a state that does not allow it. Nothing was sent.
    #[error("{operation} is not valid in state {state:?}")]
    InvalidState {
        /// Operation the caller attempted.
        operation: &'static str,
        /// State the session was in.
        state: SessionState,
    },

    /// Malformed or oversized reply.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Creates an unexpected-status error.
    #[must_use]
    pub fn unexpected_status(
        command: &'static str,
        observed: impl Into<String>,
        expected: ReplyCode,
    ) -> Self {
        Self::UnexpectedStatus {
            command,
            observed: observed.into(),
            expected,
        }
    }

    /// Returns true if the server rejected the step permanently (5xx).
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { observed, .. } if observed.starts_with('5'))
    }

    /// Returns true if the server rejected the step transiently (4xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UnexpectedStatus { observed, .. } if observed.starts_with('4'))
    }

    /// Returns true if the error leaves the transport in an unknown state.
    ///
    /// After such an error the only meaningful call is
    /// [`Session::close`](crate::Session::close).
    #[must_use]
    pub const fn is_fatal_to_transport(&self) -> bool {
        matches!(
            self,
            Self::Connection(_) | Self::Timeout { .. } | Self::Security(_) | Self::Protocol(_)
        )
    }
}
