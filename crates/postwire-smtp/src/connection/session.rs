//! Caller-driven SMTP session.
//!
//! Each public operation sends at most one command and reads exactly one
//! reply before returning; the caller decides what comes next. Operations
//! called in the wrong state fail with [`Error::InvalidState`] before any
//! byte is written.

use tracing::{debug, info, warn};

use super::transport::{BoxedStream, Connector, TcpConnector, Transport};
use crate::auth::{Credentials, encode_plain};
use crate::command::Command;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::types::{Capabilities, Reply, ReplyCode};

/// Where the session is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No greeting read yet.
    Unconnected,
    /// Greeting accepted; EHLO, STARTTLS, AUTH or MAIL FROM may follow.
    Connected,
    /// AUTH accepted.
    Authenticated,
    /// MAIL FROM accepted, no recipient yet.
    MailFrom,
    /// At least one RCPT TO accepted.
    Recipients,
    /// DATA accepted; the body and end-of-data marker may follow.
    Data,
    /// QUIT sent or [`Session::close`] called; the transport is released.
    Closed,
    /// A transport failure left the stream unusable; only `close` remains.
    Broken,
}

/// Whether the transport is encrypted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Plain TCP.
    Plaintext,
    /// TLS after a successful STARTTLS.
    Encrypted,
}

/// Result of `AUTH PLAIN`.
///
/// A rejection is an ordinary outcome: the session stays usable and the
/// caller may retry with other credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The server replied 235.
    Accepted(Reply),
    /// The server replied with anything else.
    Rejected(Reply),
}

impl AuthOutcome {
    /// Returns true if the credentials were accepted.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Returns the server's reply.
    #[must_use]
    pub const fn reply(&self) -> &Reply {
        match self {
            Self::Accepted(reply) | Self::Rejected(reply) => reply,
        }
    }

    /// Consumes the outcome, returning the reply.
    #[must_use]
    pub fn into_reply(self) -> Reply {
        match self {
            Self::Accepted(reply) | Self::Rejected(reply) => reply,
        }
    }
}

/// SMTP client session over a single owned transport.
#[derive(Debug)]
pub struct Session<C = TcpConnector> {
    config: SessionConfig,
    connector: C,
    transport: Option<Transport>,
    state: SessionState,
    mode: Mode,
    authenticated: bool,
    capabilities: Capabilities,
}

impl Session<TcpConnector> {
    /// Creates an unconnected session that will dial `config.host` over TCP.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_connector(config, TcpConnector::new())
    }

    /// Creates an unconnected session over an already-open stream.
    ///
    /// [`connect`](Self::connect) reads the greeting from `stream` instead
    /// of dialing.
    #[must_use]
    pub fn from_stream(config: SessionConfig, stream: BoxedStream) -> Self {
        Self::with_stream(config, TcpConnector::new(), stream)
    }
}

impl<C: Connector> Session<C> {
    /// Creates an unconnected session that opens its stream via `connector`.
    #[must_use]
    pub fn with_connector(config: SessionConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            transport: None,
            state: SessionState::Unconnected,
            mode: Mode::Plaintext,
            authenticated: false,
            capabilities: Capabilities::default(),
        }
    }

    /// Creates an unconnected session over an already-open stream; the
    /// connector is only used for the TLS upgrade.
    #[must_use]
    pub fn with_stream(config: SessionConfig, connector: C, stream: BoxedStream) -> Self {
        let transport = Transport::new(stream, config.read_timeout);
        let mut session = Self::with_connector(config, connector);
        session.transport = Some(transport);
        session
    }

    /// Returns the current protocol state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns whether the transport is encrypted.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns true once AUTH has been accepted.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Returns the server host, also the TLS identity.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns what the last EHLO reply advertised.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Opens the transport if needed and reads the greeting (220).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] or [`Error::Timeout`] if the server
    /// cannot be reached, and [`Error::UnexpectedStatus`] if the greeting
    /// is not 220.
    pub async fn connect(&mut self) -> Result<Reply> {
        self.require("connect", &[SessionState::Unconnected])?;

        if self.transport.is_none() {
            info!(host = %self.config.host, port = self.config.port, "Connecting");
            let transport = Transport::open(
                &self.connector,
                &self.config.host,
                self.config.port,
                self.config.connect_timeout,
                self.config.read_timeout,
            )
            .await?;
            self.transport = Some(transport);
        }

        let result = self.read_reply().await;
        let reply = self.observe(result)?;
        Self::check("greeting", ReplyCode::READY, &reply)?;

        self.state = SessionState::Connected;
        info!(host = %self.config.host, "Connected");
        Ok(reply)
    }

    /// Sends EHLO (250) and records the advertised capabilities.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the reply is not 250.
    pub async fn ehlo(&mut self) -> Result<Reply> {
        self.require("EHLO", &[SessionState::Connected])?;

        let command = Command::Ehlo {
            client_id: self.config.client_id.clone(),
        };
        let reply = self.exchange(&command).await?;
        Self::check(command.name(), command.expected(), &reply)?;

        self.capabilities = Capabilities::from_ehlo(&reply);
        Ok(reply)
    }

    /// Sends STARTTLS (220) and replaces the transport with a TLS stream.
    ///
    /// Every later command travels over the new stream. Capabilities from
    /// the plaintext EHLO are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the reply is not 220, and
    /// [`Error::Security`] if the handshake fails; the transport is closed
    /// in that case.
    pub async fn starttls(&mut self) -> Result<Reply> {
        self.require("STARTTLS", &[SessionState::Connected])?;
        if self.mode == Mode::Encrypted {
            return Err(Error::InvalidState {
                operation: "STARTTLS",
                state: self.state,
            });
        }

        let command = Command::StartTls;
        let reply = self.exchange(&command).await?;
        Self::check(command.name(), command.expected(), &reply)?;

        let transport = live(&mut self.transport, "STARTTLS", self.state)?;
        let result = transport.upgrade(&self.connector, &self.config.host).await;
        if let Err(e) = self.observe(result) {
            self.release().await;
            return Err(e);
        }

        self.mode = Mode::Encrypted;
        self.capabilities = Capabilities::default();
        info!(host = %self.config.host, "TLS established");
        Ok(reply)
    }

    /// Sends `AUTH PLAIN` with the encoded credentials.
    ///
    /// A reply other than 235 is returned as [`AuthOutcome::Rejected`] and
    /// leaves the session connected.
    ///
    /// # Errors
    ///
    /// Returns transport errors only.
    pub async fn authenticate_plain(&mut self, user: &str, secret: &str) -> Result<AuthOutcome> {
        self.require("AUTH PLAIN", &[SessionState::Connected])?;
        self.auth_plain(user, encode_plain(user, secret)).await
    }

    /// Same as [`authenticate_plain`](Self::authenticate_plain).
    ///
    /// # Errors
    ///
    /// Returns transport errors only.
    pub async fn authenticate(&mut self, credentials: &Credentials) -> Result<AuthOutcome> {
        self.require("AUTH PLAIN", &[SessionState::Connected])?;
        self.auth_plain(credentials.user(), credentials.encode_plain())
            .await
    }

    async fn auth_plain(&mut self, user: &str, token: String) -> Result<AuthOutcome> {
        let command = Command::AuthPlain { token };
        let reply = self.exchange(&command).await?;

        if reply.is(command.expected()) {
            self.state = SessionState::Authenticated;
            self.authenticated = true;
            info!(user, "Authenticated");
            Ok(AuthOutcome::Accepted(reply))
        } else {
            warn!(user, code = reply.code(), "Authentication rejected");
            Ok(AuthOutcome::Rejected(reply))
        }
    }

    /// Sends `MAIL FROM` (250), with `BODY=<body>` when given.
    ///
    /// The address is bracketed if it is not already.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the reply is not 250.
    pub async fn mail_from(&mut self, address: &str, body: Option<&str>) -> Result<Reply> {
        self.require(
            "MAIL FROM",
            &[SessionState::Connected, SessionState::Authenticated],
        )?;

        let command = Command::MailFrom {
            from: address.to_string(),
            body: body.map(str::to_string),
        };
        let reply = self.exchange(&command).await?;
        Self::check(command.name(), command.expected(), &reply)?;

        self.state = SessionState::MailFrom;
        Ok(reply)
    }

    /// Sends `RCPT TO` (250). May be repeated for more recipients.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the reply is not 250.
    pub async fn rcpt_to(&mut self, address: &str) -> Result<Reply> {
        self.require(
            "RCPT TO",
            &[SessionState::MailFrom, SessionState::Recipients],
        )?;

        let command = Command::RcptTo {
            to: address.to_string(),
        };
        let reply = self.exchange(&command).await?;
        Self::check(command.name(), command.expected(), &reply)?;

        self.state = SessionState::Recipients;
        Ok(reply)
    }

    /// Sends DATA (354).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the reply is not 354.
    pub async fn begin_data(&mut self) -> Result<Reply> {
        self.require("DATA", &[SessionState::Recipients])?;

        let command = Command::Data;
        let reply = self.exchange(&command).await?;
        Self::check(command.name(), command.expected(), &reply)?;

        self.state = SessionState::Data;
        Ok(reply)
    }

    /// Writes the message body verbatim. No reply is read.
    ///
    /// The body is not dot-stuffed; see [`crate::data::dot_stuff`].
    ///
    /// # Errors
    ///
    /// Returns transport errors only.
    pub async fn send_body(&mut self, body: &[u8]) -> Result<()> {
        self.require("send body", &[SessionState::Data])?;

        debug!(bytes = body.len(), "Sending message body");
        let transport = live(&mut self.transport, "send body", self.state)?;
        let result = transport.send(body).await;
        self.observe(result)
    }

    /// Sends the end-of-data marker (250). The session can start another
    /// transaction afterwards.
    ///
    /// Any reply ends the DATA phase, so a rejected message also returns
    /// the session to command mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the message is not accepted.
    pub async fn end_data(&mut self) -> Result<Reply> {
        self.require("end of data", &[SessionState::Data])?;

        let command = Command::EndOfData;
        let reply = self.exchange(&command).await?;
        self.state = if self.authenticated {
            SessionState::Authenticated
        } else {
            SessionState::Connected
        };
        Self::check(command.name(), command.expected(), &reply)?;

        info!("Message accepted");
        Ok(reply)
    }

    /// Sends QUIT (221) and closes the transport whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedStatus`] if the reply is not 221; the
    /// transport is closed regardless.
    pub async fn quit(&mut self) -> Result<Reply> {
        self.require(
            "QUIT",
            &[
                SessionState::Connected,
                SessionState::Authenticated,
                SessionState::MailFrom,
                SessionState::Recipients,
            ],
        )?;

        let command = Command::Quit;
        let result = self.exchange(&command).await;
        self.close().await;

        let reply = result?;
        Self::check(command.name(), command.expected(), &reply)?;
        Ok(reply)
    }

    /// Releases the transport without sending anything. Safe to call in any
    /// state and more than once.
    pub async fn close(&mut self) {
        self.release().await;
        self.state = SessionState::Closed;
    }

    async fn release(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await;
            info!(host = %self.config.host, "Connection closed");
        }
    }

    fn require(&self, operation: &'static str, allowed: &[SessionState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    fn check(command: &'static str, expected: ReplyCode, reply: &Reply) -> Result<()> {
        if reply.is(expected) {
            return Ok(());
        }

        let err = Error::unexpected_status(command, reply.code(), expected);
        warn!(command, observed = reply.code(), %expected, "Unexpected reply");
        Err(err)
    }

    fn observe<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            if e.is_fatal_to_transport() {
                warn!(error = %e, "Session broken");
                self.state = SessionState::Broken;
            }
        }
        result
    }

    async fn exchange(&mut self, command: &Command) -> Result<Reply> {
        debug!(command = command.name(), line = %command.redacted(), "Sending command");
        let bytes = command.serialize();

        let transport = live(&mut self.transport, command.name(), self.state)?;
        let result = match transport.send(&bytes).await {
            Ok(()) => Self::read_from(transport, &self.config).await,
            Err(e) => Err(e),
        };
        self.observe(result)
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let transport = live(&mut self.transport, "read reply", self.state)?;
        Self::read_from(transport, &self.config).await
    }

    async fn read_from(transport: &mut Transport, config: &SessionConfig) -> Result<Reply> {
        let reply = transport
            .read_reply(config.chunk_size, config.max_reply_len)
            .await?;
        debug!(code = reply.code(), text = %reply.text(), "Received reply");
        Ok(reply)
    }
}

fn live<'a>(
    transport: &'a mut Option<Transport>,
    operation: &'static str,
    state: SessionState,
) -> Result<&'a mut Transport> {
    transport
        .as_mut()
        .ok_or(Error::InvalidState { operation, state })
}
