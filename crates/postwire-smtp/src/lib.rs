//! # postwire-smtp
//!
//! A small SMTP submission client: it authenticates to a relay and submits
//! one message through the greeting, EHLO, STARTTLS, AUTH PLAIN and mail
//! transaction steps, in the order the caller drives them.
//!
//! ## Features
//!
//! - **Caller-driven session**: one command, one reply per call; no
//!   pipelining, no hidden steps
//! - **Exact reply-code contract**: every step names the code it requires
//!   and fails with [`Error::UnexpectedStatus`] otherwise
//! - **STARTTLS via rustls**: the plaintext stream is moved into the TLS
//!   stream and can never be used again
//! - **AUTH PLAIN**: a rejection is a returned [`AuthOutcome`], not an error
//! - **Multi-line replies**: replies are accumulated across reads until the
//!   final line arrives
//!
//! ## Quick Start
//!
//! ```ignore
//! use postwire_smtp::{Session, SessionConfig};
//! use postwire_smtp::data::dot_stuff;
//!
//! #[tokio::main]
//! async fn main() -> postwire_smtp::Result<()> {
//!     let mut session = Session::new(SessionConfig::new("smtp.example.com").port(587));
//!
//!     session.connect().await?;
//!     session.ehlo().await?;
//!     session.starttls().await?;
//!     session.ehlo().await?;
//!
//!     let outcome = session.authenticate_plain("user@example.com", "password").await?;
//!     if !outcome.succeeded() {
//!         session.quit().await?;
//!         return Ok(());
//!     }
//!
//!     session.mail_from("user@example.com", None).await?;
//!     session.rcpt_to("friend@example.org").await?;
//!     session.begin_data().await?;
//!     session.send_body(&dot_stuff(b"Subject: Hi\r\n\r\nHello!")).await?;
//!     session.end_data().await?;
//!     session.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! Unconnected ── connect() ──→ Connected ── authenticate_plain() ──→ Authenticated
//!                               │  ▲ ehlo(), starttls()                   │
//!                               └──┴──────────── mail_from() ─────────────┘
//!                                                    │
//!                     MailFrom ── rcpt_to() ──→ Recipients ── begin_data() ──→ Data
//!                                                                              │
//!                     Connected/Authenticated ←──────────── end_data() ───────┘
//!
//! quit() / close() ──→ Closed        transport failure ──→ Broken
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Transport and session engine
//! - [`parser`]: Reply framing
//! - [`status`]: Reply-code validation
//! - [`types`]: Replies, reply codes, capabilities, address wrapping

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod command;
pub mod config;
pub mod connection;
pub mod data;
mod error;
pub mod parser;
pub mod status;
pub mod types;

pub use auth::Credentials;
pub use config::SessionConfig;
pub use connection::{
    AuthOutcome, BoxedStream, Connector, Mode, Session, SessionState, TcpConnector,
};
pub use error::{Error, Result};
pub use types::{Capabilities, Reply, ReplyCode};
