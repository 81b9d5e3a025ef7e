//! SMTP connection management: the owned transport and the session engine.

mod session;
mod transport;

pub use session::{AuthOutcome, Mode, Session, SessionState};
pub use transport::{AsyncStream, BoxedStream, Connector, TcpConnector, Transport};
