//! SMTP command builder.
//!
//! Every command is serialized to one CRLF-terminated line. Caller-supplied
//! fields are written as given; they must not contain CR or LF.

use crate::types::{ReplyCode, wrap_address};

/// SMTP command sent by the session engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Client identity, omitted from the line when `None`
        client_id: Option<String>,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH PLAIN with an initial response
    AuthPlain {
        /// Base64 PLAIN token
        token: String,
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Sender address, bracketed on serialization
        from: String,
        /// BODY parameter (7BIT, 8BITMIME)
        body: Option<String>,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Recipient address, bracketed on serialization
        to: String,
    },
    /// DATA - Begin message data
    Data,
    /// End-of-data marker, `<CRLF>.<CRLF>`
    EndOfData,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Serializes the command to bytes.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { client_id } => {
                buf.extend_from_slice(b"EHLO");
                if let Some(id) = client_id {
                    buf.push(b' ');
                    buf.extend_from_slice(id.as_bytes());
                }
            }
            Self::StartTls => {
                buf.extend_from_slice(b"STARTTLS");
            }
            Self::AuthPlain { token } => {
                buf.extend_from_slice(b"AUTH PLAIN ");
                buf.extend_from_slice(token.as_bytes());
            }
            Self::MailFrom { from, body } => {
                buf.extend_from_slice(b"MAIL FROM:");
                buf.extend_from_slice(wrap_address(from).as_bytes());
                if let Some(body_type) = body.as_deref().filter(|b| !b.is_empty()) {
                    buf.extend_from_slice(b" BODY=");
                    buf.extend_from_slice(body_type.as_bytes());
                }
            }
            Self::RcptTo { to } => {
                buf.extend_from_slice(b"RCPT TO:");
                buf.extend_from_slice(wrap_address(to).as_bytes());
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::EndOfData => {
                buf.extend_from_slice(b"\r\n.");
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }

    /// Returns the command verb used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::AuthPlain { .. } => "AUTH PLAIN",
            Self::MailFrom { .. } => "MAIL FROM",
            Self::RcptTo { .. } => "RCPT TO",
            Self::Data => "DATA",
            Self::EndOfData => "end of data",
            Self::Quit => "QUIT",
        }
    }

    /// Returns the reply code the command must draw.
    #[must_use]
    pub const fn expected(&self) -> ReplyCode {
        match self {
            Self::Ehlo { .. } | Self::MailFrom { .. } | Self::RcptTo { .. } | Self::EndOfData => {
                ReplyCode::OK
            }
            Self::StartTls => ReplyCode::READY,
            Self::AuthPlain { .. } => ReplyCode::AUTH_SUCCEEDED,
            Self::Data => ReplyCode::START_DATA,
            Self::Quit => ReplyCode::CLOSING,
        }
    }

    /// Returns the wire line for logging, with the AUTH token masked.
    #[must_use]
    pub fn redacted(&self) -> String {
        match self {
            Self::AuthPlain { .. } => "AUTH PLAIN <redacted>".to_string(),
            other => String::from_utf8_lossy(&other.serialize())
                .trim()
                .to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ehlo_bare() {
        let cmd = Command::Ehlo { client_id: None };
        assert_eq!(cmd.serialize(), b"EHLO\r\n");
    }

    #[test]
    fn test_ehlo_with_identity() {
        let cmd = Command::Ehlo {
            client_id: Some("client.example.com".to_string()),
        };
        assert_eq!(cmd.serialize(), b"EHLO client.example.com\r\n");
    }

    #[test]
    fn test_starttls_command() {
        assert_eq!(Command::StartTls.serialize(), b"STARTTLS\r\n");
    }

    #[test]
    fn test_auth_plain() {
        let cmd = Command::AuthPlain {
            token: "AHVzZXIAcGFzcw==".to_string(),
        };
        assert_eq!(cmd.serialize(), b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n");
        assert_eq!(cmd.redacted(), "AUTH PLAIN <redacted>");
    }

    #[test]
    fn test_mail_from_wraps_address() {
        let cmd = Command::MailFrom {
            from: "sender@example.com".to_string(),
            body: None,
        };
        assert_eq!(cmd.serialize(), b"MAIL FROM:<sender@example.com>\r\n");
    }

    #[test]
    fn test_mail_from_keeps_brackets() {
        let cmd = Command::MailFrom {
            from: "<sender@example.com>".to_string(),
            body: Some(String::new()),
        };
        assert_eq!(cmd.serialize(), b"MAIL FROM:<sender@example.com>\r\n");
    }

    #[test]
    fn test_mail_from_with_body() {
        let cmd = Command::MailFrom {
            from: "sender@example.com".to_string(),
            body: Some("8BITMIME".to_string()),
        };
        assert_eq!(
            cmd.serialize(),
            b"MAIL FROM:<sender@example.com> BODY=8BITMIME\r\n"
        );
    }

    #[test]
    fn test_rcpt_to_command() {
        let cmd = Command::RcptTo {
            to: "recipient@example.com".to_string(),
        };
        assert_eq!(cmd.serialize(), b"RCPT TO:<recipient@example.com>\r\n");
        assert_eq!(cmd.redacted(), "RCPT TO:<recipient@example.com>");
    }

    #[test]
    fn test_data_commands() {
        assert_eq!(Command::Data.serialize(), b"DATA\r\n");
        assert_eq!(Command::EndOfData.serialize(), b"\r\n.\r\n");
    }

    #[test]
    fn test_quit_command() {
        assert_eq!(Command::Quit.serialize(), b"QUIT\r\n");
    }

    #[test]
    fn test_expected_codes() {
        assert_eq!(Command::Ehlo { client_id: None }.expected(), ReplyCode::OK);
        assert_eq!(Command::StartTls.expected(), ReplyCode::READY);
        assert_eq!(
            Command::AuthPlain { token: String::new() }.expected(),
            ReplyCode::AUTH_SUCCEEDED
        );
        assert_eq!(Command::Data.expected(), ReplyCode::START_DATA);
        assert_eq!(Command::EndOfData.expected(), ReplyCode::OK);
        assert_eq!(Command::Quit.expected(), ReplyCode::CLOSING);
    }
}
