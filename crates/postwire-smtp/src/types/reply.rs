//! SMTP reply types.

use crate::status;

/// SMTP reply from server, as received.
///
/// The raw text is kept whole; the code and message are views into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    raw: String,
}

impl Reply {
    /// Creates a reply from the raw bytes of one complete server reply.
    ///
    /// Invalid UTF-8 is replaced rather than rejected.
    #[must_use]
    pub fn from_bytes(raw: &[u8]) -> Self {
        Self {
            raw: String::from_utf8_lossy(raw).into_owned(),
        }
    }

    /// Returns the status code: the first three characters of the reply.
    #[must_use]
    pub fn code(&self) -> &str {
        status::parse_code(&self.raw)
    }

    /// Returns true if the reply carries `expected`.
    #[must_use]
    pub fn is(&self, expected: ReplyCode) -> bool {
        status::expect(&self.raw, expected)
    }

    /// Returns the raw reply text including line terminators.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the reply lines without terminators.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.raw.lines().filter(|line| !line.is_empty())
    }

    /// Returns the message text: each line with its code and separator
    /// removed, joined by newlines.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines()
            .map(|line| line.get(4..).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.raw.trim_end())
    }
}

/// SMTP reply code a protocol step requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReplyCode(u16);

impl ReplyCode {
    /// Creates a new reply code.
    #[must_use]
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Returns the three ASCII digits of the code.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn digits(self) -> [u8; 3] {
        let n = self.0 % 1000;
        [
            b'0' + (n / 100) as u8,
            b'0' + (n / 10 % 10) as u8,
            b'0' + (n % 10) as u8,
        ]
    }

    /// Returns true if `observed` is exactly this code's three digits.
    #[must_use]
    pub fn matches(self, observed: &str) -> bool {
        observed.as_bytes() == self.digits()
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

// Codes the session engine requires
impl ReplyCode {
    /// 220 Service ready (greeting, STARTTLS go-ahead)
    pub const READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCEEDED: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
}
