//! Server capabilities read from the EHLO reply.

use std::collections::HashMap;

use super::Reply;

/// Keywords advertised in an EHLO reply, with their parameters.
///
/// This is a reading of the reply text only; the session never changes its
/// command sequence based on what the server advertises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    keywords: HashMap<String, Vec<String>>,
}

impl Capabilities {
    /// Parses the capability lines of an EHLO reply.
    ///
    /// The first line is the server's greeting and is skipped. Keywords are
    /// stored upper-cased.
    #[must_use]
    pub fn from_ehlo(reply: &Reply) -> Self {
        let keywords = reply
            .lines()
            .skip(1)
            .filter_map(|line| {
                let mut parts = line.get(4..)?.split_whitespace();
                let keyword = parts.next()?.to_ascii_uppercase();
                Some((keyword, parts.map(str::to_string).collect()))
            })
            .collect();
        Self { keywords }
    }

    /// Returns true if no keywords are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Checks if the server advertised `keyword` (case-insensitive).
    #[must_use]
    pub fn supports(&self, keyword: &str) -> bool {
        self.keywords.contains_key(&keyword.to_ascii_uppercase())
    }

    /// Returns the parameters advertised with `keyword`.
    #[must_use]
    pub fn params(&self, keyword: &str) -> Option<&[String]> {
        self.keywords
            .get(&keyword.to_ascii_uppercase())
            .map(Vec::as_slice)
    }

    /// Checks if STARTTLS is advertised.
    #[must_use]
    pub fn supports_starttls(&self) -> bool {
        self.supports("STARTTLS")
    }

    /// Returns the advertised SASL mechanisms, upper-cased.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Vec<String> {
        self.params("AUTH")
            .unwrap_or_default()
            .iter()
            .map(|m| m.to_ascii_uppercase())
            .collect()
    }

    /// Returns the maximum message size, if advertised with a value.
    #[must_use]
    pub fn max_message_size(&self) -> Option<usize> {
        self.params("SIZE")?.first()?.parse().ok()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ehlo() -> Reply {
        Reply::from_bytes(
            b"250-mx.example.com greets you\r\n\
              250-SIZE 52428800\r\n\
              250-8BITMIME\r\n\
              250-auth plain LOGIN\r\n\
              250 STARTTLS\r\n",
        )
    }

    #[test]
    fn parses_keywords() {
        let caps = Capabilities::from_ehlo(&ehlo());
        assert!(caps.supports_starttls());
        assert!(caps.supports("8bitmime"));
        assert!(!caps.supports("PIPELINING"));
        assert!(!caps.supports("mx.example.com"));
    }

    #[test]
    fn parses_params() {
        let caps = Capabilities::from_ehlo(&ehlo());
        assert_eq!(caps.max_message_size(), Some(52_428_800));
        assert_eq!(caps.auth_mechanisms(), vec!["PLAIN", "LOGIN"]);
    }

    #[test]
    fn single_line_ehlo_has_none() {
        let caps = Capabilities::from_ehlo(&Reply::from_bytes(b"250 ok\r\n"));
        assert!(caps.is_empty());
        assert!(caps.auth_mechanisms().is_empty());
        assert_eq!(caps.max_message_size(), None);
    }
}
