//! PLAIN credential encoding (RFC 4616).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// A user name and secret for `AUTH PLAIN`.
///
/// The secret never appears in the `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    secret: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            secret: secret.into(),
        }
    }

    /// Returns the user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the base64 PLAIN token for these credentials.
    #[must_use]
    pub fn encode_plain(&self) -> String {
        encode_plain(&self.user, &self.secret)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Builds the PLAIN token: base64 of `NUL user NUL secret`.
///
/// The authorization identity is left empty.
#[must_use]
pub fn encode_plain(user: &str, secret: &str) -> String {
    let mut packed = Vec::with_capacity(user.len() + secret.len() + 2);
    packed.push(0);
    packed.extend_from_slice(user.as_bytes());
    packed.push(0);
    packed.extend_from_slice(secret.as_bytes());
    STANDARD.encode(packed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_token() {
        assert_eq!(encode_plain("user", "pass"), "AHVzZXIAcGFzcw==");
        assert_eq!(
            Credentials::new("bob", "secret").encode_plain(),
            "AGJvYgBzZWNyZXQ="
        );
    }

    #[test]
    fn debug_hides_secret() {
        let debug = format!("{:?}", Credentials::new("bob", "hunter2"));
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
    }

    proptest! {
        #[test]
        fn token_round_trips(user in "[^\\x00]*", secret in "[^\\x00]*") {
            let decoded = STANDARD.decode(encode_plain(&user, &secret)).unwrap();
            let decoded = String::from_utf8(decoded).unwrap();
            let fields: Vec<&str> = decoded.split('\0').collect();
            prop_assert_eq!(fields, vec!["", user.as_str(), secret.as_str()]);
        }
    }
}
