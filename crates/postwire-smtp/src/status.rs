//! Reply-code validation.
//!
//! Validation is a predicate and never fails: the session engine decides
//! whether a mismatch is fatal ([`Error::UnexpectedStatus`]) or an expected
//! outcome (a rejected `AUTH`).
//!
//! The code is taken as the first three characters of the reply without
//! checking that they are digits; a reply that does not start with the
//! expected digits simply does not match.
//!
//! [`Error::UnexpectedStatus`]: crate::Error::UnexpectedStatus

use crate::types::ReplyCode;

/// Returns the status code of a reply: its first three characters, or the
/// whole reply if it is shorter.
#[must_use]
pub fn parse_code(reply: &str) -> &str {
    reply
        .char_indices()
        .nth(3)
        .map_or(reply, |(end, _)| &reply[..end])
}

/// Returns true iff the reply's code is `expected`.
#[must_use]
pub fn expect(reply: &str, expected: ReplyCode) -> bool {
    expected.matches(parse_code(reply))
}

/// Returns true iff the reply's code is any of `expected`.
#[must_use]
pub fn expect_any(reply: &str, expected: &[ReplyCode]) -> bool {
    let code = parse_code(reply);
    expected.iter().any(|candidate| candidate.matches(code))
}
