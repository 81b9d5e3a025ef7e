//! Envelope address normalization.

use std::borrow::Cow;

/// Wraps an envelope address in angle brackets.
///
/// A leading `<` is added if missing, and a trailing `>` likewise, so an
/// already-bracketed address is returned unchanged. An empty address
/// becomes `<>`, the null reverse-path.
///
/// The address is not otherwise validated; callers are expected to pass
/// sanitized input without CR or LF.
#[must_use]
pub fn wrap_address(address: &str) -> Cow<'_, str> {
    let open = !address.starts_with('<');
    let close = !address.ends_with('>');
    if !open && !close {
        return Cow::Borrowed(address);
    }

    let mut wrapped = String::with_capacity(address.len() + 2);
    if open {
        wrapped.push('<');
    }
    wrapped.push_str(address);
    if close {
        wrapped.push('>');
    }
    Cow::Owned(wrapped)
}
