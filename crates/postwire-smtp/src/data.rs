//! Message body transparency (RFC 5321 section 4.5.2).
//!
//! [`Session::send_body`](crate::Session::send_body) writes the body
//! verbatim, so a line consisting of a single `.` would end the DATA phase
//! early. Callers run bodies through [`dot_stuff`] first.

use std::borrow::Cow;

/// Doubles every `.` that starts a line.
///
/// A line starts at the beginning of the body and after each CRLF. The body
/// is borrowed unchanged when nothing needs escaping.
#[must_use]
pub fn dot_stuff(body: &[u8]) -> Cow<'_, [u8]> {
    #[derive(Clone, Copy)]
    enum State {
        LineStart,
        Cr,
        Inline,
    }

    let mut state = State::LineStart;
    let mut out: Option<Vec<u8>> = None;

    for (pos, &byte) in body.iter().enumerate() {
        if byte == b'.' && matches!(state, State::LineStart) {
            let buf = out.get_or_insert_with(|| {
                let mut buf = Vec::with_capacity(body.len() + 16);
                buf.extend_from_slice(&body[..pos]);
                buf
            });
            buf.push(b'.');
        }
        if let Some(buf) = out.as_mut() {
            buf.push(byte);
        }

        state = match (state, byte) {
            (_, b'\r') => State::Cr,
            (State::Cr, b'\n') => State::LineStart,
            _ => State::Inline,
        };
    }

    out.map_or(Cow::Borrowed(body), Cow::Owned)
}
