//! SMTP reply framing.
//!
//! A reply may arrive split across several reads, and a multi-line reply
//! spans several lines:
//! - Single: `250 OK\r\n`
//! - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
//!
//! The reply is complete once a terminated line is seen whose fourth byte
//! is not the `-` continuation marker.

/// Returns the length in bytes of the first complete reply in `buf`, or
/// `None` if more data is needed.
#[must_use]
pub fn complete_reply_len(buf: &[u8]) -> Option<usize> {
    let mut start = 0;
    while let Some(pos) = find_newline(&buf[start..]) {
        let end = start + pos + 1;
        if is_last_reply_line(&buf[start..end]) {
            return Some(end);
        }
        start = end;
    }
    None
}

/// Checks if a line is the last line of a reply.
///
/// Continuation lines carry `-` right after the code; anything else,
/// including a line too short to carry a separator, ends the reply.
#[must_use]
pub fn is_last_reply_line(line: &[u8]) -> bool {
    line.get(3) != Some(&b'-')
}

fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}
