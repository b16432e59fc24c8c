//! Preparing message text for the DATA phase.
//!
//! The session writes body bytes verbatim, so the caller has to produce
//! CRLF line endings and escape lines that start with a dot.

/// Converts line endings to CRLF and doubles a leading `.` on every line.
#[must_use]
pub fn prepare(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);

    for line in text.split_inclusive('\n') {
        let content = line
            .strip_suffix('\n')
            .map_or(line, |l| l.strip_suffix('\r').unwrap_or(l));

        if content.starts_with('.') {
            out.push('.');
        }
        out.push_str(content);
        if line.ends_with('\n') {
            out.push_str("\r\n");
        }
    }

    out
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_lf_becomes_crlf() {
        assert_eq!(prepare("a\nb\n"), "a\r\nb\r\n");
    }

    #[test]
    fn test_crlf_kept() {
        assert_eq!(prepare("a\r\nb\r\n"), "a\r\nb\r\n");
    }

    #[test]
    fn test_leading_dot_doubled() {
        assert_eq!(prepare("...\n.\nx.y\n"), "....\r\n..\r\nx.y\r\n");
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(prepare("last line"), "last line");
    }

    #[test]
    fn test_empty() {
        assert_eq!(prepare(""), "");
    }
}
