//! SMTP reply line parser.
//!
//! Every reply line is a three digit code followed by a separator and free
//! text. A `-` separator means more lines follow; anything else (usually a
//! space, or nothing at all) ends the reply:
//!
//! ```text
//! 250-smtp.example.com
//! 250-AUTH PLAIN LOGIN
//! 250 OK
//! ```

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// One parsed line of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyLine {
    /// Reply code.
    pub code: ReplyCode,
    /// True unless the separator was `-`.
    pub last: bool,
    /// Text after the separator with surrounding whitespace removed.
    pub text: String,
}

/// Parses a single reply line (without its CRLF).
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if the line does not start with a code
/// in the 100-599 range.
pub fn parse_reply_line(line: &[u8]) -> Result<ReplyLine> {
    let digits = line
        .get(..3)
        .filter(|d| d.iter().all(u8::is_ascii_digit) && (b'1'..=b'5').contains(&d[0]))
        .ok_or_else(|| Error::MalformedReply(String::from_utf8_lossy(line).into_owned()))?;

    let code = digits
        .iter()
        .fold(0u16, |acc, d| acc * 10 + u16::from(d - b'0'));

    let last = line.get(3) != Some(&b'-');
    let text = line
        .get(4..)
        .map(|rest| String::from_utf8_lossy(rest).trim().to_string())
        .unwrap_or_default();

    Ok(ReplyLine {
        code: ReplyCode::new(code),
        last,
        text,
    })
}

/// Assembles parsed lines into a [`Reply`] carrying the code of the final line.
///
/// # Errors
///
/// Returns an error if `lines` is empty or any line is malformed.
pub fn parse_reply<L: AsRef<[u8]>>(lines: &[L]) -> Result<Reply> {
    let mut message = Vec::with_capacity(lines.len());
    let mut code = None;

    for line in lines {
        let parsed = parse_reply_line(line.as_ref())?;
        code = Some(parsed.code);
        message.push(parsed.text);
    }

    code.map(|code| Reply::new(code, message))
        .ok_or_else(|| Error::MalformedReply("empty reply".into()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_single_line_reply() {
        let reply = parse_reply(&["250 OK"]).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.message, vec!["OK"]);
    }

    #[test]
    fn test_parse_multi_line_reply() {
        let reply = parse_reply(&["250-Hello", "250-AUTH PLAIN LOGIN", "250 OK"]).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.message, vec!["Hello", "AUTH PLAIN LOGIN", "OK"]);
    }

    #[test]
    fn test_continuation_marker() {
        assert!(!parse_reply_line(b"250-Continuing").unwrap().last);
        assert!(parse_reply_line(b"250 Done").unwrap().last);
        assert!(parse_reply_line(b"250").unwrap().last);
        // Any character other than '-' ends the reply
        assert!(parse_reply_line(b"250xtext").unwrap().last);
    }

    #[test]
    fn test_text_is_stripped() {
        let line = parse_reply_line(b"354   Start mail input  ").unwrap();
        assert_eq!(line.text, "Start mail input");
    }

    #[test]
    fn test_code_only_has_empty_text() {
        let line = parse_reply_line(b"250").unwrap();
        assert_eq!(line.code, ReplyCode::OK);
        assert_eq!(line.text, "");
    }

    #[test]
    fn test_non_utf8_text_is_lossy() {
        let line = parse_reply_line(b"250 caf\xe9").unwrap();
        assert_eq!(line.text, "caf\u{fffd}");
    }

    #[test]
    fn test_parse_error_empty() {
        let empty: [&str; 0] = [];
        assert!(parse_reply(&empty).is_err());
    }

    #[test]
    fn test_parse_error_too_short() {
        assert!(matches!(
            parse_reply_line(b"25"),
            Err(Error::MalformedReply(_))
        ));
    }

    #[test]
    fn test_parse_error_invalid_code() {
        assert!(parse_reply_line(b"ABC OK").is_err());
        assert!(parse_reply_line(b"650 out of range").is_err());
        assert!(parse_reply_line(b"099 out of range").is_err());
    }

    proptest! {
        #[test]
        fn prop_any_valid_code_round_trips(code in 100u16..600, text in "[ -~]{0,60}") {
            let line = format!("{code} {text}");
            let parsed = parse_reply_line(line.as_bytes()).unwrap();
            prop_assert_eq!(parsed.code.as_u16(), code);
            prop_assert!(parsed.last);
            prop_assert_eq!(parsed.text, text.trim());
        }

        #[test]
        fn prop_dash_always_continues(code in 100u16..600, text in "[ -~]{0,60}") {
            let line = format!("{code}-{text}");
            prop_assert!(!parse_reply_line(line.as_bytes()).unwrap().last);
        }
    }
}
