//! SMTP reply types.

/// One complete (possibly multi-line) reply from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code of the final line.
    pub code: ReplyCode,
    /// Text of every line, code and separator stripped, in order.
    pub message: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, message: Vec<String>) -> Self {
        Self { code, message }
    }

    /// Returns true if the reply carries exactly `code`.
    #[must_use]
    pub const fn is(&self, code: ReplyCode) -> bool {
        self.code.0 == code.0
    }

    /// Returns true if this is a success reply (2xx).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Returns the full message as a single string.
    #[must_use]
    pub fn message_text(&self) -> String {
        self.message.join("\n")
    }

    /// Returns the text of the last line, or an empty string.
    #[must_use]
    pub fn last_line(&self) -> &str {
        self.message.last().map_or("", String::as_str)
    }
}

impl std::fmt::Display for Reply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.message.join(" / "))
    }
}

/// SMTP reply code.
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

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    /// Returns true if this is an intermediate reply (3xx).
    #[must_use]
    pub const fn is_intermediate(self) -> bool {
        self.0 >= 300 && self.0 < 400
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        self.0 >= 500 && self.0 < 600
    }
}

impl std::fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Codes the session checks against
impl ReplyCode {
    /// 220 Service ready
    pub const SERVICE_READY: Self = Self(220);
    /// 221 Service closing transmission channel
    pub const CLOSING: Self = Self(221);
    /// 235 Authentication succeeded
    pub const AUTH_SUCCESS: Self = Self(235);
    /// 250 Requested mail action okay, completed
    pub const OK: Self = Self(250);
    /// 251 User not local; will forward
    pub const FORWARD: Self = Self(251);
    /// 334 Continue with authentication
    pub const AUTH_CONTINUE: Self = Self(334);
    /// 354 Start mail input
    pub const START_DATA: Self = Self(354);
    /// 503 Bad sequence of commands (sent by servers when already authenticated)
    pub const BAD_SEQUENCE: Self = Self(503);
    /// 535 Authentication credentials invalid
    pub const AUTH_FAILED: Self = Self(535);
    /// 550 Mailbox unavailable
    pub const MAILBOX_UNAVAILABLE: Self = Self(550);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    mod reply_code_tests {
        use super::*;

        #[test]
        fn classes() {
            assert!(ReplyCode::OK.is_success());
            assert!(ReplyCode::FORWARD.is_success());
            assert!(ReplyCode::START_DATA.is_intermediate());
            assert!(ReplyCode::AUTH_CONTINUE.is_intermediate());
            assert!(ReplyCode::new(421).is_transient());
            assert!(ReplyCode::MAILBOX_UNAVAILABLE.is_permanent());
            assert!(ReplyCode::AUTH_FAILED.is_permanent());
            assert!(!ReplyCode::OK.is_permanent());
        }

        #[test]
        fn display() {
            assert_eq!(ReplyCode::OK.to_string(), "250");
            assert_eq!(ReplyCode::BAD_SEQUENCE.to_string(), "503");
        }
    }

    mod reply_tests {
        use super::*;

        #[test]
        fn is_exact_code() {
            let reply = Reply::new(ReplyCode::new(354), vec!["go ahead".to_string()]);
            assert!(reply.is(ReplyCode::START_DATA));
            assert!(!reply.is(ReplyCode::OK));
            assert!(!reply.is_success());
        }

        #[test]
        fn message_text_multiple_lines() {
            let reply = Reply::new(
                ReplyCode::OK,
                vec!["smtp.example.com".to_string(), "AUTH PLAIN".to_string()],
            );
            assert_eq!(reply.message_text(), "smtp.example.com\nAUTH PLAIN");
            assert_eq!(reply.last_line(), "AUTH PLAIN");
        }

        #[test]
        fn last_line_empty() {
            let reply = Reply::new(ReplyCode::OK, vec![]);
            assert_eq!(reply.last_line(), "");
        }

        #[test]
        fn display() {
            let reply = Reply::new(ReplyCode::OK, vec!["a".to_string(), "b".to_string()]);
            assert_eq!(reply.to_string(), "250 a / b");
        }
    }
}
