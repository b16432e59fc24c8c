//! Error types for SMTP operations.

use std::io;
use std::time::Duration;

use crate::connection::SessionState;

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// A read, write or connect did not complete within the configured deadline.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The server closed the connection.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// A reply line exceeded the line reader's limit.
    #[error("Reply line exceeds {0} bytes")]
    LineTooLong(usize),

    /// A reply line that does not start with a three digit code.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// Server answered a checkpoint command with the wrong code.
    #[error("{command} failed: expected {expected}, got {code} {message}")]
    UnexpectedReply {
        /// Command that was being answered.
        command: &'static str,
        /// Code the session required.
        expected: u16,
        /// Code the server returned.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// Final authentication reply was neither 235 nor 503.
    #[error("Authentication failed {code}: {message}")]
    AuthFailed {
        /// Reply code.
        code: u16,
        /// Reply text.
        message: String,
    },

    /// Server did not announce any AUTH mechanism.
    #[error("Server does not advertise any AUTH method")]
    NoAuthMechanism,

    /// None of the advertised mechanisms is PLAIN or LOGIN.
    #[error("AUTH mechanisms not supported: {}", .0.join(", "))]
    UnsupportedMechanism(Vec<String>),

    /// Every recipient of the envelope was refused.
    #[error("All {count} recipients refused, last reply {code}: {message}")]
    AllRecipientsRefused {
        /// Number of refused recipients.
        count: usize,
        /// Code of the last refusal.
        code: u16,
        /// Text of the last refusal.
        message: String,
    },

    /// No sender override and no authenticated username to default to.
    #[error("No sender address and no username to default to")]
    MissingSender,

    /// Recipient list was empty.
    #[error("No recipients specified")]
    NoRecipients,

    /// Invalid envelope address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Action invoked in a state that does not allow it.
    #[error("Cannot {action} in state {state}")]
    InvalidState {
        /// Action that was attempted.
        action: &'static str,
        /// State the session was in.
        state: SessionState,
    },

    /// Protocol violation not tied to a reply code.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Creates an unexpected-reply error.
    #[must_use]
    pub fn unexpected(
        command: &'static str,
        expected: u16,
        code: u16,
        message: impl Into<String>,
    ) -> Self {
        Self::UnexpectedReply {
            command,
            expected,
            code,
            message: message.into(),
        }
    }

    /// Returns the server reply code carried by this error, if any.
    #[must_use]
    pub const fn reply_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedReply { code, .. }
            | Self::AuthFailed { code, .. }
            | Self::AllRecipientsRefused { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(self.reply_code(), Some(code) if code >= 500 && code < 600)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.reply_code(), Some(code) if code >= 400 && code < 500)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_and_transient() {
        let err = Error::unexpected("MAIL FROM", 250, 550, "no such user");
        assert!(err.is_permanent());
        assert!(!err.is_transient());

        let err = Error::AuthFailed {
            code: 454,
            message: "try later".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.reply_code(), Some(454));
    }

    #[test]
    fn test_transport_errors_have_no_code() {
        assert_eq!(Error::ConnectionClosed.reply_code(), None);
        assert!(!Error::Timeout(Duration::from_secs(10)).is_permanent());
    }

    #[test]
    fn test_display() {
        let err = Error::unexpected("DATA", 354, 554, "no valid recipients");
        assert_eq!(
            err.to_string(),
            "DATA failed: expected 354, got 554 no valid recipients"
        );

        let err = Error::UnsupportedMechanism(vec!["CRAM-MD5".into(), "XOAUTH2".into()]);
        assert_eq!(
            err.to_string(),
            "AUTH mechanisms not supported: CRAM-MD5, XOAUTH2"
        );

        let err = Error::InvalidState {
            action: "write",
            state: SessionState::Greeted,
        };
        assert_eq!(err.to_string(), "Cannot write in state Greeted");
    }
}
