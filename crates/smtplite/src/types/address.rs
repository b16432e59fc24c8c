//! Envelope address and transaction types.

use crate::error::{Error, Result};
use crate::types::Reply;

/// Address used in `MAIL FROM` or `RCPT TO`.
///
/// Only checked for things that would corrupt the command line: the address
/// must be non-empty and must not contain CR, LF or angle brackets. Local
/// mailbox names without a domain (e.g. `postmaster`) are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    /// Creates a new address from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is empty or contains forbidden characters.
    pub fn new(addr: impl Into<String>) -> Result<Self> {
        let addr = addr.into();
        Self::validate(&addr)?;
        Ok(Self(addr))
    }

    /// Returns the address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(addr: &str) -> Result<()> {
        if addr.trim().is_empty() {
            return Err(Error::InvalidAddress("Address cannot be empty".into()));
        }

        if let Some(c) = addr.chars().find(|c| matches!(c, '\r' | '\n' | '<' | '>')) {
            return Err(Error::InvalidAddress(format!(
                "{addr:?} contains forbidden character {c:?}"
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A recipient the server did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    /// Recipient address.
    pub recipient: Address,
    /// Server reply to its `RCPT TO`.
    pub reply: Reply,
}

/// Outcome of declaring one message envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Sender given in `MAIL FROM`.
    pub sender: Address,
    /// Recipients answered with 250 or 251.
    pub accepted: Vec<Address>,
    /// Recipients answered with anything else.
    pub refused: Vec<Refusal>,
    /// Reply to `DATA` (always 354).
    pub data_reply: Reply,
}

impl Envelope {
    /// Returns true if at least one recipient was refused.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.refused.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;
    use crate::types::ReplyCode;

    #[test]
    fn test_valid_address() {
        let addr = Address::new("user@example.com").unwrap();
        assert_eq!(addr.as_str(), "user@example.com");
        assert_eq!(addr.to_string(), "user@example.com");
    }

    #[test]
    fn test_local_mailbox_allowed() {
        assert!(Address::new("postmaster").is_ok());
    }

    #[test]
    fn test_invalid_address_empty() {
        assert!(Address::new("").is_err());
        assert!(Address::new("   ").is_err());
    }

    #[test]
    fn test_invalid_address_crlf_injection() {
        let err = Address::new("a@x\r\nRCPT TO: <evil@x>").unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)));
    }

    #[test]
    fn test_invalid_address_brackets() {
        assert!(Address::new("<a@x>").is_err());
    }

    #[test]
    fn test_envelope_partial() {
        let ok = Reply::new(ReplyCode::START_DATA, vec!["go".to_string()]);
        let mut envelope = Envelope {
            sender: Address::new("me@x").unwrap(),
            accepted: vec![Address::new("b@x").unwrap()],
            refused: Vec::new(),
            data_reply: ok,
        };
        assert!(!envelope.is_partial());

        envelope.refused.push(Refusal {
            recipient: Address::new("a@x").unwrap(),
            reply: Reply::new(ReplyCode::MAILBOX_UNAVAILABLE, vec!["no".to_string()]),
        });
        assert!(envelope.is_partial());
    }
}
