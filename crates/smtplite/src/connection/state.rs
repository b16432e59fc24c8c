//! Session state types.

use std::fmt;

/// Where a session is in the submission sequence.
///
/// ```text
/// Connected ─► Greeted ─► (Authenticated) ─► EnvelopeOpen ─► DataMode ─► Sent
///                 │                                                       │
///                 └──────────── quit() from any open state ─► Closed ◄────┘
/// ```
///
/// After `Sent` a new envelope may be declared on the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Stream is open, greeting not yet checked.
    #[default]
    Connected,
    /// Greeting and EHLO succeeded.
    Greeted,
    /// AUTH succeeded.
    Authenticated,
    /// `MAIL FROM` accepted, recipients being declared.
    ///
    /// A session left here by a failed envelope only allows `quit`.
    EnvelopeOpen,
    /// `DATA` accepted, body bytes may be written.
    DataMode,
    /// Terminator written and reply read.
    Sent,
    /// `QUIT` issued and stream shut down.
    Closed,
}

impl SessionState {
    /// Returns true if a new envelope may be declared.
    #[must_use]
    pub const fn can_declare_envelope(self) -> bool {
        matches!(self, Self::Greeted | Self::Authenticated | Self::Sent)
    }

    /// Returns true if AUTH may be issued.
    #[must_use]
    pub const fn can_authenticate(self) -> bool {
        matches!(self, Self::Greeted | Self::Authenticated)
    }

    /// Returns true if body data may be written.
    #[must_use]
    pub const fn in_data(self) -> bool {
        matches!(self, Self::DataMode)
    }

    /// Returns true once the session is closed.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        matches!(self, Self::Closed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
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
    fn test_default_is_connected() {
        assert_eq!(SessionState::default(), SessionState::Connected);
    }

    #[test]
    fn test_envelope_allowed_after_greeting_auth_or_send() {
        assert!(SessionState::Greeted.can_declare_envelope());
        assert!(SessionState::Authenticated.can_declare_envelope());
        assert!(SessionState::Sent.can_declare_envelope());
        assert!(!SessionState::Connected.can_declare_envelope());
        assert!(!SessionState::EnvelopeOpen.can_declare_envelope());
        assert!(!SessionState::DataMode.can_declare_envelope());
        assert!(!SessionState::Closed.can_declare_envelope());
    }

    #[test]
    fn test_authenticate_allowed() {
        assert!(SessionState::Greeted.can_authenticate());
        assert!(SessionState::Authenticated.can_authenticate());
        assert!(!SessionState::DataMode.can_authenticate());
        assert!(!SessionState::Sent.can_authenticate());
    }

    #[test]
    fn test_data_and_closed() {
        assert!(SessionState::DataMode.in_data());
        assert!(!SessionState::EnvelopeOpen.in_data());
        assert!(SessionState::Closed.is_closed());
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::DataMode.to_string(), "DataMode");
    }
}
