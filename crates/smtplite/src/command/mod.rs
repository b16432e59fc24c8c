//! SMTP command builder.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::types::{Address, AuthMechanism};

/// SMTP command as written on the wire.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// EHLO - Extended greeting
    Ehlo {
        /// Local domain announced to the server
        domain: String,
    },
    /// STARTTLS - Upgrade to TLS
    StartTls,
    /// AUTH - Begin authentication with an initial response
    Auth {
        /// Authentication mechanism
        mechanism: AuthMechanism,
        /// Base64 initial response
        initial_response: String,
    },
    /// Bare base64 line answering a 334 challenge
    AuthResponse(String),
    /// MAIL FROM - Start mail transaction
    MailFrom(Address),
    /// RCPT TO - Add recipient
    RcptTo(Address),
    /// DATA - Begin message data
    Data,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Builds `AUTH PLAIN` with the `\0username\0password` blob.
    #[must_use]
    pub fn auth_plain(username: &str, password: &str) -> Self {
        let blob = format!("\0{username}\0{password}");
        Self::Auth {
            mechanism: AuthMechanism::Plain,
            initial_response: STANDARD.encode(blob.as_bytes()),
        }
    }

    /// Builds `AUTH LOGIN` carrying the base64 username.
    #[must_use]
    pub fn auth_login(username: &str) -> Self {
        Self::Auth {
            mechanism: AuthMechanism::Login,
            initial_response: STANDARD.encode(username.as_bytes()),
        }
    }

    /// Builds the bare base64 password line sent after `AUTH LOGIN`.
    #[must_use]
    pub fn login_password(password: &str) -> Self {
        Self::AuthResponse(STANDARD.encode(password.as_bytes()))
    }

    /// Short name used in errors and logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Ehlo { .. } => "EHLO",
            Self::StartTls => "STARTTLS",
            Self::Auth { .. } | Self::AuthResponse(_) => "AUTH",
            Self::MailFrom(_) => "MAIL FROM",
            Self::RcptTo(_) => "RCPT TO",
            Self::Data => "DATA",
            Self::Quit => "QUIT",
        }
    }

    /// Serializes the command to bytes, CRLF included.
    #[must_use]
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();

        match self {
            Self::Ehlo { domain } => {
                buf.extend_from_slice(b"EHLO ");
                buf.extend_from_slice(domain.as_bytes());
            }
            Self::StartTls => {
                buf.extend_from_slice(b"STARTTLS");
            }
            Self::Auth {
                mechanism,
                initial_response,
            } => {
                buf.extend_from_slice(b"AUTH ");
                buf.extend_from_slice(mechanism.as_str().as_bytes());
                buf.push(b' ');
                buf.extend_from_slice(initial_response.as_bytes());
            }
            Self::AuthResponse(response) => {
                buf.extend_from_slice(response.as_bytes());
            }
            Self::MailFrom(from) => {
                buf.extend_from_slice(b"MAIL FROM: <");
                buf.extend_from_slice(from.as_str().as_bytes());
                buf.push(b'>');
            }
            Self::RcptTo(to) => {
                buf.extend_from_slice(b"RCPT TO: <");
                buf.extend_from_slice(to.as_str().as_bytes());
                buf.push(b'>');
            }
            Self::Data => {
                buf.extend_from_slice(b"DATA");
            }
            Self::Quit => {
                buf.extend_from_slice(b"QUIT");
            }
        }

        buf.extend_from_slice(b"\r\n");
        buf
    }
}

/// Credentials are masked so commands can be logged.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ehlo { domain } => write!(f, "EHLO {domain}"),
            Self::Auth { mechanism, .. } => write!(f, "AUTH {} ****", mechanism.as_str()),
            Self::AuthResponse(_) => f.write_str("****"),
            Self::MailFrom(from) => write!(f, "MAIL FROM: <{from}>"),
            Self::RcptTo(to) => write!(f, "RCPT TO: <{to}>"),
            Self::StartTls | Self::Data | Self::Quit => f.write_str(self.name()),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command({self})")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    #[test]
    fn test_ehlo_command() {
        let cmd = Command::Ehlo {
            domain: "127.0.0.1".to_string(),
        };
        assert_eq!(cmd.serialize(), b"EHLO 127.0.0.1\r\n");
    }

    #[test]
    fn test_starttls_command() {
        assert_eq!(Command::StartTls.serialize(), b"STARTTLS\r\n");
    }

    #[test]
    fn test_auth_plain() {
        let cmd = Command::auth_plain("user", "pass");
        assert_eq!(cmd.serialize(), b"AUTH PLAIN AHVzZXIAcGFzcw==\r\n");
    }

    #[test]
    fn test_auth_login_two_steps() {
        assert_eq!(
            Command::auth_login("user").serialize(),
            b"AUTH LOGIN dXNlcg==\r\n"
        );
        assert_eq!(Command::login_password("pass").serialize(), b"cGFzcw==\r\n");
    }

    #[test]
    fn test_mail_from() {
        let cmd = Command::MailFrom(Address::new("sender@example.com").unwrap());
        assert_eq!(cmd.serialize(), b"MAIL FROM: <sender@example.com>\r\n");
    }

    #[test]
    fn test_rcpt_to_command() {
        let cmd = Command::RcptTo(Address::new("recipient@example.com").unwrap());
        assert_eq!(cmd.serialize(), b"RCPT TO: <recipient@example.com>\r\n");
    }

    #[test]
    fn test_data_and_quit() {
        assert_eq!(Command::Data.serialize(), b"DATA\r\n");
        assert_eq!(Command::Quit.serialize(), b"QUIT\r\n");
    }

    #[test]
    fn test_display_masks_credentials() {
        let cmd = Command::auth_plain("user", "hunter2");
        assert_eq!(cmd.to_string(), "AUTH PLAIN ****");
        assert_eq!(Command::login_password("hunter2").to_string(), "****");
        assert!(!format!("{cmd:?}").contains("AHVzZXI"));
    }

    #[test]
    fn test_name() {
        assert_eq!(Command::login_password("x").name(), "AUTH");
        assert_eq!(
            Command::RcptTo(Address::new("a@x").unwrap()).name(),
            "RCPT TO"
        );
    }
}
