//! Server capabilities announced in the EHLO reply.

use crate::error::{Error, Result};

/// Features parsed from the lines of an EHLO reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Raw feature lines as received (the first one is the server greeting).
    pub lines: Vec<String>,
    starttls: bool,
    auth: Option<Vec<String>>,
    size: Option<usize>,
}

impl Capabilities {
    /// Parses the feature lines of an EHLO reply.
    ///
    /// The AUTH keyword is matched case-insensitively on the first four
    /// characters, so both `AUTH PLAIN LOGIN` and the legacy `AUTH=PLAIN LOGIN`
    /// are recognised. When several AUTH lines are present the last one wins.
    #[must_use]
    pub fn from_ehlo(lines: &[String]) -> Self {
        let mut caps = Self {
            lines: lines.to_vec(),
            ..Self::default()
        };

        for line in lines {
            let keyword = line.split_whitespace().next().unwrap_or("");
            if keyword.eq_ignore_ascii_case("STARTTLS") {
                caps.starttls = true;
            } else if keyword.eq_ignore_ascii_case("SIZE") {
                caps.size = line.split_whitespace().nth(1).and_then(|s| s.parse().ok());
            }

            if line.get(..4).is_some_and(|k| k.eq_ignore_ascii_case("AUTH")) {
                let mechanisms = line[4..]
                    .trim_matches('=')
                    .to_ascii_uppercase()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();
                caps.auth = Some(mechanisms);
            }
        }

        caps
    }

    /// Returns true if the server offers STARTTLS.
    #[must_use]
    pub const fn supports_starttls(&self) -> bool {
        self.starttls
    }

    /// Returns the advertised AUTH mechanism names, upper-cased.
    ///
    /// `None` means no AUTH line was present at all.
    #[must_use]
    pub fn auth_mechanisms(&self) -> Option<&[String]> {
        self.auth.as_deref()
    }

    /// Returns the maximum message size, if advertised.
    #[must_use]
    pub const fn max_message_size(&self) -> Option<usize> {
        self.size
    }
}

/// SASL mechanisms this client can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - single base64 blob of `\0user\0password`
    Plain,
    /// LOGIN - username and password sent as separate base64 lines
    Login,
}

impl AuthMechanism {
    /// Picks a mechanism from the advertised set: PLAIN first, then LOGIN.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMechanism`] if neither is offered.
    pub fn select(advertised: &[String]) -> Result<Self> {
        let offers = |name: &str| advertised.iter().any(|m| m.eq_ignore_ascii_case(name));

        if offers("PLAIN") {
            Ok(Self::Plain)
        } else if offers("LOGIN") {
            Ok(Self::Login)
        } else {
            Err(Error::UnsupportedMechanism(advertised.to_vec()))
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::redundant_clone, clippy::manual_string_new, clippy::needless_collect, clippy::unreadable_literal, clippy::used_underscore_items, clippy::similar_names)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    mod capabilities_tests {
        use super::*;

        #[test]
        fn parse_gmail_style() {
            let caps = Capabilities::from_ehlo(&lines(&[
                "smtp.gmail.com at your service",
                "SIZE 35882577",
                "8BITMIME",
                "STARTTLS",
                "ENHANCEDSTATUSCODES",
            ]));
            assert!(caps.supports_starttls());
            assert_eq!(caps.max_message_size(), Some(35_882_577));
            assert_eq!(caps.auth_mechanisms(), None);
            assert_eq!(caps.lines.len(), 5);
        }

        #[test]
        fn parse_auth_line() {
            let caps = Capabilities::from_ehlo(&lines(&["mx.example.com", "AUTH PLAIN LOGIN"]));
            assert_eq!(
                caps.auth_mechanisms(),
                Some(&["PLAIN".to_string(), "LOGIN".to_string()][..])
            );
            assert!(!caps.supports_starttls());
        }

        #[test]
        fn parse_legacy_auth_equals() {
            let caps = Capabilities::from_ehlo(&lines(&["mx", "AUTH=LOGIN PLAIN"]));
            assert_eq!(
                caps.auth_mechanisms(),
                Some(&["LOGIN".to_string(), "PLAIN".to_string()][..])
            );
        }

        #[test]
        fn parse_auth_lowercase() {
            let caps = Capabilities::from_ehlo(&lines(&["mx", "auth login"]));
            assert_eq!(caps.auth_mechanisms(), Some(&["LOGIN".to_string()][..]));
        }

        #[test]
        fn parse_auth_without_mechanisms() {
            let caps = Capabilities::from_ehlo(&lines(&["mx", "AUTH"]));
            assert_eq!(caps.auth_mechanisms(), Some(&[][..]));
        }

        #[test]
        fn last_auth_line_wins() {
            let caps =
                Capabilities::from_ehlo(&lines(&["mx", "AUTH=LOGIN", "AUTH PLAIN CRAM-MD5"]));
            assert_eq!(
                caps.auth_mechanisms(),
                Some(&["PLAIN".to_string(), "CRAM-MD5".to_string()][..])
            );
        }

        #[test]
        fn size_without_value() {
            let caps = Capabilities::from_ehlo(&lines(&["mx", "SIZE"]));
            assert_eq!(caps.max_message_size(), None);
        }
    }

    mod auth_mechanism_tests {
        use super::*;

        #[test]
        fn plain_preferred_over_login() {
            let advertised = lines(&["LOGIN", "PLAIN"]);
            assert_eq!(AuthMechanism::select(&advertised).unwrap(), AuthMechanism::Plain);
        }

        #[test]
        fn login_when_only_login() {
            let advertised = lines(&["LOGIN"]);
            assert_eq!(AuthMechanism::select(&advertised).unwrap(), AuthMechanism::Login);
        }

        #[test]
        fn empty_set_is_unsupported() {
            let err = AuthMechanism::select(&[]).unwrap_err();
            assert!(matches!(err, Error::UnsupportedMechanism(ref m) if m.is_empty()));
        }

        #[test]
        fn unknown_only_is_unsupported() {
            let advertised = lines(&["CRAM-MD5", "XOAUTH2"]);
            let err = AuthMechanism::select(&advertised).unwrap_err();
            assert!(matches!(err, Error::UnsupportedMechanism(ref m) if m.len() == 2));
        }

        #[test]
        fn as_str() {
            assert_eq!(AuthMechanism::Plain.as_str(), "PLAIN");
            assert_eq!(AuthMechanism::Login.as_str(), "LOGIN");
        }
    }
}
