//! Settings read from the environment.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use smtplite::{Config, Credentials, Security};

/// Everything needed to send one message.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Session configuration for the library.
    pub config: Config,
    /// Envelope sender override (`SMTP_FROM`).
    pub from: Option<String>,
    /// Envelope recipients (`SMTP_TO`, comma separated).
    pub to: Vec<String>,
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, so tests need not touch the real environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("SMTP_HOST").context("SMTP_HOST is not set")?;

        let security = match lookup("SMTP_SECURITY").as_deref() {
            None | Some("starttls") => Security::StartTls,
            Some("tls" | "implicit") => Security::Implicit,
            Some("none" | "plain") => Security::None,
            Some(other) => bail!("SMTP_SECURITY must be none, starttls or tls, got {other:?}"),
        };

        let mut builder = Config::builder(host).security(security);

        if let Some(port) = lookup("SMTP_PORT") {
            let port = port
                .parse()
                .with_context(|| format!("SMTP_PORT is not a port number: {port:?}"))?;
            builder = builder.port(port);
        }

        if let Some(secs) = lookup("SMTP_TIMEOUT") {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("SMTP_TIMEOUT is not a number of seconds: {secs:?}"))?;
            builder = builder.timeout(Duration::from_secs(secs));
        }

        if let Some(domain) = lookup("SMTP_LOCAL_DOMAIN") {
            builder = builder.local_domain(domain);
        }

        if let Some(username) = lookup("SMTP_USERNAME") {
            let credentials = match lookup("SMTP_PASSWORD") {
                Some(password) => Credentials::new(username, password),
                None => Credentials::username(username),
            };
            builder = builder.credentials(credentials);
        }

        let to: Vec<String> = lookup("SMTP_TO")
            .context("SMTP_TO is not set")?
            .split(',')
            .map(str::trim)
            .filter(|addr| !addr.is_empty())
            .map(str::to_string)
            .collect();
        if to.is_empty() {
            bail!("SMTP_TO lists no recipients");
        }

        Ok(Self {
            config: builder.build(),
            from: lookup("SMTP_FROM"),
            to,
        })
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
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_minimal() {
        let s = settings(&[("SMTP_HOST", "smtp.example.com"), ("SMTP_TO", "a@x")]).unwrap();
        assert_eq!(s.config.host, "smtp.example.com");
        assert_eq!(s.config.port, 587);
        assert_eq!(s.config.security, Security::StartTls);
        assert_eq!(s.to, vec!["a@x"]);
        assert!(s.from.is_none());
        assert!(s.config.credentials.is_none());
    }

    #[test]
    fn test_full() {
        let s = settings(&[
            ("SMTP_HOST", "smtp.gmail.com"),
            ("SMTP_SECURITY", "tls"),
            ("SMTP_USERNAME", "bob@gmail.com"),
            ("SMTP_PASSWORD", "pw"),
            ("SMTP_TO", "alice@gmail.com, carol@gmail.com,"),
            ("SMTP_FROM", "noreply@gmail.com"),
            ("SMTP_TIMEOUT", "30"),
            ("SMTP_LOCAL_DOMAIN", "laptop.local"),
        ])
        .unwrap();
        assert_eq!(s.config.port, 465);
        assert_eq!(s.config.timeout, Duration::from_secs(30));
        assert_eq!(s.config.local_domain, "laptop.local");
        assert_eq!(s.to, vec!["alice@gmail.com", "carol@gmail.com"]);
        assert_eq!(s.from.as_deref(), Some("noreply@gmail.com"));
        assert_eq!(
            s.config.credentials.unwrap().password.as_deref(),
            Some("pw")
        );
    }

    #[test]
    fn test_username_only() {
        let s = settings(&[
            ("SMTP_HOST", "h"),
            ("SMTP_TO", "a@x"),
            ("SMTP_USERNAME", "bob"),
        ])
        .unwrap();
        assert!(s.config.credentials.unwrap().password.is_none());
    }

    #[test]
    fn test_missing_host() {
        let err = settings(&[("SMTP_TO", "a@x")]).unwrap_err();
        assert!(err.to_string().contains("SMTP_HOST"));
    }

    #[test]
    fn test_bad_port_and_security() {
        assert!(settings(&[("SMTP_HOST", "h"), ("SMTP_TO", "a@x"), ("SMTP_PORT", "x")]).is_err());
        assert!(
            settings(&[("SMTP_HOST", "h"), ("SMTP_TO", "a@x"), ("SMTP_SECURITY", "ssl3")]).is_err()
        );
    }

    #[test]
    fn test_empty_recipient_list() {
        assert!(settings(&[("SMTP_HOST", "h"), ("SMTP_TO", " , ")]).is_err());
    }
}
