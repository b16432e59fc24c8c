//! Session configuration types.

use std::fmt;
use std::time::Duration;

/// Deadline for connect and for every read or write.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Domain announced in EHLO when none is configured.
pub const DEFAULT_LOCAL_DOMAIN: &str = "127.0.0.1";

/// Transport security mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    /// Plain TCP, STARTTLS is never attempted. **Not recommended for production.**
    None,
    /// Start plain and upgrade with STARTTLS when the server offers it.
    #[default]
    StartTls,
    /// TLS from the first byte (port 465).
    Implicit,
}

impl Security {
    /// Returns the default submission port for this security mode.
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Self::None | Self::StartTls => 587,
            Self::Implicit => 465,
        }
    }
}

/// Username and optional password.
///
/// The username doubles as the default envelope sender.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username (usually the mailbox address).
    pub username: String,
    /// Password; without it the session does not log in on its own.
    pub password: Option<String>,
}

impl Credentials {
    /// Creates credentials with a password.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
        }
    }

    /// Creates credentials that only carry a username.
    #[must_use]
    pub fn username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

/// SMTP session configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Relay hostname, also used for TLS certificate verification.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Security mode.
    pub security: Security,
    /// Connect and per-read/write deadline.
    pub timeout: Duration,
    /// Domain sent in EHLO.
    pub local_domain: String,
    /// Credentials used at construction, if any.
    pub credentials: Option<Credentials>,
}

impl Config {
    /// Creates a configuration using STARTTLS on port 587.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self::builder(host).build()
    }

    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(host: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(host)
    }
}

/// Builder for session configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    host: String,
    port: Option<u16>,
    security: Security,
    timeout: Duration,
    local_domain: String,
    credentials: Option<Credentials>,
}

impl ConfigBuilder {
    /// Creates a new builder with the given hostname.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            security: Security::default(),
            timeout: DEFAULT_TIMEOUT,
            local_domain: DEFAULT_LOCAL_DOMAIN.to_string(),
            credentials: None,
        }
    }

    /// Sets the port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the security mode.
    #[must_use]
    pub const fn security(mut self, security: Security) -> Self {
        self.security = security;
        self
    }

    /// Sets the connect and I/O deadline.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the domain announced in EHLO.
    #[must_use]
    pub fn local_domain(mut self, domain: impl Into<String>) -> Self {
        self.local_domain = domain.into();
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> Config {
        Config {
            host: self.host,
            port: self.port.unwrap_or_else(|| self.security.default_port()),
            security: self.security,
            timeout: self.timeout,
            local_domain: self.local_domain,
            credentials: self.credentials,
        }
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
    fn test_default_ports() {
        assert_eq!(Security::None.default_port(), 587);
        assert_eq!(Security::StartTls.default_port(), 587);
        assert_eq!(Security::Implicit.default_port(), 465);
    }

    #[test]
    fn test_config_new() {
        let config = Config::new("smtp.example.com");
        assert_eq!(config.host, "smtp.example.com");
        assert_eq!(config.port, 587);
        assert_eq!(config.security, Security::StartTls);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.local_domain, "127.0.0.1");
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = Config::builder("smtp.gmail.com")
            .security(Security::Implicit)
            .timeout(Duration::from_secs(3))
            .local_domain("client.example.com")
            .credentials(Credentials::new("bob@gmail.com", "secret"))
            .build();

        assert_eq!(config.port, 465);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.local_domain, "client.example.com");
        assert_eq!(
            config.credentials.unwrap().password.as_deref(),
            Some("secret")
        );
    }

    #[test]
    fn test_explicit_port_wins() {
        let config = Config::builder("localhost")
            .security(Security::None)
            .port(2525)
            .build();
        assert_eq!(config.port, 2525);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("bob", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("bob"));
        assert!(!debug.contains("hunter2"));
        assert!(Credentials::username("bob").password.is_none());
    }
}
