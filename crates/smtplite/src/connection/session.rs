//! SMTP session engine.
//!
//! A [`Session`] owns one connection and walks it through a single linear
//! submission: greeting, EHLO, optional STARTTLS and AUTH, envelope, body,
//! terminator, QUIT. Every action checks the [`SessionState`] first and fails
//! with [`Error::InvalidState`] before touching the network when called out of
//! order.

use std::time::Duration;

use tokio::io::AsyncWriteExt;

use super::line::LineReader;
use super::stream::{SmtpStream, Transport, connect};
use super::{Config, Credentials, Security, SessionState};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{parse_reply, parse_reply_line};
use crate::types::{Address, AuthMechanism, Capabilities, Envelope, Refusal, Reply, ReplyCode};

/// End-of-data marker written after the body.
const END_OF_DATA: &[u8] = b"\r\n.\r\n";

/// One SMTP submission session over an owned stream.
#[derive(Debug)]
pub struct Session<S> {
    reader: LineReader<S>,
    state: SessionState,
    host: String,
    local_domain: String,
    security: Security,
    timeout: Duration,
    username: Option<String>,
    capabilities: Capabilities,
}

impl Session<SmtpStream> {
    /// Connects to the relay described by `config` and runs the handshake.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection, the handshake or the automatic
    /// login fails.
    pub async fn connect(config: Config) -> Result<Self> {
        let stream = connect(&config).await?;
        Self::from_stream(stream, config).await
    }
}

impl<S: Transport> Session<S> {
    /// Runs the handshake over an already connected stream.
    ///
    /// Checks the 220 greeting, sends EHLO, upgrades with STARTTLS when the
    /// security mode asks for it and the server offers it, then logs in if
    /// `config.credentials` carries a password.
    ///
    /// # Errors
    ///
    /// Returns an error if any handshake step gets an unexpected reply or the
    /// stream fails.
    pub async fn from_stream(stream: S, config: Config) -> Result<Self> {
        let Config {
            host,
            security,
            timeout,
            local_domain,
            credentials,
            ..
        } = config;

        let mut session = Self {
            reader: LineReader::new(stream),
            state: SessionState::Connected,
            host,
            local_domain,
            security,
            timeout,
            username: credentials.as_ref().map(|c| c.username.clone()),
            capabilities: Capabilities::default(),
        };

        let greeting = session.read_reply().await?;
        if !greeting.is(ReplyCode::SERVICE_READY) {
            return Err(Error::unexpected(
                "greeting",
                ReplyCode::SERVICE_READY.as_u16(),
                greeting.code.as_u16(),
                greeting.message_text(),
            ));
        }
        tracing::info!(host = %session.host, greeting = greeting.last_line(), "connected");

        session.ehlo().await?;

        if session.security == Security::StartTls && !session.is_tls() {
            if session.capabilities.supports_starttls() {
                session = session.starttls().await?;
            } else {
                tracing::warn!(
                    host = %session.host,
                    "STARTTLS not offered, continuing in plain text"
                );
            }
        }
        session.state = SessionState::Greeted;

        if let Some(Credentials {
            username,
            password: Some(password),
        }) = credentials
        {
            session.login(&username, &password).await?;
        }

        Ok(session)
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the features from the most recent EHLO.
    #[must_use]
    pub const fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Returns the username that serves as default sender, if known.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns true if the stream is TLS-protected.
    #[must_use]
    pub fn is_tls(&self) -> bool {
        self.reader.get_ref().is_tls()
    }

    /// Authenticates with PLAIN, or LOGIN when PLAIN is not offered.
    ///
    /// EHLO is re-issued first to refresh the mechanism list. A final 503
    /// (already authenticated) counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoAuthMechanism`] or [`Error::UnsupportedMechanism`]
    /// before any credential is sent, [`Error::AuthFailed`] if the server
    /// rejects the credentials.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<Reply> {
        self.ensure("authenticate", self.state.can_authenticate())?;
        self.username = Some(username.to_string());

        self.ehlo().await?;
        let mechanism = AuthMechanism::select(
            self.capabilities
                .auth_mechanisms()
                .ok_or(Error::NoAuthMechanism)?,
        )?;

        let reply = match mechanism {
            AuthMechanism::Plain => self.command(Command::auth_plain(username, password)).await?,
            AuthMechanism::Login => {
                self.expect(Command::auth_login(username), ReplyCode::AUTH_CONTINUE)
                    .await?;
                self.command(Command::login_password(password)).await?
            }
        };

        if !(reply.is(ReplyCode::AUTH_SUCCESS) || reply.is(ReplyCode::BAD_SEQUENCE)) {
            return Err(Error::AuthFailed {
                code: reply.code.as_u16(),
                message: reply.message_text(),
            });
        }

        tracing::info!(mechanism = mechanism.as_str(), username, "authenticated");
        self.state = SessionState::Authenticated;
        Ok(reply)
    }

    /// Declares the envelope and enters data mode.
    ///
    /// The sender defaults to the username. Each refused recipient is logged
    /// and reported in [`Envelope::refused`]; the transaction only fails when
    /// every recipient is refused.
    ///
    /// ```ignore
    /// session.to(["alice@example.com"], None).await?;
    /// session.to(vec!["a@example.com", "b@example.com"], Some("noreply@example.com")).await?;
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a caller error ([`Error::MissingSender`],
    /// [`Error::NoRecipients`], [`Error::InvalidAddress`]) before anything is
    /// sent, [`Error::UnexpectedReply`] if `MAIL FROM` or `DATA` is rejected,
    /// and [`Error::AllRecipientsRefused`] if no recipient was accepted.
    pub async fn to<I, A>(&mut self, recipients: I, sender: Option<&str>) -> Result<Envelope>
    where
        I: IntoIterator<Item = A>,
        A: AsRef<str>,
    {
        self.ensure("declare envelope", self.state.can_declare_envelope())?;

        let sender = Address::new(
            sender
                .or(self.username.as_deref())
                .ok_or(Error::MissingSender)?,
        )?;
        let recipients = recipients
            .into_iter()
            .map(|r| Address::new(r.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if recipients.is_empty() {
            return Err(Error::NoRecipients);
        }

        self.expect(Command::MailFrom(sender.clone()), ReplyCode::OK)
            .await?;
        self.state = SessionState::EnvelopeOpen;

        let total = recipients.len();
        let mut accepted = Vec::with_capacity(total);
        let mut refused = Vec::new();
        for recipient in recipients {
            let reply = self.command(Command::RcptTo(recipient.clone())).await?;
            if reply.is(ReplyCode::OK) || reply.is(ReplyCode::FORWARD) {
                accepted.push(recipient);
            } else {
                tracing::warn!(
                    %recipient,
                    code = reply.code.as_u16(),
                    reply = %reply.message_text(),
                    "recipient refused"
                );
                refused.push(Refusal { recipient, reply });
            }
        }

        if accepted.is_empty() {
            let (code, message) = refused
                .last()
                .map(|r| (r.reply.code.as_u16(), r.reply.message_text()))
                .unwrap_or_default();
            return Err(Error::AllRecipientsRefused {
                count: total,
                code,
                message,
            });
        }

        let data_reply = self.expect(Command::Data, ReplyCode::START_DATA).await?;
        self.state = SessionState::DataMode;

        Ok(Envelope {
            sender,
            accepted,
            refused,
            data_reply,
        })
    }

    /// Writes body bytes verbatim.
    ///
    /// No line-ending translation or dot-stuffing is done: callers must use
    /// CRLF line endings and must not start a line with a bare `.`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] outside data mode, or a transport error.
    pub async fn write(&mut self, content: impl AsRef<[u8]>) -> Result<()> {
        self.ensure("write body", self.state.in_data())?;
        self.write_all(content.as_ref()).await
    }

    /// Writes an optional last chunk and the `\r\n.\r\n` terminator, then
    /// returns the server reply without interpreting it.
    ///
    /// Pass an empty slice when there is nothing left to write. The caller is
    /// responsible for checking the returned code.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidState`] outside data mode, or a transport error.
    pub async fn send(&mut self, content: impl AsRef<[u8]>) -> Result<Reply> {
        self.ensure("send", self.state.in_data())?;

        let content = content.as_ref();
        if !content.is_empty() {
            self.write_all(content).await?;
        }
        self.write_all(END_OF_DATA).await?;

        let reply = self.read_reply().await?;
        self.state = SessionState::Sent;
        tracing::info!(
            code = reply.code.as_u16(),
            reply = %reply.message_text(),
            "message submitted"
        );
        Ok(reply)
    }

    /// Sends QUIT and shuts down the write half of the stream, whatever the
    /// reply.
    ///
    /// The socket itself is released when the `Session` is dropped. Every
    /// later call, including a second `quit`, fails with
    /// [`Error::InvalidState`] without touching the stream.
    ///
    /// # Errors
    ///
    /// Returns the transport error if QUIT could not be sent or its reply
    /// could not be read. The stream is shut down in either case.
    pub async fn quit(&mut self) -> Result<Reply> {
        self.ensure("quit", !self.state.is_closed())?;

        let reply = self.command(Command::Quit).await;
        self.state = SessionState::Closed;

        let deadline = self.timeout;
        match tokio::time::timeout(deadline, self.reader.get_mut().shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!(error = %e, "shutdown after QUIT failed"),
            Err(_) => tracing::debug!(?deadline, "shutdown after QUIT timed out"),
        }

        reply
    }

    /// Sends EHLO and replaces the stored capabilities.
    async fn ehlo(&mut self) -> Result<Reply> {
        let cmd = Command::Ehlo {
            domain: self.local_domain.clone(),
        };
        let reply = self.expect(cmd, ReplyCode::OK).await?;
        self.capabilities = Capabilities::from_ehlo(&reply.message);
        Ok(reply)
    }

    /// Issues STARTTLS and rewraps the same connection in TLS.
    async fn starttls(mut self) -> Result<Self> {
        self.expect(Command::StartTls, ReplyCode::SERVICE_READY)
            .await?;

        // Anything already buffered arrived in plain text and must not be
        // treated as part of the encrypted session.
        if self.reader.buffered() > 0 {
            return Err(Error::Protocol(format!(
                "{} bytes received after STARTTLS reply",
                self.reader.buffered()
            )));
        }

        let deadline = self.timeout;
        let stream = self.reader.into_inner();
        let tls = tokio::time::timeout(deadline, stream.upgrade_to_tls(&self.host))
            .await
            .map_err(|_| Error::Timeout(deadline))??;
        tracing::info!(host = %self.host, "upgraded to TLS");

        Ok(Self {
            reader: LineReader::new(tls),
            ..self
        })
    }

    /// Sends a command and checks the reply code.
    async fn expect(&mut self, cmd: Command, expected: ReplyCode) -> Result<Reply> {
        let name = cmd.name();
        let reply = self.command(cmd).await?;
        if reply.is(expected) {
            Ok(reply)
        } else {
            Err(Error::unexpected(
                name,
                expected.as_u16(),
                reply.code.as_u16(),
                reply.message_text(),
            ))
        }
    }

    /// Writes one command and reads its complete reply.
    async fn command(&mut self, cmd: Command) -> Result<Reply> {
        tracing::debug!(command = %cmd, "C:");
        self.write_all(&cmd.serialize()).await?;
        self.read_reply().await
    }

    /// Reads lines until one without the `-` continuation marker.
    async fn read_reply(&mut self) -> Result<Reply> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line().await?;
            if line.is_empty() {
                return Err(if self.reader.is_eof() {
                    Error::ConnectionClosed
                } else {
                    Error::MalformedReply("empty line".into())
                });
            }

            let last = parse_reply_line(&line)?.last;
            lines.push(line);
            if last {
                break;
            }
        }

        let reply = parse_reply(&lines)?;
        tracing::debug!(%reply, "S:");
        Ok(reply)
    }

    async fn read_line(&mut self) -> Result<Vec<u8>> {
        let deadline = self.timeout;
        tokio::time::timeout(deadline, self.reader.read_line())
            .await
            .map_err(|_| Error::Timeout(deadline))?
    }

    async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let deadline = self.timeout;
        let stream = self.reader.get_mut();
        tokio::time::timeout(deadline, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await
        .map_err(|_| Error::Timeout(deadline))??;
        Ok(())
    }

    const fn ensure(&self, action: &'static str, allowed: bool) -> Result<()> {
        if allowed {
            Ok(())
        } else {
            Err(Error::InvalidState {
                action,
                state: self.state,
            })
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
    use tokio_test::io::{Builder, Mock};

    impl Transport for Mock {
        fn is_tls(&self) -> bool {
            false
        }

        async fn upgrade_to_tls(self, _host: &str) -> Result<Self> {
            Ok(self)
        }
    }

    fn config(security: Security) -> Config {
        Config::builder("mx.test")
            .security(security)
            .local_domain("client.test")
            .build()
    }

    const GREETING: &[u8] = b"220 mx.test ESMTP ready\r\n";
    const EHLO: &[u8] = b"EHLO client.test\r\n";

    #[tokio::test]
    async fn test_handshake_plain() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\n250-SIZE 1000\r\n250 8BITMIME\r\n")
            .build();

        let session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Greeted);
        assert_eq!(session.capabilities().max_message_size(), Some(1000));
        assert_eq!(session.username(), None);
    }

    #[tokio::test]
    async fn test_multiline_reply_split_across_reads() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\n250-SI")
            .read(b"ZE 5\r\n")
            .read(b"250 HELP\r\n")
            .build();

        let session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();
        assert_eq!(session.capabilities().lines, ["mx.test", "SIZE 5", "HELP"]);
    }

    #[tokio::test]
    async fn test_malformed_continuation_line() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\nxyz broken\r\n")
            .build();

        let err = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedReply(ref line) if line == "xyz broken"));
    }

    #[tokio::test]
    async fn test_greeting_must_be_220() {
        let mock = Builder::new().read(b"554 go away\r\n").build();

        let err = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedReply {
                command: "greeting",
                code: 554,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_ehlo_must_be_250() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"502 not implemented\r\n")
            .build();

        let err = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedReply {
                command: "EHLO",
                expected: 250,
                code: 502,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_closed_before_greeting() {
        let mock = Builder::new().build();

        let err = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_starttls_when_offered() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\n250 STARTTLS\r\n")
            .write(b"STARTTLS\r\n")
            .read(b"220 go ahead\r\n")
            .build();

        let session = Session::from_stream(mock, config(Security::StartTls))
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Greeted);
    }

    #[tokio::test]
    async fn test_starttls_skipped_when_not_offered() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .build();

        let session = Session::from_stream(mock, config(Security::StartTls))
            .await
            .unwrap();
        assert_eq!(session.state(), SessionState::Greeted);
    }

    #[tokio::test]
    async fn test_starttls_never_in_plain_mode() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\n250 STARTTLS\r\n")
            .build();

        assert!(
            Session::from_stream(mock, config(Security::None))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_starttls_refused() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\n250 STARTTLS\r\n")
            .write(b"STARTTLS\r\n")
            .read(b"454 TLS not available\r\n")
            .build();

        let err = Session::from_stream(mock, config(Security::StartTls))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedReply {
                command: "STARTTLS",
                code: 454,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_starttls_rejects_injected_plaintext() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250-mx.test\r\n250 STARTTLS\r\n")
            .write(b"STARTTLS\r\n")
            .read(b"220 go ahead\r\n250 injected\r\n")
            .build();

        let err = Session::from_stream(mock, config(Security::StartTls))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_write_outside_data_mode() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let err = session.write("Subject: hi\r\n").await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                state: SessionState::Greeted,
                ..
            }
        ));
        assert!(session.send("").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_sender_is_caller_error() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let err = session.to(["a@x"], None).await.unwrap_err();
        assert!(matches!(err, Error::MissingSender));
        assert_eq!(session.state(), SessionState::Greeted);
    }

    #[tokio::test]
    async fn test_empty_recipients_is_caller_error() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let none: [&str; 0] = [];
        let err = session.to(none, Some("me@x")).await.unwrap_err();
        assert!(matches!(err, Error::NoRecipients));
    }

    #[tokio::test]
    async fn test_username_without_password_is_default_sender() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .write(b"MAIL FROM: <bob@x>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO: <alice@x>\r\n")
            .read(b"250 OK\r\n")
            .write(b"DATA\r\n")
            .read(b"354 go ahead\r\n")
            .build();

        let config = Config::builder("mx.test")
            .security(Security::None)
            .local_domain("client.test")
            .credentials(Credentials::username("bob@x"))
            .build();
        let mut session = Session::from_stream(mock, config).await.unwrap();

        let envelope = session.to(["alice@x"], None).await.unwrap();
        assert_eq!(envelope.sender.as_str(), "bob@x");
        assert_eq!(session.state(), SessionState::DataMode);
    }

    #[tokio::test]
    async fn test_mail_from_rejected() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .write(b"MAIL FROM: <me@x>\r\n")
            .read(b"553 sender not allowed\r\n")
            .write(b"MAIL FROM: <other@x>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO: <a@x>\r\n")
            .read(b"250 OK\r\n")
            .write(b"DATA\r\n")
            .read(b"354 go ahead\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let err = session.to(["a@x"], Some("me@x")).await.unwrap_err();
        assert!(err.is_permanent());
        assert!(matches!(
            err,
            Error::UnexpectedReply {
                command: "MAIL FROM",
                ..
            }
        ));
        assert_eq!(session.state(), SessionState::Greeted);

        // A different sender can be tried on the same session
        let envelope = session.to(["a@x"], Some("other@x")).await.unwrap();
        assert_eq!(envelope.accepted.len(), 1);
        assert_eq!(session.state(), SessionState::DataMode);
    }

    #[tokio::test]
    async fn test_data_rejected() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .write(b"MAIL FROM: <me@x>\r\n")
            .read(b"250 OK\r\n")
            .write(b"RCPT TO: <a@x>\r\n")
            .read(b"251 will forward\r\n")
            .write(b"DATA\r\n")
            .read(b"451 try later\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let err = session.to(["a@x"], Some("me@x")).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(session.state(), SessionState::EnvelopeOpen);
        assert!(session.write("x").await.is_err());
    }

    #[tokio::test]
    async fn test_quit_twice() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 bye\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let reply = session.quit().await.unwrap();
        assert_eq!(reply.code, ReplyCode::CLOSING);
        assert_eq!(session.state(), SessionState::Closed);

        let err = session.quit().await.unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState {
                action: "quit",
                state: SessionState::Closed
            }
        ));
    }

    #[tokio::test]
    async fn test_quit_closes_even_if_server_hangs_up() {
        let mock = Builder::new()
            .read(GREETING)
            .write(EHLO)
            .read(b"250 mx.test\r\n")
            .write(b"QUIT\r\n")
            .build();
        let mut session = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap();

        let err = session.quit().await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed));
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_empty_reply_line_is_malformed() {
        let mock = Builder::new().read(b"\r\n").build();

        let err = Session::from_stream(mock, config(Security::None))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
    }
}
