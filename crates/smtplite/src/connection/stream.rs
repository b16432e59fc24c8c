//! Byte streams the session runs over.

#![allow(clippy::missing_errors_doc)]

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use super::{Config, Security};
use crate::error::{Error, Result};

/// A connected stream that can be upgraded to TLS in place.
///
/// Implemented by [`SmtpStream`]; tests implement it for scripted mocks.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Sized {
    /// Returns true if the stream is already TLS-protected.
    fn is_tls(&self) -> bool;

    /// Wraps the same underlying connection in TLS, verifying `host`.
    fn upgrade_to_tls(self, host: &str) -> impl Future<Output = Result<Self>>;
}

/// SMTP stream (TCP or TLS).
pub enum SmtpStream {
    /// Plain TCP connection.
    Plain(TcpStream),
    /// TLS-encrypted connection (boxed to reduce enum size).
    Tls(Box<TlsStream<TcpStream>>),
}

impl std::fmt::Debug for SmtpStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("SmtpStream::Plain"),
            Self::Tls(_) => f.write_str("SmtpStream::Tls"),
        }
    }
}

impl Transport for SmtpStream {
    fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    async fn upgrade_to_tls(self, host: &str) -> Result<Self> {
        match self {
            Self::Plain(tcp) => Ok(Self::Tls(Box::new(wrap_tls(tcp, host).await?))),
            Self::Tls(_) => Err(Error::Protocol("Stream is already TLS".into())),
        }
    }
}

impl AsyncRead for SmtpStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for SmtpStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Connects to the configured relay.
///
/// With [`Security::Implicit`] the TLS handshake happens before the first
/// byte of SMTP is read. The whole connect is bounded by `config.timeout`.
pub async fn connect(config: &Config) -> Result<SmtpStream> {
    let fut = async {
        let addr = format!("{}:{}", config.host, config.port);
        let tcp = TcpStream::connect(&addr).await?;
        tracing::debug!(%addr, security = ?config.security, "TCP connected");

        let stream = match config.security {
            Security::Implicit => SmtpStream::Tls(Box::new(wrap_tls(tcp, &config.host).await?)),
            Security::None | Security::StartTls => SmtpStream::Plain(tcp),
        };
        Ok::<_, Error>(stream)
    };

    tokio::time::timeout(config.timeout, fut)
        .await
        .map_err(|_| Error::Timeout(config.timeout))?
}

async fn wrap_tls(tcp: TcpStream, host: &str) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(host.to_string())?;
    create_tls_connector()
        .connect(server_name, tcp)
        .await
        .map_err(handshake_error)
}

/// Recovers the rustls error that tokio-rustls wraps in `io::Error`.
fn handshake_error(err: io::Error) -> Error {
    let tls = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        .cloned();
    match tls {
        Some(tls) => Error::Tls(tls),
        None => Error::Io(err),
    }
}

/// Creates a TLS connector with the webpki root certificates.
fn create_tls_connector() -> TlsConnector {
    let root_store = rustls::RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
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
    use std::time::Duration;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_plain() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = Config::builder("127.0.0.1")
            .port(port)
            .security(Security::None)
            .build();
        let stream = connect(&config).await.unwrap();
        assert!(!stream.is_tls());
    }

    #[tokio::test]
    async fn test_connect_refused_is_io_error() {
        // Bind then drop to get a port nobody listens on
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let config = Config::builder("127.0.0.1")
            .port(port)
            .security(Security::None)
            .timeout(Duration::from_secs(5))
            .build();
        assert!(matches!(connect(&config).await, Err(Error::Io(_))));
    }

    #[test]
    fn test_handshake_error_keeps_rustls_error() {
        let wrapped = io::Error::new(io::ErrorKind::InvalidData, rustls::Error::DecryptError);
        assert!(matches!(handshake_error(wrapped), Error::Tls(rustls::Error::DecryptError)));

        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        assert!(matches!(handshake_error(reset), Error::Io(_)));
    }

    #[tokio::test]
    async fn test_upgrade_rejects_invalid_dns_name() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let tcp = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

        let result = SmtpStream::Plain(tcp).upgrade_to_tls("not a hostname").await;
        assert!(matches!(result, Err(Error::InvalidDnsName(_))));
    }
}
