//! `smtplite-send` - submit one message read from stdin.
//!
//! Connection details come from `SMTP_*` environment variables, see
//! [`settings::Settings`]. The message on stdin should already carry its
//! headers; line endings and leading dots are fixed up before sending.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod body;
mod settings;

use anyhow::{Context, Result, bail};
use smtplite::{ReplyCode, Session};
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smtplite=debug,smtplite_send=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = Settings::from_env()?;

    let mut text = String::new();
    tokio::io::stdin()
        .read_to_string(&mut text)
        .await
        .context("failed to read message from stdin")?;
    let message = body::prepare(&text);

    info!(
        host = %settings.config.host,
        port = settings.config.port,
        recipients = settings.to.len(),
        "Sending message"
    );

    let mut session = Session::connect(settings.config)
        .await
        .context("failed to open SMTP session")?;

    let envelope = session
        .to(&settings.to, settings.from.as_deref())
        .await
        .context("server rejected the envelope")?;
    for refusal in &envelope.refused {
        warn!(recipient = %refusal.recipient, reply = %refusal.reply, "Recipient refused");
    }

    session.write(&message).await?;
    let reply = session.send("").await.context("failed to finish message")?;

    if let Err(e) = session.quit().await {
        warn!(error = %e, "QUIT failed");
    }

    if !reply.is(ReplyCode::OK) {
        bail!("message not accepted: {reply}");
    }

    info!(
        accepted = envelope.accepted.len(),
        refused = envelope.refused.len(),
        "Message accepted"
    );
    Ok(())
}
