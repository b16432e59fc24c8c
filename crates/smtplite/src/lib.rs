//! # smtplite
//!
//! A small SMTP submission client: one connection, one linear session.
//!
//! ## Features
//!
//! - **Explicit session state**: out-of-order calls fail fast with
//!   [`Error::InvalidState`] instead of confusing the server
//! - **Transport modes**: plain, opportunistic STARTTLS, implicit TLS (port 465)
//! - **Authentication**: PLAIN, falling back to LOGIN
//! - **Partial delivery**: refused recipients are reported, the message still
//!   goes to the accepted ones
//!
//! ## Quick Start
//!
//! ```ignore
//! use smtplite::{Config, Credentials, Security, Session};
//!
//! #[tokio::main]
//! async fn main() -> smtplite::Result<()> {
//!     let config = Config::builder("smtp.gmail.com")
//!         .security(Security::Implicit)
//!         .credentials(Credentials::new("bob@gmail.com", "app-password"))
//!         .build();
//!
//!     // Greeting, EHLO and AUTH happen here
//!     let mut session = Session::connect(config).await?;
//!
//!     session.to(["alice@gmail.com"], None).await?;
//!     session.write("From: Bob <bob@gmail.com>\r\n").await?;
//!     session.write("To: Alice <alice@gmail.com>\r\n").await?;
//!     session.write("Subject: Poem\r\n\r\n").await?;
//!     session.write("Roses are red.\r\n").await?;
//!     let reply = session.send("Violets are blue.\r\n").await?;
//!     println!("server said {reply}");
//!
//!     session.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Session States
//!
//! ```text
//! ┌───────────┐   ┌─────────┐   ┌───────────────┐   ┌──────────────┐   ┌──────────┐   ┌──────┐
//! │ Connected │──►│ Greeted │──►│ Authenticated │──►│ EnvelopeOpen │──►│ DataMode │──►│ Sent │
//! └───────────┘   └─────────┘   └───────────────┘   └──────────────┘   └──────────┘   └──────┘
//! ```
//!
//! `quit()` moves any open state to `Closed`.
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`connection`]: Line reader, streams, configuration and the session engine
//! - [`parser`]: Reply line parser
//! - [`types`]: Replies, capabilities, addresses and envelopes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod parser;
pub mod types;

pub use connection::{
    Config, ConfigBuilder, Credentials, LineReader, Security, Session, SessionState, SmtpStream,
    Transport,
};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Capabilities, Envelope, Refusal, Reply, ReplyCode};
