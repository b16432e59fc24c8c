//! SMTP connection management.

mod config;
mod line;
mod session;
mod state;
mod stream;

pub use config::{
    Config, ConfigBuilder, Credentials, DEFAULT_LOCAL_DOMAIN, DEFAULT_TIMEOUT, Security,
};
pub use line::{LineReader, MAX_LINE_LENGTH};
pub use session::Session;
pub use state::SessionState;
pub use stream::{SmtpStream, Transport, connect};
