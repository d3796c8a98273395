//! Outgoing mail for account confirmation.
//!
//! Handlers talk to a [`Mailer`] trait object. Production uses
//! [`SmtpMailer`] when `SMTP_HOST` is configured and [`LogMailer`]
//! otherwise; tests use [`RecordingMailer`] to read back what was sent.

pub mod log;
pub mod recording;
pub mod smtp;

pub use log::LogMailer;
pub use recording::{RecordingMailer, SentMail};
pub use smtp::{MailConfig, MailError, SmtpMailer};

/// A plain-text mail transport.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message to a single recipient.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
