//! Mailer that only writes messages to the log.

use crate::{MailError, Mailer};

/// Logs every message instead of sending it. Used when SMTP is not
/// configured, e.g. in local development.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(to, subject, body, "Mail not sent (SMTP not configured)");
        Ok(())
    }
}
