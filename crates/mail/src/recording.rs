//! In-memory mailer for tests.

use std::sync::{Arc, Mutex};

use crate::{MailError, Mailer};

/// One captured message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records messages instead of delivering them. Clones share the same
/// outbox, so a test can keep one handle and give another to the app.
#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    outbox: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every message sent so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    /// The most recent message sent to `to`.
    pub fn last_to(&self, to: &str) -> Option<SentMail> {
        self.sent().into_iter().rev().find(|m| m.to == to)
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let mail = SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };
        self.outbox
            .lock()
            .map_err(|_| MailError::Build("outbox lock poisoned".to_string()))?
            .push(mail);
        Ok(())
    }
}
