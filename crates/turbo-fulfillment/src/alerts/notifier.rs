//! Notification delivery.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::info;

/// Delivery failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Recipient rejected: {0}")]
    Rejected(String),

    #[error("Delivery channel unavailable: {0}")]
    Unavailable(String),
}

/// Outbound message channel (email, chat, pager...).
pub trait Notifier: Send + Sync {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Writes alerts to the log instead of delivering them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        info!(%recipient, %subject, %body, "notification");
        Ok(())
    }
}

/// A message captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

/// Keeps every message in memory. Can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failing: Mutex<Option<NotifyError>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following send fail with `error`.
    pub fn fail_with(&self, error: NotifyError) {
        *self.failing.lock() = Some(error);
    }

    /// Deliver normally again.
    pub fn recover(&self) {
        *self.failing.lock() = None;
    }

    /// Messages delivered so far.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        if let Some(err) = self.failing.lock().clone() {
            return Err(err);
        }
        self.sent.lock().push(SentMessage {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
