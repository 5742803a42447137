//! Low-stock alerting.

mod monitor;
mod notifier;

pub use monitor::{LowStockMonitor, MonitorOutcome};
pub use notifier::{LogNotifier, Notifier, NotifyError, RecordingNotifier, SentMessage};
