//! Notifier trait and error types
//!
//! A notifier receives every non-empty batch of change records produced by a
//! check cycle. Delivery failures stay local to the notifier: the monitor logs
//! them and keeps polling.

use crate::output::message::format_batch;
use crate::watcher::ChangeRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while delivering a batch
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Failed to deliver notification: {0}")]
    Delivery(String),

    #[error("Notification endpoint answered HTTP {0}")]
    Status(u16),
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Trait for change notifiers
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one cycle's change records
    ///
    /// Only called with a non-empty batch.
    async fn notify(&self, records: &[ChangeRecord]) -> NotifyResult<()>;
}

/// Notifier that writes each batch to the log
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, records: &[ChangeRecord]) -> NotifyResult<()> {
        let links: usize = records.iter().map(|r| r.new_links.len()).sum();
        tracing::info!(
            pages = records.len(),
            links,
            "Changes detected\n{}",
            format_batch(records)
        );
        Ok(())
    }
}
