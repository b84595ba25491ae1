//! Output module for reporting detected changes
//!
//! This module handles:
//! - Rendering change batches for people to read
//! - Delivering batches (log or webhook)
//! - Per-cycle statistics and their observers

mod message;
pub mod stats;
mod traits;
mod webhook;

pub use message::{display_link, format_batch, format_record, BATCH_SUBJECT};
pub use stats::{CycleKind, CycleObserver, CycleStats, TracingObserver};
pub use traits::{LogNotifier, Notifier, NotifyError, NotifyResult};
pub use webhook::WebhookNotifier;

use crate::config::NotifyConfig;
use reqwest::Client;

/// Builds the notifier described by the configuration
///
/// A webhook is used when one is configured; otherwise batches only go to
/// the log.
pub fn build_notifier(config: &NotifyConfig, client: Client) -> Box<dyn Notifier> {
    match &config.webhook_url {
        Some(endpoint) => {
            tracing::info!("Delivering changes to webhook {}", endpoint);
            Box::new(WebhookNotifier::new(client, endpoint.clone()))
        }
        None => {
            tracing::info!("No webhook configured, changes will be logged");
            Box::new(LogNotifier)
        }
    }
}
