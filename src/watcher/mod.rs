//! Watcher module - the polling engine
//!
//! This module contains the core polling logic, including:
//! - HTTP fetching with a hard timeout
//! - Link extraction from fetched HTML
//! - Bounded-concurrency scheduling of one cycle's fetches
//! - The monitor that builds baselines and runs check cycles

mod fetcher;
mod monitor;
mod parser;
mod scheduler;

pub use fetcher::{build_http_client, FetchError, FetchResult, HttpFetcher, PageFetcher};
pub use monitor::{ChangeRecord, Monitor};
pub use parser::extract_links;
pub use scheduler::{CycleFetches, FetchRequest, Scheduler};

use crate::config::{Config, PageEntry};
use crate::output::Notifier;
use tokio_util::sync::CancellationToken;

/// Builds a baseline for `entries` and polls them until `cancel` fires
///
/// This is the main entry point for a watch run. Cancelling while the
/// baseline is still being built stops right away.
///
/// # Returns
///
/// The number of check cycles completed
pub async fn watch(
    config: &Config,
    entries: &[PageEntry],
    notifier: &dyn Notifier,
    cancel: &CancellationToken,
) -> crate::Result<u64> {
    let mut monitor = Monitor::from_config(config)?;

    let monitored = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::info!("Shutdown requested while building the baseline");
            return Ok(0);
        }
        count = monitor.build_baseline(entries) => count,
    };
    tracing::info!("Baseline ready, watching {} pages", monitored);

    Ok(monitor.run(notifier, cancel).await)
}
