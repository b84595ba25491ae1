//! Monitor - the polling cycle controller
//!
//! The monitor owns every monitored page and drives the two phases of a
//! watcher's life:
//! - Baseline construction: one trusted fetch per page, then a number of
//!   warm-up cycles whose changes are thrown away so rotating banners and ad
//!   slots are learned before anything is reported
//! - Checking: an unbounded sequence of cycles, each returning the pages that
//!   gained links since the previous one

use crate::config::{Config, MonitorConfig, PageEntry};
use crate::output::{CycleKind, CycleObserver, CycleStats, Notifier, TracingObserver};
use crate::state::Page;
use crate::watcher::fetcher::{HttpFetcher, PageFetcher};
use crate::watcher::scheduler::{CycleFetches, FetchRequest, Scheduler};
use crate::WatchError;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// New links found on one page during one cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub label: String,
    pub url: String,

    /// Link targets exactly as written in the page, possibly relative
    pub new_links: Vec<String>,
}

impl ChangeRecord {
    pub fn new(label: impl Into<String>, url: impl Into<String>, new_links: Vec<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            new_links,
        }
    }
}

/// Main monitor structure
pub struct Monitor {
    config: MonitorConfig,
    pages: Vec<Page>,
    scheduler: Scheduler,
    observer: Box<dyn CycleObserver>,
    cycles_run: u64,
    last_stats: Option<CycleStats>,
}

impl Monitor {
    /// Creates a monitor with no pages yet
    ///
    /// # Arguments
    ///
    /// * `config` - Timing knobs and the concurrency cap
    /// * `fetcher` - Performs the page fetches
    pub fn new(config: MonitorConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let scheduler = Scheduler::new(fetcher, config.max_concurrent_fetches as usize);

        Self {
            config,
            pages: Vec::new(),
            scheduler,
            observer: Box::new(TracingObserver),
            cycles_run: 0,
            last_stats: None,
        }
    }

    /// Creates a monitor that fetches over HTTP as configured
    pub fn from_config(config: &Config) -> Result<Self, WatchError> {
        let fetcher =
            HttpFetcher::with_user_agent(&config.user_agent.value, config.monitor.fetch_timeout())?;
        Ok(Self::new(config.monitor.clone(), Arc::new(fetcher)))
    }

    /// Replaces the observer that receives every cycle's statistics
    pub fn with_observer(mut self, observer: impl CycleObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Looks a page up by its label
    pub fn page(&self, label: &str) -> Option<&Page> {
        self.pages.iter().find(|page| page.label() == label)
    }

    /// Number of cycles run so far, baseline and warm-up included
    pub fn cycles_run(&self) -> u64 {
        self.cycles_run
    }

    pub fn last_stats(&self) -> Option<&CycleStats> {
        self.last_stats.as_ref()
    }

    /// Builds the baseline every later cycle is compared against
    ///
    /// Entries whose URL is empty or not `http`-prefixed are skipped. The
    /// first fetch of each page is stored as is; the warm-up cycles that follow
    /// run the full body and link diff and discard what they find.
    ///
    /// # Returns
    ///
    /// The number of pages now monitored
    pub async fn build_baseline(&mut self, entries: &[PageEntry]) -> usize {
        self.pages = entries.iter().filter_map(Page::from_entry).collect();

        let skipped = entries.len() - self.pages.len();
        if skipped > 0 {
            tracing::info!("Skipped {} entries without an http URL", skipped);
        }
        tracing::info!("Building baseline for {} pages", self.pages.len());

        let started_at = Utc::now();
        let start = Instant::now();
        let fetches = self.fetch_all().await;

        for (index, result) in &fetches.results {
            let page = &mut self.pages[*index];
            if let Err(e) = page.set_baseline(result) {
                tracing::warn!("Could not store baseline for {}: {}", page.url(), e);
            }
            if !result.is_success() {
                tracing::warn!(
                    "No baseline body for {} this cycle: {}",
                    page.url(),
                    result.error().map(|e| e.to_string()).unwrap_or_default()
                );
            }
            page.reset();
        }
        self.finish_cycle(CycleKind::Baseline, started_at, start, &fetches, &[]);

        tracing::info!(
            "Running {} warm-up cycles to absorb dynamic content",
            self.config.warmup_cycles
        );
        for _ in 0..self.config.warmup_cycles {
            let discarded = self.run_diff_cycle(CycleKind::Warmup).await;
            tracing::trace!("Discarded {} warm-up change records", discarded.len());
        }

        self.pages.len()
    }

    /// Runs one check cycle and returns the pages that gained links
    ///
    /// Records follow page order. An empty list means nothing new was seen,
    /// which includes every page whose fetch failed.
    pub async fn check_updates(&mut self) -> Vec<ChangeRecord> {
        self.run_diff_cycle(CycleKind::Check).await
    }

    /// Polls until `cancel` fires, handing each non-empty batch to `notifier`
    ///
    /// Notifier failures are logged and polling continues. Cancellation
    /// during a cycle abandons its in-flight fetches and leaves every page's
    /// links and pending changes as they were before the cycle began.
    ///
    /// Returns right away when no page is monitored.
    ///
    /// # Returns
    ///
    /// The number of check cycles completed
    pub async fn run(&mut self, notifier: &dyn Notifier, cancel: &CancellationToken) -> u64 {
        if self.pages.is_empty() {
            tracing::warn!("No monitorable pages, nothing to watch");
            return 0;
        }

        let interval = self.config.check_interval();
        let mut completed = 0;

        while !cancel.is_cancelled() {
            let records = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Shutdown requested, abandoning the current cycle");
                    break;
                }
                records = self.check_updates() => records,
            };
            completed += 1;

            if !records.is_empty() {
                if let Err(e) = notifier.notify(&records).await {
                    tracing::warn!("Failed to deliver {} change record(s): {}", records.len(), e);
                }
            }

            if interval.is_zero() {
                // Back-to-back cycles still give other tasks a turn
                tokio::task::yield_now().await;
            } else {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }

        tracing::info!("Monitor stopped after {} check cycles", completed);
        completed
    }

    /// Fetches every page, diffs each result and collects flagged pages
    async fn run_diff_cycle(&mut self, kind: CycleKind) -> Vec<ChangeRecord> {
        let compare_body = kind == CycleKind::Warmup;
        let started_at = Utc::now();
        let start = Instant::now();
        let fetches = self.fetch_all().await;

        for (index, result) in &fetches.results {
            let page = &mut self.pages[*index];
            if let Err(e) = page.apply_result(result, compare_body) {
                tracing::warn!("Could not apply fetch result for {}: {}", page.url(), e);
            }
        }

        let mut records = Vec::new();
        for page in &mut self.pages {
            if page.has_updates() {
                let new_links = page.take_updates();
                records.push(ChangeRecord::new(page.label(), page.url(), new_links));
            }
            page.reset();
        }

        self.finish_cycle(kind, started_at, start, &fetches, &records);
        records
    }

    /// Moves every page into `Fetching` and runs one scheduler cycle
    async fn fetch_all(&mut self) -> CycleFetches {
        let mut requests = Vec::with_capacity(self.pages.len());
        for (index, page) in self.pages.iter_mut().enumerate() {
            match page.begin_fetch() {
                Ok(()) => requests.push(FetchRequest::new(index, page.url())),
                Err(e) => tracing::warn!("Skipping {} this cycle: {}", page.url(), e),
            }
        }

        self.scheduler.run_cycle(requests).await
    }

    fn finish_cycle(
        &mut self,
        kind: CycleKind,
        started_at: chrono::DateTime<Utc>,
        start: Instant,
        fetches: &CycleFetches,
        records: &[ChangeRecord],
    ) {
        self.cycles_run += 1;

        let stats = CycleStats {
            cycle: self.cycles_run,
            kind,
            started_at,
            duration: start.elapsed(),
            pages: fetches.results.len(),
            failed: fetches.failed(),
            changed_pages: records.len(),
            new_links: records.iter().map(|r| r.new_links.len()).sum(),
            peak_in_flight: fetches.peak_in_flight,
            slowest_fetch: fetches.slowest_fetch(),
        };

        self.observer.on_cycle(&stats);
        self.last_stats = Some(stats);
    }
}
