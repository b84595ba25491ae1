//! Per-cycle statistics
//!
//! Every cycle the monitor runs produces a `CycleStats` record that is handed
//! to a `CycleObserver`. The default observer turns it into one structured
//! tracing event.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// Which part of the monitor's life a cycle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleKind {
    /// First fetch of every page
    Baseline,
    /// Diff-and-discard cycle during baseline construction
    Warmup,
    /// Regular cycle whose records are returned to the caller
    Check,
}

impl CycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Warmup => "warmup",
            Self::Check => "check",
        }
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of one polling cycle
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Sequence number, counting every cycle since the monitor was built
    pub cycle: u64,
    pub kind: CycleKind,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,

    /// Pages fetched this cycle
    pub pages: usize,

    /// Fetches that produced no body
    pub failed: usize,

    /// Pages flagged as updated
    pub changed_pages: usize,

    /// Links reported across all changed pages
    pub new_links: usize,

    /// Highest number of fetches in flight at once
    pub peak_in_flight: usize,

    /// Longest single fetch, successful or not
    pub slowest_fetch: Duration,
}

impl CycleStats {
    /// Share of fetches that failed, as a percentage
    pub fn failure_rate(&self) -> f64 {
        if self.pages == 0 {
            return 0.0;
        }
        (self.failed as f64 / self.pages as f64) * 100.0
    }
}

/// Receives the statistics of every completed cycle
pub trait CycleObserver: Send + Sync {
    fn on_cycle(&self, stats: &CycleStats);
}

/// Observer that logs every cycle through `tracing`
#[derive(Debug, Clone, Default)]
pub struct TracingObserver;

impl CycleObserver for TracingObserver {
    fn on_cycle(&self, stats: &CycleStats) {
        if stats.kind != CycleKind::Warmup {
            tracing::info!(
                cycle = stats.cycle,
                kind = %stats.kind,
                pages = stats.pages,
                failed = stats.failed,
                changed = stats.changed_pages,
                new_links = stats.new_links,
                peak_in_flight = stats.peak_in_flight,
                failure_rate = stats.failure_rate(),
                slowest_fetch_ms = stats.slowest_fetch.as_millis() as u64,
                "Cycle finished in {:.2}s",
                stats.duration.as_secs_f64()
            );
        } else {
            tracing::debug!(
                cycle = stats.cycle,
                kind = %stats.kind,
                pages = stats.pages,
                failed = stats.failed,
                changed = stats.changed_pages,
                "Warm-up cycle finished in {:.2}s",
                stats.duration.as_secs_f64()
            );
        }
    }
}
