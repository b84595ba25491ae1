//! A single monitored page and its change-detection logic

use crate::config::PageEntry;
use crate::state::page_state::{DiffOutcome, PagePhase};
use crate::watcher::{extract_links, FetchResult};
use crate::WatchError;
use std::collections::HashSet;

/// Returns true if `url` can be polled: non-empty and `http`-prefixed
///
/// Both `http://` and `https://` addresses pass. Anything else is dropped
/// before a [`Page`] is ever created.
pub fn is_monitorable_url(url: &str) -> bool {
    !url.is_empty() && url.starts_with("http")
}

/// One monitored page
///
/// The link set only ever grows: a link that disappears from the page stays
/// known, so a banner rotating back in is not reported twice.
#[derive(Debug, Clone)]
pub struct Page {
    label: String,
    url: String,
    baseline_body: Option<String>,
    link_set: HashSet<String>,
    pending_changes: Vec<String>,
    updated: bool,
    phase: PagePhase,
}

impl Page {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            baseline_body: None,
            link_set: HashSet::new(),
            pending_changes: Vec::new(),
            updated: false,
            phase: PagePhase::Idle,
        }
    }

    /// Creates a page for `entry`, or `None` if its URL cannot be polled
    pub fn from_entry(entry: &PageEntry) -> Option<Self> {
        let url = entry.url.trim();
        if is_monitorable_url(url) {
            Some(Self::new(entry.label.trim(), url))
        } else {
            None
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn baseline_body(&self) -> Option<&str> {
        self.baseline_body.as_deref()
    }

    pub fn links(&self) -> &HashSet<String> {
        &self.link_set
    }

    pub fn pending_changes(&self) -> &[String] {
        &self.pending_changes
    }

    pub fn phase(&self) -> PagePhase {
        self.phase
    }

    /// The flag checked once per cycle by the monitor
    pub fn has_updates(&self) -> bool {
        self.updated
    }

    /// Marks the start of this cycle's fetch
    ///
    /// A page left in `Fetching` by an abandoned cycle simply starts over.
    pub fn begin_fetch(&mut self) -> Result<(), WatchError> {
        if self.phase.is_fetching() {
            tracing::debug!("Previous fetch for {} was abandoned", self.url);
            return Ok(());
        }
        self.transition(PagePhase::Fetching)
    }

    /// Returns the page to `Idle` after its result has been consumed
    pub fn reset(&mut self) {
        if self.phase.can_transition_to(PagePhase::Idle) {
            self.phase = PagePhase::Idle;
        }
    }

    /// Stores the first fetch as the trusted baseline
    ///
    /// No diff is run, so this never produces a change.
    pub fn set_baseline(&mut self, result: &FetchResult) -> Result<(), WatchError> {
        self.transition(PagePhase::Diffed(DiffOutcome::Unchanged))?;
        self.baseline_body = result.body().map(str::to_string);
        self.link_set = result
            .body()
            .map(extract_links)
            .unwrap_or_default()
            .into_iter()
            .collect();
        Ok(())
    }

    /// Applies this cycle's fetch result
    ///
    /// Runs the link diff, and also the whole-body diff when `compare_body`
    /// is set (baseline construction only).
    pub fn apply_result(
        &mut self,
        result: &FetchResult,
        compare_body: bool,
    ) -> Result<DiffOutcome, WatchError> {
        if !self.phase.is_fetching() {
            return Err(WatchError::InvalidTransition {
                from: self.phase,
                to: PagePhase::Diffed(DiffOutcome::Unchanged),
            });
        }

        let body_outcome = if compare_body {
            self.check_body(result)
        } else {
            DiffOutcome::Unchanged
        };
        let link_outcome = self.check_links(result);

        let outcome = if body_outcome == DiffOutcome::Changed || link_outcome == DiffOutcome::Changed
        {
            DiffOutcome::Changed
        } else {
            DiffOutcome::Unchanged
        };
        self.transition(PagePhase::Diffed(outcome))?;
        Ok(outcome)
    }

    /// Records every link in `result` that was never seen on this page
    pub fn check_links(&mut self, result: &FetchResult) -> DiffOutcome {
        let Some(body) = result.body() else {
            return DiffOutcome::Unchanged;
        };

        let new_links: Vec<String> = extract_links(body)
            .into_iter()
            .filter(|link| !self.link_set.contains(link))
            .collect();

        if new_links.is_empty() {
            return DiffOutcome::Unchanged;
        }

        tracing::debug!("{} new link(s) on {}", new_links.len(), self.url);
        self.link_set.extend(new_links.iter().cloned());
        self.pending_changes.extend(new_links);
        self.updated = true;
        DiffOutcome::Changed
    }

    /// Compares the raw body with the baseline, replacing it on any difference
    pub fn check_body(&mut self, result: &FetchResult) -> DiffOutcome {
        let Some(body) = result.body() else {
            return DiffOutcome::Unchanged;
        };

        if self.baseline_body.as_deref() == Some(body) {
            return DiffOutcome::Unchanged;
        }

        self.baseline_body = Some(body.to_string());
        self.updated = true;
        DiffOutcome::Changed
    }

    /// Returns the changes gathered since the last read and clears the flag
    ///
    /// The pending list is drained as well, so a second read without a new
    /// fetch returns nothing.
    pub fn take_updates(&mut self) -> Vec<String> {
        self.updated = false;
        std::mem::take(&mut self.pending_changes)
    }

    fn transition(&mut self, next: PagePhase) -> Result<(), WatchError> {
        if !self.phase.can_transition_to(next) {
            return Err(WatchError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}
