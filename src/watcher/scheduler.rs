//! Scheduler for running one polling cycle's fetches
//!
//! This module handles:
//! - Keeping at most `C` fetches in flight
//! - Admitting a queued fetch whenever a slot frees up
//! - Guaranteeing exactly one result per requested page per cycle

use crate::watcher::fetcher::{FetchError, FetchResult, PageFetcher};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;

/// A page that needs a fetch this cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Index of the page in the monitor's page list
    pub page: usize,

    /// The URL to fetch
    pub url: String,
}

impl FetchRequest {
    pub fn new(page: usize, url: impl Into<String>) -> Self {
        Self {
            page,
            url: url.into(),
        }
    }
}

/// Everything one cycle's fetches produced
#[derive(Debug, Default)]
pub struct CycleFetches {
    /// One `(page index, result)` per request, in request order
    pub results: Vec<(usize, FetchResult)>,

    /// Highest number of fetches that were in flight at once
    pub peak_in_flight: usize,
}

impl CycleFetches {
    /// Number of results that carry no body
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, r)| !r.is_success()).count()
    }

    /// Duration of the longest fetch, zero for an empty cycle
    pub fn slowest_fetch(&self) -> Duration {
        self.results
            .iter()
            .map(|(_, r)| r.elapsed())
            .max()
            .unwrap_or_default()
    }
}

/// Scheduler runs a cycle's fetches under a global concurrency cap
///
/// Completion is awaited through a `JoinSet`, so the coordinator sleeps until
/// some fetch finishes instead of polling flags. Dropping a `run_cycle`
/// future aborts every fetch still in flight.
pub struct Scheduler {
    fetcher: Arc<dyn PageFetcher>,
    max_in_flight: usize,
}

impl Scheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    ///
    /// * `fetcher` - Performs the individual page fetches
    /// * `max_in_flight` - The concurrency cap `C` (values below 1 are raised to 1)
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_in_flight: usize) -> Self {
        Self {
            fetcher,
            max_in_flight: max_in_flight.max(1),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Fetches every request exactly once
    ///
    /// Requests are taken from the end of the list. A failed, panicked or
    /// timed-out fetch still counts as done and yields a result without a body.
    pub async fn run_cycle(&self, requests: Vec<FetchRequest>) -> CycleFetches {
        let total = requests.len();
        let pages: Vec<(usize, String)> = requests
            .iter()
            .map(|request| (request.page, request.url.clone()))
            .collect();

        let mut slots: Vec<Option<FetchResult>> = vec![None; total];
        let mut pending: Vec<(usize, FetchRequest)> = requests.into_iter().enumerate().collect();
        let mut active: JoinSet<(usize, FetchResult)> = JoinSet::new();
        let mut peak_in_flight = 0;

        while !pending.is_empty() || !active.is_empty() {
            while active.len() < self.max_in_flight {
                let Some((slot, request)) = pending.pop() else {
                    break;
                };
                let fetcher = Arc::clone(&self.fetcher);
                active.spawn(async move {
                    let result = fetcher.fetch(&request.url).await;
                    (slot, result)
                });
            }
            peak_in_flight = peak_in_flight.max(active.len());

            tracing::trace!(
                "{} fetches in flight, {} waiting",
                active.len(),
                pending.len()
            );

            match active.join_next().await {
                Some(Ok((slot, result))) => slots[slot] = Some(result),
                Some(Err(e)) => tracing::warn!("Fetch task ended without a result: {}", e),
                None => {}
            }
        }

        let results = slots
            .into_iter()
            .zip(pages)
            .map(|(result, (page, url))| {
                let result = result.unwrap_or_else(|| {
                    FetchResult::failure(url, FetchError::NoContentYet, Duration::ZERO)
                });
                (page, result)
            })
            .collect();

        CycleFetches {
            results,
            peak_in_flight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records how many fetches overlap and which URLs were requested
    #[derive(Default)]
    struct CountingFetcher {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PageFetcher for CountingFetcher {
        async fn fetch(&self, url: &str) -> FetchResult {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(url.to_string());

            tokio::time::sleep(Duration::from_millis(20)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if url.contains("fail") {
                FetchResult::failure(url, FetchError::Timeout, Duration::from_millis(20))
            } else {
                FetchResult::success(url, "<html></html>", Duration::from_millis(20))
            }
        }
    }

    struct PanickingFetcher;

    #[async_trait]
    impl PageFetcher for PanickingFetcher {
        async fn fetch(&self, url: &str) -> FetchResult {
            if url.contains("boom") {
                panic!("fetcher blew up");
            }
            FetchResult::success(url, "ok", Duration::ZERO)
        }
    }

    fn requests(count: usize) -> Vec<FetchRequest> {
        (0..count)
            .map(|i| FetchRequest::new(i, format!("http://site-{}.test/", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_concurrency_cap_respected() {
        let fetcher = Arc::new(CountingFetcher::default());
        let scheduler = Scheduler::new(fetcher.clone(), 25);

        let cycle = scheduler.run_cycle(requests(30)).await;

        assert_eq!(cycle.results.len(), 30);
        assert!(cycle.peak_in_flight <= 25);
        assert!(fetcher.peak.load(Ordering::SeqCst) <= 25);
        assert_eq!(fetcher.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_every_page_fetched_exactly_once() {
        let fetcher = Arc::new(CountingFetcher::default());
        let scheduler = Scheduler::new(fetcher.clone(), 4);

        let cycle = scheduler.run_cycle(requests(17)).await;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for url in fetcher.calls.lock().unwrap().iter() {
            *counts.entry(url.clone()).or_default() += 1;
        }
        assert_eq!(counts.len(), 17);
        assert!(counts.values().all(|&n| n == 1));

        let pages: Vec<usize> = cycle.results.iter().map(|(page, _)| *page).collect();
        assert_eq!(pages, (0..17).collect::<Vec<_>>());
        for (page, result) in &cycle.results {
            assert_eq!(result.url(), format!("http://site-{}.test/", page));
        }
    }

    #[tokio::test]
    async fn test_pending_taken_from_the_end() {
        let fetcher = Arc::new(CountingFetcher::default());
        let scheduler = Scheduler::new(fetcher.clone(), 1);

        scheduler.run_cycle(requests(3)).await;

        assert_eq!(
            *fetcher.calls.lock().unwrap(),
            vec![
                "http://site-2.test/".to_string(),
                "http://site-1.test/".to_string(),
                "http://site-0.test/".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_failures_count_as_completed() {
        let fetcher = Arc::new(CountingFetcher::default());
        let scheduler = Scheduler::new(fetcher, 2);
        let reqs = vec![
            FetchRequest::new(0, "http://ok.test/"),
            FetchRequest::new(1, "http://fail.test/"),
            FetchRequest::new(2, "http://ok-too.test/"),
        ];

        let cycle = scheduler.run_cycle(reqs).await;

        assert_eq!(cycle.results.len(), 3);
        assert_eq!(cycle.failed(), 1);
        assert_eq!(cycle.results[1].1.error(), Some(&FetchError::Timeout));
        assert_eq!(cycle.slowest_fetch(), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_panicking_fetch_yields_no_content() {
        let scheduler = Scheduler::new(Arc::new(PanickingFetcher), 5);
        let reqs = vec![
            FetchRequest::new(7, "http://fine.test/"),
            FetchRequest::new(9, "http://boom.test/"),
        ];

        let cycle = scheduler.run_cycle(reqs).await;

        assert_eq!(cycle.results.len(), 2);
        assert_eq!(cycle.results[0].0, 7);
        assert!(cycle.results[0].1.is_success());
        assert_eq!(cycle.results[1].0, 9);
        assert_eq!(cycle.results[1].1.error(), Some(&FetchError::NoContentYet));
    }

    #[tokio::test]
    async fn test_empty_cycle() {
        let scheduler = Scheduler::new(Arc::new(CountingFetcher::default()), 3);
        let cycle = scheduler.run_cycle(Vec::new()).await;
        assert!(cycle.results.is_empty());
        assert_eq!(cycle.peak_in_flight, 0);
        assert_eq!(cycle.slowest_fetch(), Duration::ZERO);
    }

    #[test]
    fn test_cap_is_at_least_one() {
        let scheduler = Scheduler::new(Arc::new(CountingFetcher::default()), 0);
        assert_eq!(scheduler.max_in_flight(), 1);
    }
}
