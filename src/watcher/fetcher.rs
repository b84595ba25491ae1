//! HTTP fetcher implementation
//!
//! This module handles every page request made by the watcher:
//! - Building HTTP clients with a browser-like user agent and no-cache headers
//! - Enforcing a hard per-fetch timeout
//! - Folding every failure into a `FetchResult` instead of an error

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Why a fetch produced no body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP status {0}")]
    Status(u16),

    /// The fetch task never delivered a result (panicked or was aborted)
    #[error("no content received")]
    NoContentYet,
}

/// Outcome of one fetch attempt for one page
///
/// Built exactly once by the fetch task and moved to the coordinator; it is
/// never modified afterwards.
#[derive(Debug, Clone)]
pub struct FetchResult {
    url: String,
    outcome: Result<String, FetchError>,
    elapsed: Duration,
}

impl FetchResult {
    pub fn success(url: impl Into<String>, body: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            outcome: Ok(body.into()),
            elapsed,
        }
    }

    pub fn failure(url: impl Into<String>, error: FetchError, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            outcome: Err(error),
            elapsed,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// The response body, absent on any failure
    pub fn body(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Something that can retrieve a page body
///
/// Implementations must not fail past their boundary: every problem is
/// reported through the returned `FetchResult`.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult;
}

/// Builds an HTTP client for polling pages
///
/// Every request carries `user_agent` plus `Cache-Control: no-cache` and
/// `Pragma: no-cache` so intermediate caches are bypassed.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_watch::config::DEFAULT_USER_AGENT;
/// use sumi_watch::watcher::build_http_client;
///
/// let client = build_http_client(DEFAULT_USER_AGENT, Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by `reqwest`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Builds the client and the fetcher in one step
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(user_agent, timeout)?, timeout))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        let start = Instant::now();

        // The client timeout covers the request; this one also bounds reading the body
        let outcome = match tokio::time::timeout(self.timeout, fetch_body(&self.client, url)).await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(FetchError::Timeout),
        };

        match outcome {
            Ok(body) => FetchResult::success(url, body, start.elapsed()),
            Err(error) => {
                tracing::debug!("Fetch of {} failed: {}", url, error);
                FetchResult::failure(url, error, start.elapsed())
            }
        }
    }
}

async fn fetch_body(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client.get(url).send().await.map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    response.text().await.map_err(classify_error)
}

fn classify_error(error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout
    } else if error.is_connect() {
        FetchError::Transport(format!("connection failed: {}", error))
    } else {
        FetchError::Transport(error.to_string())
    }
}
