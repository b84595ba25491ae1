use serde::Deserialize;
use std::time::Duration;

/// Browser-like identification sent with every page fetch
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Main configuration structure for Sumi-Watch
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub source: Option<SourceConfig>,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(rename = "page", default)]
    pub pages: Vec<PageEntry>,
}

/// Polling engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Hard timeout for a single page fetch (seconds)
    #[serde(rename = "fetch-timeout-secs", default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum number of fetches in flight at once
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Number of diff-and-discard cycles run after the baseline fetch
    #[serde(rename = "warmup-cycles", default = "default_warmup_cycles")]
    pub warmup_cycles: u32,

    /// Pause between two check cycles (seconds)
    #[serde(rename = "check-interval-secs", default)]
    pub check_interval_secs: u64,
}

impl MonitorConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            warmup_cycles: default_warmup_cycles(),
            check_interval_secs: 0,
        }
    }
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_max_concurrent_fetches() -> u32 {
    25
}

fn default_warmup_cycles() -> u32 {
    20
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Full User-Agent header value
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Where the list of monitored pages comes from
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Local CSV file of `label,url` lines
    #[serde(default)]
    pub path: Option<String>,

    /// Remote CSV document, downloaded to `cache-path` before reading
    #[serde(default)]
    pub url: Option<String>,

    /// Local copy of the remote document
    #[serde(rename = "cache-path", default)]
    pub cache_path: Option<String>,
}

/// Change notification configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotifyConfig {
    /// Webhook receiving each batch of changes; batches are only logged when absent
    #[serde(rename = "webhook-url", default)]
    pub webhook_url: Option<String>,
}

/// A monitored page listed directly in the config file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageEntry {
    /// Human-readable name used in notifications
    pub label: String,

    /// Address polled every cycle
    pub url: String,
}

impl PageEntry {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}
