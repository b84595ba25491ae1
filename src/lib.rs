//! Sumi-Watch: a web page change monitor
//!
//! This crate polls a set of web pages forever, keeps a baseline of the links
//! each page carries, and reports every newly appearing link as a change
//! record once per polling cycle.

pub mod config;
pub mod output;
pub mod source;
pub mod state;
pub mod watcher;

use thiserror::Error;

/// Main error type for Sumi-Watch operations
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::PagePhase,
        to: state::PagePhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while loading the list of monitored pages
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read source file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to download source {url}: {source}")]
    Download { url: String, source: reqwest::Error },

    #[error("Source {url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Malformed source record: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for Sumi-Watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for source loading
pub type SourceResult<T> = std::result::Result<T, SourceError>;

// Re-export commonly used types
pub use config::Config;
pub use state::{Page, PagePhase};
pub use watcher::{ChangeRecord, Monitor};
