//! Source module for loading the list of monitored pages
//!
//! Pages come from `[[page]]` entries in the config file and, optionally, a
//! CSV document that is either local or downloaded from a URL.

mod records;

pub use records::{load_from_disk, load_from_web, parse_records};

use crate::config::{Config, PageEntry, SourceConfig};
use crate::SourceResult;
use reqwest::Client;
use std::path::Path;

/// Collects every page entry the configuration points at
///
/// Inline `[[page]]` entries come first, followed by the `[source]` document.
/// When downloading a remote document fails but an earlier copy is cached,
/// the cached copy is used.
pub async fn load_sources(config: &Config, client: &Client) -> SourceResult<Vec<PageEntry>> {
    let mut entries = config.pages.clone();

    if let Some(source) = &config.source {
        entries.extend(load_source(source, client).await?);
    }

    tracing::info!("Loaded {} page entries", entries.len());
    Ok(entries)
}

async fn load_source(source: &SourceConfig, client: &Client) -> SourceResult<Vec<PageEntry>> {
    if let Some(path) = &source.path {
        return load_from_disk(Path::new(path)).await;
    }

    let (Some(url), Some(cache_path)) = (&source.url, &source.cache_path) else {
        return Ok(Vec::new());
    };
    let cache_path = Path::new(cache_path);

    match load_from_web(client, url, cache_path).await {
        Ok(entries) => Ok(entries),
        Err(e) if cache_path.exists() => {
            tracing::warn!(
                "Could not refresh {} ({}), using cached copy {}",
                url,
                e,
                cache_path.display()
            );
            load_from_disk(cache_path).await
        }
        Err(e) => Err(e),
    }
}
