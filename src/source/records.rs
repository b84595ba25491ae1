//! CSV page lists
//!
//! Each line is `label,url`; extra columns are ignored and lines with fewer
//! than two fields are skipped.

use crate::config::PageEntry;
use crate::{SourceError, SourceResult};
use reqwest::Client;
use std::path::Path;

/// Parses `label,url` records from CSV text
///
/// # Example
///
/// ```
/// use sumi_watch::source::parse_records;
///
/// let entries = parse_records("News,https://example.com/news\nBlog,https://example.com/blog\n").unwrap();
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].label, "News");
/// ```
pub fn parse_records(text: &str) -> SourceResult<Vec<PageEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record?;
        match (record.get(0), record.get(1)) {
            (Some(label), Some(url)) => entries.push(PageEntry::new(label, url)),
            _ => tracing::trace!("Skipping source line with {} field(s)", record.len()),
        }
    }

    Ok(entries)
}

/// Reads a page list from a local CSV file
pub async fn load_from_disk(path: &Path) -> SourceResult<Vec<PageEntry>> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let entries = parse_records(&text)?;
    tracing::debug!("Read {} entries from {}", entries.len(), path.display());
    Ok(entries)
}

/// Downloads a remote page list into `cache_path`, then reads it from there
pub async fn load_from_web(
    client: &Client,
    url: &str,
    cache_path: &Path,
) -> SourceResult<Vec<PageEntry>> {
    let download_error = |source: reqwest::Error| SourceError::Download {
        url: url.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(download_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let text = response.text().await.map_err(download_error)?;

    tokio::fs::write(cache_path, text)
        .await
        .map_err(|source| SourceError::Io {
            path: cache_path.display().to_string(),
            source,
        })?;
    tracing::info!("Downloaded page list {} to {}", url, cache_path.display());

    load_from_disk(cache_path).await
}
