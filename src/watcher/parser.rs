//! HTML parser for extracting link targets
//!
//! Links are returned exactly as written in the page. Relative targets are
//! not resolved here; notifiers resolve them for display.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracts the set of hyperlink targets from a raw HTML document
///
/// The underlying parser is error tolerant: malformed markup yields whatever
/// links could be recovered, possibly none, and never an error.
///
/// # Example
///
/// ```
/// use sumi_watch::watcher::extract_links;
///
/// let html = r#"<html><body><a href="/today">Today</a><a href="/today">Again</a></body></html>"#;
/// assert_eq!(extract_links(html), vec!["/today".to_string()]);
/// ```
pub fn extract_links(html: &str) -> Vec<String> {
    collect_links(&Html::parse_document(html))
}

fn collect_links(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    document
        .select(&a_selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter(|href| seen.insert(href.to_string()))
        .map(str::to_string)
        .collect()
}
