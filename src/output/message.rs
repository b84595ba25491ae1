//! Human-readable rendering of change batches

use crate::watcher::ChangeRecord;
use url::Url;

/// Subject line used for every batch
pub const BATCH_SUBJECT: &str = "Updated sites";

/// Turns a reported link into something a reader can open
///
/// Links containing `http` are shown as they are. Anything else is relative
/// to its page and is resolved against `page_url`; if the page URL does not
/// parse, the two are concatenated.
///
/// # Example
///
/// ```
/// use sumi_watch::output::display_link;
///
/// assert_eq!(display_link("http://x/news/", "/bar"), "http://x/bar");
/// assert_eq!(display_link("http://x/", "https://y/z"), "https://y/z");
/// ```
pub fn display_link(page_url: &str, link: &str) -> String {
    if link.contains("http") {
        return link.to_string();
    }

    match Url::parse(page_url).and_then(|base| base.join(link)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => format!("{}{}", page_url, link),
    }
}

/// Renders one page's changes: its label, then one `-<link>` line per link
pub fn format_record(record: &ChangeRecord) -> String {
    let mut out = format!("{}\n", record.label);
    for link in &record.new_links {
        out.push('-');
        out.push_str(&display_link(&record.url, link));
        out.push('\n');
    }
    out
}

/// Renders a whole batch with its subject line
pub fn format_batch(records: &[ChangeRecord]) -> String {
    let mut out = format!("Subject: {}\n", BATCH_SUBJECT);
    for record in records {
        out.push_str(&format_record(record));
    }
    out
}
