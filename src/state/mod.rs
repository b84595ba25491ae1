//! State module for monitored pages
//!
//! # Components
//!
//! - `PagePhase`: where a page is within the current polling cycle
//! - `Page`: one monitored page's baseline and change-detection logic

mod page;
mod page_state;

// Re-export main types
pub use page::{is_monitorable_url, Page};
pub use page_state::{DiffOutcome, PagePhase};
