//! Paginated list responses

use serde::{Deserialize, Serialize};

/// Number of page links shown around the current page
pub const DEFAULT_PAGE_WINDOW: u32 = 5;

/// Envelope returned by every list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}

/// Total number of pages for `count` items at `page_size` per page
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    count.div_ceil(u64::from(page_size)).min(u64::from(u32::MAX)) as u32
}

/// Page numbers to show for the current page
///
/// Centers `current` in a window of `width` pages and shifts the window back
/// when it would run past the last page.
pub fn page_window(current: u32, total: u32, width: u32) -> Vec<u32> {
    if total == 0 || width == 0 {
        return Vec::new();
    }

    let current = current.min(total);
    let mut start = current.saturating_sub(width / 2).max(1);
    let end = start.saturating_add(width - 1).min(total);
    if end - start + 1 < width {
        start = end.saturating_sub(width - 1).max(1);
    }

    (start..=end).collect()
}
