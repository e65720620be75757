//! Pagination types
//!
//! Page numbers arrive as raw query-string values. Anything that does not
//! parse falls back to the first page, and numbers outside the available
//! range are clamped instead of producing an error or an empty page.

use serde::{Deserialize, Serialize};

/// Default number of posts per page
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Requested page number, not yet checked against the result size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    requested: i64,
}

impl PageRequest {
    pub fn new(requested: i64) -> Self {
        Self { requested }
    }

    pub fn first() -> Self {
        Self::new(1)
    }

    /// Parse a raw `page` parameter. Missing or non-numeric input means page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<i64>().ok())
            .map(Self::new)
            .unwrap_or_else(Self::first)
    }

    pub fn requested(&self) -> i64 {
        self.requested
    }

    /// Resolve to a valid 1-indexed page for `total` items
    pub fn clamp(&self, total: i64, per_page: u32) -> u32 {
        let last = total_pages(total, per_page);
        self.requested.clamp(1, i64::from(last)) as u32
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first()
    }
}

/// Number of pages needed for `total` items. An empty result still has one page.
pub fn total_pages(total: i64, per_page: u32) -> u32 {
    if per_page == 0 || total <= 0 {
        return 1;
    }
    let per_page = i64::from(per_page);
    ((total + per_page - 1) / per_page).min(i64::from(u32::MAX)) as u32
}

/// One page of results plus pager metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: i64,
    /// Current page number (1-indexed, always within range)
    pub page: u32,
    /// Number of items per page
    pub per_page: u32,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: u32, per_page: u32) -> Self {
        Self {
            items,
            total,
            page,
            per_page,
        }
    }

    /// Empty first page
    pub fn empty(per_page: u32) -> Self {
        Self::new(Vec::new(), 0, 1, per_page)
    }

    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Transform the items, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}
