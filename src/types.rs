/// Shared types used across the codebase

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Offset pagination window, always normalised (page >= 1, 1 <= size <= MAX_PAGE_SIZE)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    page: i64,
    size: i64,
}

impl Page {
    /// Non-positive values fall back to the defaults
    pub fn new(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let size = size
            .filter(|s| *s > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        Self { page, size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// Rows to skip: (page - 1) * size
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// Slice an already sorted, already filtered sequence
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit()).unwrap_or(0);
        items.iter().skip(start).take(take).cloned().collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results plus the size of the full filtered set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub list: Vec<T>,
    pub total: i64,
}

impl<T> Paged<T> {
    pub fn new(list: Vec<T>, total: i64) -> Self {
        Self { list, total }
    }
}
