//! Query state of a table: page, page size and filters.

use serde::Serialize;

use crate::value::Filters;

/// Page position handed to the fetch function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub current: u32,
    pub page_size: u32,
}

/// Number of pages needed for `total` rows, 0 when there are none.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// What the table is currently asking for.
///
/// Invariants: `page >= 1` and `page_size >= 1`. Callers validate input
/// before mutating; the mutators here assume it.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub page: u32,
    pub page_size: u32,
    pub filters: Filters,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            filters: Filters::new(),
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            current: self.page,
            page_size: self.page_size,
        }
    }

    /// Replace the filters and go back to the first page.
    pub fn apply_filters(&mut self, filters: Filters) {
        self.filters = filters;
        self.page = 1;
    }

    /// Move to another page, keeping filters.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Change the page size; always returns to the first page.
    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Pull `page` back to the last page that exists for `total` rows.
    ///
    /// Returns true if the page changed.
    pub fn clamp_to(&mut self, total: u64) -> bool {
        let last = page_count(total, self.page_size).max(1);
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(10)
    }
}
