//! Page windows and pagination metadata for list endpoints.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when a page window is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    #[error("page must be at least 1")]
    PageTooSmall,
    #[error("limit must be between 1 and {}", PageRequest::MAX_LIMIT)]
    LimitOutOfRange,
}

/// A validated `(page, limit)` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page used when the client omits one.
    pub const DEFAULT_PAGE: u32 = 1;
    /// Page size used when the client omits one.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Largest page size a client may request.
    pub const MAX_LIMIT: u32 = 100;

    /// Create a page window.
    ///
    /// # Errors
    ///
    /// Returns `PageRequestError` if `page` is 0 or `limit` is outside `1..=100`.
    pub const fn new(page: u32, limit: u32) -> Result<Self, PageRequestError> {
        if page < 1 {
            return Err(PageRequestError::PageTooSmall);
        }
        if limit < 1 || limit > Self::MAX_LIMIT {
            return Err(PageRequestError::LimitOutOfRange);
        }
        Ok(Self { page, limit })
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Maximum number of items on the page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Metadata describing a windowed result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    /// Number of matching rows, ignoring the window.
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// Build metadata for `request` over `total` matching rows.
    #[must_use]
    pub const fn new(request: PageRequest, total: u64) -> Self {
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: total.div_ceil(request.limit as u64),
        }
    }
}

/// One page of items plus its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Map every item on the page, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
