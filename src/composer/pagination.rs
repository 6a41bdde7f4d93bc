//! Page requests and the pagination state rendered under the table.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;

/// Hard ceiling on records per page; `max_page_size` in config may only lower it.
pub const MAX_PAGE_SIZE: u32 = 100;

/// The page being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageRequest {
    /// 1-based page number
    #[validate(range(min = 1, message = "Page must be at least 1"))]
    pub page: u32,

    #[validate(range(min = 1, max = 100, message = "Page size must be between 1 and 100"))]
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn first(page_size: u32) -> Self {
        Self::new(1, page_size)
    }

    /// Validate before anything is sent to the endpoint.
    pub fn checked(self) -> AppResult<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn with_page(self, page: u32) -> Self {
        Self { page, ..self }
    }
}

/// Pagination as the UI renders it.
///
/// Invariants: `total_pages >= 1`, `1 <= current_page <= total_pages`, and an
/// empty result (`count == 0`) is always a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub count: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
    /// Link as sent by the endpoint, if any
    pub next: Option<String>,
    pub previous: Option<String>,
}

impl PaginationState {
    /// State for an empty list at the given page size.
    pub fn empty(page_size: u32) -> Self {
        Self::derive(0, page_size, 1)
    }

    /// Derive everything from a record count when the endpoint sent no metadata.
    pub fn derive(count: u64, page_size: u32, requested_page: u32) -> Self {
        let total_pages = total_pages_for(count, page_size);
        let current_page = clamp_page(requested_page, total_pages);
        Self {
            count,
            total_pages,
            current_page,
            page_size,
            has_next: current_page < total_pages,
            has_previous: current_page > 1,
            next: None,
            previous: None,
        }
    }

    /// Whether page controls should be rendered at all.
    pub fn shows_controls(&self) -> bool {
        self.count > 0 && self.total_pages > 1
    }

    /// Clamp an arbitrary page number into this state's range.
    pub fn clamp(&self, page: u32) -> u32 {
        clamp_page(page, self.total_pages)
    }

    /// 1-based index range of the records on the current page, for "showing x-y of n".
    pub fn showing(&self) -> Option<(u64, u64)> {
        if self.count == 0 {
            return None;
        }
        let start = u64::from(self.current_page - 1) * u64::from(self.page_size) + 1;
        let end = (start + u64::from(self.page_size) - 1).min(self.count);
        (start <= end).then_some((start, end))
    }
}

/// `max(1, ceil(count / page_size))`
pub fn total_pages_for(count: u64, page_size: u32) -> u32 {
    if count == 0 || page_size == 0 {
        return 1;
    }
    let pages = count.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX).max(1)
}

pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}
