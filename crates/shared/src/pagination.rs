//! Page-number pagination used by the board listing.
//!
//! Pages are zero-based, matching the `currentPage` the web client sends back.

use serde::{Deserialize, Serialize};

/// Default page size when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Requested page, as read from the query string.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Page size clamped to `1..=MAX_PAGE_SIZE`.
    pub fn limit(&self) -> i64 {
        self.size.clamp(1, MAX_PAGE_SIZE) as i64
    }

    pub fn offset(&self) -> i64 {
        self.page as i64 * self.limit()
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub current_page: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let limit = request.limit();
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + limit - 1) / limit
        };
        Self {
            content,
            total_elements,
            total_pages,
            current_page: request.page,
            size: limit as u32,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            current_page: self.current_page,
            size: self.size,
        }
    }
}
