//! Page-number pagination primitives for listing endpoints.
//!
//! Listing endpoints accept a zero-based page index and a page size, and
//! answer with a [`Page`] whose metadata is rendered through [`PageInfo`].
//! Requests are validated on construction so adapters can translate them to
//! `OFFSET`/`LIMIT` clauses without re-checking bounds.
//!
//! # Examples
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let request = PageRequest::new(1, 2).expect("valid request");
//! let page = Page::new(vec!["c", "d"], request, 5);
//! assert_eq!(page.total_pages(), 3);
//! assert!(page.has_next());
//! assert!(page.has_previous());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size applied when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validation failures raised when building a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// The requested page size is zero or above [`MAX_PAGE_SIZE`].
    #[error("page size must be between 1 and {max}, got {size}")]
    SizeOutOfRange {
        /// Size supplied by the caller.
        size: u32,
        /// Upper bound accepted by the request.
        max: u32,
    },
}

/// Zero-based page index plus page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Build a request, rejecting sizes outside `1..=MAX_PAGE_SIZE`.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError::SizeOutOfRange`] when `size` is zero or
    /// larger than [`MAX_PAGE_SIZE`].
    pub const fn new(page: u32, size: u32) -> Result<Self, PageRequestError> {
        if size == 0 || size > MAX_PAGE_SIZE {
            return Err(PageRequestError::SizeOutOfRange {
                size,
                max: MAX_PAGE_SIZE,
            });
        }
        Ok(Self { page, size })
    }

    /// Build a request from optional query values, applying defaults.
    ///
    /// # Errors
    ///
    /// Propagates [`PageRequestError`] from [`PageRequest::new`].
    pub fn from_query(page: Option<u32>, size: Option<u32>) -> Result<Self, PageRequestError> {
        Self::new(page.unwrap_or(0), size.unwrap_or(DEFAULT_PAGE_SIZE))
    }

    /// Zero-based page index.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Number of items per page.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of rows to skip before this page starts.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        self.page as u64 * self.size as u64
    }

    /// Maximum number of rows on this page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results together with the total number of matching items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    items: Vec<T>,
    request: PageRequest,
    total_elements: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the rows loaded for `request`.
    #[must_use]
    pub const fn new(items: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        Self {
            items,
            request,
            total_elements,
        }
    }

    /// An empty page for `request`.
    #[must_use]
    pub const fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), request, 0)
    }

    /// Items on this page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The request this page answers.
    #[must_use]
    pub const fn request(&self) -> PageRequest {
        self.request
    }

    /// Total number of items across all pages.
    #[must_use]
    pub const fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Number of pages needed to hold every item.
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_elements.div_ceil(self.request.size as u64)
    }

    /// Whether this is the first page.
    #[must_use]
    pub const fn is_first(&self) -> bool {
        self.request.page == 0
    }

    /// Whether a page follows this one.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        (self.request.page as u64) + 1 < self.total_pages()
    }

    /// Whether this is the last page (an empty result is its own last page).
    #[must_use]
    pub const fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Whether a page precedes this one.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.request.page > 0
    }

    /// Transform every item while keeping the page metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total_elements: self.total_elements,
        }
    }

    /// Serialisable metadata describing this page.
    #[must_use]
    pub const fn info(&self) -> PageInfo {
        PageInfo {
            page: self.request.page,
            size: self.request.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages(),
            first: self.is_first(),
            last: self.is_last(),
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }
}

/// Page metadata as rendered in JSON responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Zero-based page index.
    pub page: u32,
    /// Requested page size.
    pub size: u32,
    /// Total number of items across all pages.
    pub total_elements: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Whether this is the first page.
    pub first: bool,
    /// Whether this is the last page.
    pub last: bool,
    /// Whether a following page exists.
    pub has_next: bool,
    /// Whether a preceding page exists.
    pub has_previous: bool,
}
