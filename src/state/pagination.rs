//! Pagination state: a 1-based page number and a page size.

use crate::config::DEFAULT_ITEMS_PER_PAGE;
use crate::url_params::{ParamCodec, ParamUpdate, RawParams, SerializedParams, raw_value};
use serde::{Deserialize, Serialize};

/// The visible window of a paginated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageWindow {
    /// 1-based page number
    pub page_number: usize,
    /// Page size, at least 1
    pub items_per_page: usize,
}

impl PageWindow {
    #[must_use]
    pub const fn new(page_number: usize, items_per_page: usize) -> Self {
        Self {
            page_number: if page_number == 0 { 1 } else { page_number },
            items_per_page: if items_per_page == 0 { 1 } else { items_per_page },
        }
    }

    /// Index of the first item on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page_number.saturating_sub(1).saturating_mul(self.items_per_page)
    }

    /// Number of pages needed for `total` items; at least 1.
    #[must_use]
    pub const fn page_count(&self, total: usize) -> usize {
        let pages = total.div_ceil(self.items_per_page);
        if pages == 0 { 1 } else { pages }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::new(1, DEFAULT_ITEMS_PER_PAGE)
    }
}

/// Pagination state.
///
/// The total item count is unknown until the first page of data arrives in
/// remote mode; page numbers are only clamped once it is known.
#[derive(Debug, Clone)]
pub struct PaginationState {
    window: PageWindow,
    initial_items_per_page: usize,
    total_items: Option<usize>,
}

impl PaginationState {
    #[must_use]
    pub const fn new(initial_items_per_page: usize) -> Self {
        let window = PageWindow::new(1, initial_items_per_page);
        Self {
            window,
            initial_items_per_page: window.items_per_page,
            total_items: None,
        }
    }

    pub const fn window(&self) -> PageWindow {
        self.window
    }

    pub const fn page_number(&self) -> usize {
        self.window.page_number
    }

    pub const fn items_per_page(&self) -> usize {
        self.window.items_per_page
    }

    pub const fn total_items(&self) -> Option<usize> {
        self.total_items
    }

    /// Number of pages, once the total is known.
    #[must_use]
    pub fn page_count(&self) -> Option<usize> {
        self.total_items.map(|total| self.window.page_count(total))
    }

    /// Record the total item count. Does not move the current page.
    pub const fn set_total_items(&mut self, total: Option<usize>) {
        self.total_items = total;
    }

    /// Go to page `n`, clamped to the valid range once the total is known.
    pub fn set_page(&mut self, page_number: usize) {
        let mut page = page_number.max(1);
        if let Some(last) = self.page_count() {
            page = page.min(last);
        }
        self.window.page_number = page;
    }

    /// Change the page size, keeping the first visible item on screen.
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        if items_per_page == 0 {
            tracing::debug!("ignoring zero page size");
            return;
        }
        let first_item = self.window.offset();
        self.window.items_per_page = items_per_page;
        self.set_page(first_item / items_per_page + 1);
    }

    /// Back to page 1, keeping the page size.
    pub const fn reset_page(&mut self) {
        self.window.page_number = 1;
    }

    /// Back to page 1 with the initial page size.
    pub const fn reset(&mut self) {
        self.window = PageWindow::new(1, self.initial_items_per_page);
    }

    /// Replace the window from persisted storage. No clamping is applied:
    /// an out-of-range page simply renders empty.
    pub const fn restore(&mut self, window: PageWindow) {
        self.window = window;
    }
}

/// Persists the window as `pageNumber` and `itemsPerPage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaginationParamCodec;

impl PaginationParamCodec {
    pub const PAGE_NUMBER: &'static str = "pageNumber";
    pub const ITEMS_PER_PAGE: &'static str = "itemsPerPage";
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|n| *n >= 1)
}

impl ParamCodec for PaginationParamCodec {
    type Value = PageWindow;

    fn keys(&self) -> Vec<String> {
        vec![Self::PAGE_NUMBER.to_string(), Self::ITEMS_PER_PAGE.to_string()]
    }

    fn serialize(&self, value: &Self::Value) -> SerializedParams {
        let mut params = SerializedParams::new();
        params.insert(
            Self::PAGE_NUMBER.to_string(),
            ParamUpdate::Set(value.page_number.to_string()),
        );
        params.insert(
            Self::ITEMS_PER_PAGE.to_string(),
            ParamUpdate::Set(value.items_per_page.to_string()),
        );
        params
    }

    fn deserialize(&self, params: &RawParams, fallback: &Self::Value) -> Self::Value {
        let page_raw = raw_value(params, Self::PAGE_NUMBER);
        let size_raw = raw_value(params, Self::ITEMS_PER_PAGE);
        let page_number = parse_positive(page_raw).unwrap_or_else(|| {
            if page_raw.is_some() {
                tracing::debug!(value = page_raw, "ignoring malformed page number");
            }
            fallback.page_number
        });
        let items_per_page = parse_positive(size_raw).unwrap_or_else(|| {
            if size_raw.is_some() {
                tracing::debug!(value = size_raw, "ignoring malformed page size");
            }
            fallback.items_per_page
        });
        PageWindow::new(page_number, items_per_page)
    }
}
