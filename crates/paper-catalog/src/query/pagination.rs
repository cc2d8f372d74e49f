//! Pagination bar: sliding page window and previous/next affordances.

use serde::Serialize;

use crate::config::views::PAGE_WINDOW;

/// Page numbers to show as buttons, at most five.
///
/// `page` is clamped into `1..=total_pages` first.
#[must_use]
pub fn page_window(page: u32, total_pages: u32) -> Vec<u32> {
    let total = total_pages.max(1);
    let page = clamp_page(page, total);

    let start = if total <= PAGE_WINDOW || page <= 3 {
        1
    } else if page >= total - 2 {
        total - PAGE_WINDOW + 1
    } else {
        page - 2
    };
    let end = (start + PAGE_WINDOW - 1).min(total);

    (start..=end).collect()
}

/// Clamp a requested page into `1..=total_pages`.
#[must_use]
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.clamp(1, total_pages.max(1))
}

/// Everything a pagination bar needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    /// Current page.
    pub page: u32,
    /// Page count.
    pub total_pages: u32,
    /// Page buttons.
    pub window: Vec<u32>,
    /// "Previous" enabled.
    pub has_previous: bool,
    /// "Next" enabled.
    pub has_next: bool,
}

impl PageControls {
    /// Controls for `page` of `total_pages`.
    #[must_use]
    pub fn new(page: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        let page = clamp_page(page, total_pages);
        Self {
            page,
            total_pages,
            window: page_window(page, total_pages),
            has_previous: page > 1,
            has_next: page < total_pages,
        }
    }

    /// Whether the bar is worth showing at all.
    #[must_use]
    pub const fn is_needed(&self) -> bool {
        self.total_pages > 1
    }
}
