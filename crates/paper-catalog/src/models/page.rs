//! List response envelopes and the reconciled result page.

use serde::{Deserialize, Serialize};

use super::{Author, Paper};

/// Pagination block of a browse response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page count as reported by the backend.
    #[serde(default)]
    pub pages: u32,

    /// Total matching records.
    #[serde(default)]
    pub total: u64,
}

/// `GET /papers` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperBrowseResponse {
    /// Papers on the requested page.
    #[serde(default)]
    pub papers: Vec<Paper>,

    /// Pagination info.
    #[serde(default)]
    pub pagination: Pagination,
}

/// `GET /papers/search` response. Not paged: carries every match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaperSearchResponse {
    /// Matching papers.
    #[serde(default)]
    pub papers: Vec<Paper>,

    /// Total matches, when the backend reports it.
    #[serde(default)]
    pub total: Option<u64>,
}

/// `GET /authors` and `GET /authors/search` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorListResponse {
    /// Authors.
    #[serde(default)]
    pub authors: Vec<Author>,

    /// Pagination info (browse only).
    #[serde(default)]
    pub pagination: Option<Pagination>,

    /// Total matches (search only).
    #[serde(default)]
    pub total: Option<u64>,
}

impl AuthorListResponse {
    /// Best available total count.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.pagination
            .map(|p| p.total)
            .or(self.total)
            .unwrap_or(self.authors.len() as u64)
    }
}

/// The reconciled output of one successful retrieval.
///
/// Always replaced as a whole; never merged with a previous page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage<T> {
    /// Items on this page, in display order.
    pub items: Vec<T>,

    /// Total matching items across all pages.
    pub total_count: u64,

    /// `max(1, ceil(total_count / page_size))`.
    pub total_pages: u32,

    /// 1-based page number these items belong to.
    pub page: u32,

    /// Page size the request was made with.
    pub page_size: u32,
}

impl<T> ResultPage<T> {
    /// Build a page from server-paged items.
    #[must_use]
    pub fn new(items: Vec<T>, total_count: u64, page: u32, page_size: u32) -> Self {
        Self {
            items,
            total_count,
            total_pages: Self::pages_for(total_count, page_size),
            page: page.max(1),
            page_size,
        }
    }

    /// Build a page by windowing a complete match set locally.
    ///
    /// `page` is clamped into the available range.
    #[must_use]
    pub fn from_full_set(all: Vec<T>, total_hint: Option<u64>, page: u32, page_size: u32) -> Self {
        let total_count = total_hint.unwrap_or(all.len() as u64);
        let total_pages = Self::pages_for(total_count, page_size);
        let page = page.clamp(1, total_pages);
        let skip = (page as usize - 1) * page_size as usize;
        let items = all.into_iter().skip(skip).take(page_size as usize).collect();

        Self { items, total_count, total_pages, page, page_size }
    }

    /// Page count for a total, never less than one.
    #[must_use]
    pub fn pages_for(total_count: u64, page_size: u32) -> u32 {
        if page_size == 0 {
            return 1;
        }
        let pages = total_count.div_ceil(u64::from(page_size)).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// True when the retrieval legitimately matched nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    /// 1-based rank of the first item on this page.
    #[must_use]
    pub fn first_rank(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size) + 1
    }
}
