//! Retrieval requests built from a query state snapshot.

use super::state::FilterName;

/// Unfiltered, server-paged listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    /// 1-based page.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Sort wire value.
    pub sort_by: &'static str,
}

impl BrowseRequest {
    /// Create a browse request.
    #[must_use]
    pub const fn new(page: u32, limit: u32, sort_by: &'static str) -> Self {
        Self { page, limit, sort_by }
    }

    /// Query parameters, in fixed order.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sortBy", self.sort_by.to_string()),
        ]
    }
}

/// Free-text search with structured filters.
///
/// `page` and `page_size` are not sent; the search endpoint answers with every
/// match and the caller windows locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Trimmed query text.
    pub query: String,
    /// Non-empty narrowing filters, in parameter order.
    pub filters: Vec<(FilterName, String)>,
    /// Sort wire value.
    pub sort_by: Option<&'static str>,
    /// Page to show from the match set.
    pub page: u32,
    /// Page size for local windowing.
    pub page_size: u32,
}

impl SearchRequest {
    /// Plain text lookup with no filters or sort.
    #[must_use]
    pub fn text(query: impl Into<String>, page_size: u32) -> Self {
        Self { query: query.into(), filters: Vec::new(), sort_by: None, page: 1, page_size }
    }

    /// Query parameters, in fixed order.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(self.filters.len() + 2);
        params.push(("q", self.query.clone()));
        for (name, value) in &self.filters {
            params.push((name.wire_name(), value.clone()));
        }
        if let Some(sort) = self.sort_by {
            params.push(("sortBy", sort.to_string()));
        }
        params
    }
}

/// The one request a query state resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Browse path.
    Browse(BrowseRequest),
    /// Search path.
    Search(SearchRequest),
}

impl Retrieval {
    /// Whether this is the search path.
    #[must_use]
    pub const fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    /// Page this request is for.
    #[must_use]
    pub const fn page(&self) -> u32 {
        match self {
            Self::Browse(r) => r.page,
            Self::Search(r) => r.page,
        }
    }

    /// Query parameters that go on the wire.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::Browse(r) => r.to_params(),
            Self::Search(r) => r.to_params(),
        }
    }
}
