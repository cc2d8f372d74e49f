//! Query state owned by a list view.

use std::collections::BTreeMap;

use super::request::{BrowseRequest, Retrieval, SearchRequest};
use crate::error::{ViewError, ViewResult};
use crate::models::SortOrder;

/// A structured filter a list view may expose.
///
/// Declaration order is the order filters appear in request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterName {
    YearFrom,
    YearTo,
    Journal,
    Author,
    MinCitations,
    SortBy,
}

impl FilterName {
    /// Filters that narrow a search (everything but the sort).
    pub const NARROWING: &'static [Self] =
        &[Self::YearFrom, Self::YearTo, Self::Journal, Self::Author, Self::MinCitations];

    /// Query parameter name.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::YearFrom => "yearFrom",
            Self::YearTo => "yearTo",
            Self::Journal => "journal",
            Self::Author => "author",
            Self::MinCitations => "minCitations",
            Self::SortBy => "sortBy",
        }
    }

    /// Chip label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::YearFrom => "From",
            Self::YearTo => "To",
            Self::Journal => "Journal",
            Self::Author => "Author",
            Self::MinCitations => "Min citations",
            Self::SortBy => "Sort",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        [Self::SortBy].iter().chain(Self::NARROWING).copied().find(|f| f.wire_name() == name)
    }
}

/// Every input that determines a list view's next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState<S: SortOrder> {
    free_text: String,
    filters: BTreeMap<FilterName, String>,
    sort_by: S,
    page: u32,
    page_size: u32,
    allowed: &'static [FilterName],
}

impl<S: SortOrder> QueryState<S> {
    /// Fresh state: no text, no filters, default sort, page 1.
    ///
    /// `allowed` lists the narrowing filters this view supports.
    #[must_use]
    pub fn new(page_size: u32, allowed: &'static [FilterName]) -> Self {
        Self {
            free_text: String::new(),
            filters: BTreeMap::new(),
            sort_by: S::default(),
            page: 1,
            page_size: page_size.max(1),
            allowed,
        }
    }

    /// Free-text query as typed.
    #[must_use]
    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    /// Current value of a filter (empty when unset).
    #[must_use]
    pub fn filter(&self, name: FilterName) -> &str {
        if name == FilterName::SortBy {
            return self.sort_by.as_str();
        }
        self.filters.get(&name).map_or("", String::as_str)
    }

    /// Current sort.
    #[must_use]
    pub const fn sort_by(&self) -> S {
        self.sort_by
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Fixed page size of the view.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Replace the free-text query. Resets to page 1.
    pub fn set_free_text(&mut self, text: impl Into<String>) {
        self.free_text = text.into();
        self.page = 1;
    }

    /// Set a structured filter; an empty value clears it. Resets to page 1.
    ///
    /// For [`FilterName::SortBy`] an empty value restores the default sort.
    pub fn set_filter(&mut self, name: FilterName, value: &str) -> ViewResult<()> {
        let value = value.trim();

        if name == FilterName::SortBy {
            self.sort_by = if value.is_empty() {
                S::default()
            } else {
                S::parse(value).ok_or_else(|| {
                    ViewError::validation(name.wire_name(), format!("unknown sort order '{value}'"))
                })?
            };
        } else if !self.allowed.contains(&name) {
            return Err(ViewError::validation(
                name.wire_name(),
                "filter not available in this view",
            ));
        } else if value.is_empty() {
            self.filters.remove(&name);
        } else {
            self.filters.insert(name, value.to_string());
        }

        self.page = 1;
        Ok(())
    }

    /// Set the sort order. Resets to page 1.
    pub fn set_sort(&mut self, sort: S) {
        self.sort_by = sort;
        self.page = 1;
    }

    /// Move to page `n` (at least 1). Range clamping against the last result
    /// is the coordinator's job.
    pub fn set_page(&mut self, n: u32) {
        self.page = n.max(1);
    }

    /// Reset everything to defaults in one step.
    pub fn clear_all(&mut self) {
        *self = Self::new(self.page_size, self.allowed);
    }

    /// Number of narrowing filters with a value.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        self.filters.len()
    }

    /// Active narrowing filters, in parameter order (one chip each).
    #[must_use]
    pub fn active_filters(&self) -> Vec<(FilterName, &str)> {
        self.filters.iter().map(|(name, value)| (*name, value.as_str())).collect()
    }

    /// Whether the next request goes down the search path.
    #[must_use]
    pub fn is_search(&self) -> bool {
        !self.free_text.trim().is_empty()
    }

    /// Build the request this state calls for.
    #[must_use]
    pub fn to_retrieval(&self) -> Retrieval {
        if self.is_search() {
            Retrieval::Search(SearchRequest {
                query: self.free_text.trim().to_string(),
                filters: self.filters.iter().map(|(n, v)| (*n, v.clone())).collect(),
                sort_by: Some(self.sort_by.as_str()),
                page: self.page,
                page_size: self.page_size,
            })
        } else {
            Retrieval::Browse(BrowseRequest::new(self.page, self.page_size, self.sort_by.as_str()))
        }
    }
}
