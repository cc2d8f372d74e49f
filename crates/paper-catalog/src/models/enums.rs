//! Enumeration types for view parameters.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Output format for rendered views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A sort order a list view can request.
///
/// The wire value is what goes into the `sortBy` query parameter.
pub trait SortOrder: Copy + Default + Eq + Debug + Send + Sync + 'static {
    /// Every order, in menu order.
    const ALL: &'static [Self];

    /// Wire value.
    fn as_str(self) -> &'static str;

    /// Menu label.
    fn label(self) -> &'static str;

    /// Parse a wire value.
    fn parse(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == value)
    }
}

/// Sort orders for the papers view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSort {
    /// Newest first.
    #[default]
    Recent,
    /// Most cited first.
    Citations,
    /// Title A-Z.
    Title,
}

impl SortOrder for PaperSort {
    const ALL: &'static [Self] = &[Self::Recent, Self::Citations, Self::Title];

    fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Citations => "citations",
            Self::Title => "title",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Recent => "Most Recent",
            Self::Citations => "Most Cited",
            Self::Title => "Title A-Z",
        }
    }
}

/// Sort orders for the authors view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorSort {
    /// Most papers first.
    #[default]
    Papers,
    /// Most citations first.
    Citations,
    /// Name A-Z.
    Name,
}

impl SortOrder for AuthorSort {
    const ALL: &'static [Self] = &[Self::Papers, Self::Citations, Self::Name];

    fn as_str(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Citations => "citations",
            Self::Name => "name",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Papers => "Most Papers",
            Self::Citations => "Most Citations",
            Self::Name => "Name A-Z",
        }
    }
}

/// Sort orders for the journals view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalSort {
    /// Most papers first.
    #[default]
    Count,
    /// Highest impact factor first.
    Impact,
    /// Name A-Z.
    Name,
}

impl SortOrder for JournalSort {
    const ALL: &'static [Self] = &[Self::Count, Self::Impact, Self::Name];

    fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Impact => "impact",
            Self::Name => "name",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Count => "Most Papers",
            Self::Impact => "Highest Impact",
            Self::Name => "Name A-Z",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parse_roundtrip() {
        for sort in PaperSort::ALL {
            assert_eq!(PaperSort::parse(sort.as_str()), Some(*sort));
        }
        assert_eq!(AuthorSort::parse("name"), Some(AuthorSort::Name));
        assert_eq!(JournalSort::parse("bogus"), None);
    }

    #[test]
    fn test_defaults_match_first_menu_entry() {
        assert_eq!(PaperSort::ALL[0], PaperSort::default());
        assert_eq!(AuthorSort::ALL[0], AuthorSort::default());
        assert_eq!(JournalSort::ALL[0], JournalSort::default());
    }
}
