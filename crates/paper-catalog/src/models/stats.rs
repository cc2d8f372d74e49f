//! Aggregate statistics served under `/stats`.

use serde::{Deserialize, Serialize};

/// `GET /stats/overview` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Overview {
    /// Papers in the catalog.
    #[serde(alias = "total_papers")]
    pub total_papers: u64,

    /// Distinct authors.
    #[serde(alias = "unique_authors")]
    pub unique_authors: u64,

    /// Distinct journals.
    #[serde(alias = "total_journals")]
    pub total_journals: u64,

    /// Papers per publication year.
    #[serde(alias = "papers_per_year")]
    pub papers_per_year: Vec<YearCount>,

    /// Journals with the most papers.
    #[serde(alias = "top_journals")]
    pub top_journals: Vec<TopJournal>,

    /// Authors with the most papers.
    #[serde(alias = "top_authors")]
    pub top_authors: Vec<AuthorStat>,
}

impl Overview {
    /// Number of distinct years with at least one paper.
    #[must_use]
    pub fn years_covered(&self) -> usize {
        self.papers_per_year.iter().filter(|y| y.count > 0).count()
    }
}

/// One point of the papers-per-year series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    /// Publication year.
    pub year: i32,
    /// Papers published that year.
    #[serde(default)]
    pub count: u64,
}

/// A journal in a top-N list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopJournal {
    /// Journal name.
    pub name: String,
    /// Paper count.
    #[serde(default, alias = "count")]
    pub value: u64,
}

/// An author in a top-N list (`/stats/authors`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStat {
    /// Author name.
    #[serde(alias = "name")]
    pub author: String,
    /// Paper count.
    #[serde(default, alias = "paper_count")]
    pub papers: u64,
}

/// Journal aggregate row (`/stats/journals`).
///
/// Not a persisted entity; the impact factor is a display figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalStat {
    /// Journal name.
    #[serde(alias = "_id", alias = "journal")]
    pub name: String,

    /// Papers in the catalog.
    #[serde(default, alias = "paper_count", alias = "papers")]
    pub count: u64,

    /// Displayed impact factor.
    #[serde(default)]
    pub impact_factor: Option<f64>,

    /// First year the journal appears in the catalog.
    #[serde(default)]
    pub first_year: Option<i32>,
}

impl JournalStat {
    /// Average papers per year since `first_year`, inclusive.
    #[must_use]
    pub fn avg_papers_per_year(&self, current_year: i32) -> Option<f64> {
        let first = self.first_year?;
        let span = (current_year - first + 1).max(1);
        Some(self.count as f64 / f64::from(span))
    }
}
