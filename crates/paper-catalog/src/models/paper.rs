//! Paper data model matching the catalog backend schema.

use serde::{Deserialize, Serialize};

use super::de::{self, IdValue};
use crate::config::views;

/// A research paper from the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPaper")]
pub struct Paper {
    /// Catalog identifier (read from `paper_id` or `_id`).
    pub paper_id: String,

    /// Paper title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Paper abstract.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#abstract: Option<String>,

    /// Publication year.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    /// Journal or venue name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal: Option<String>,

    /// Author names, in publication order.
    pub authors: Vec<String>,

    /// Digital Object Identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    /// Number of citations this paper has received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<i32>,

    /// Subject keywords (no duplicates).
    pub keywords: Vec<String>,

    /// Flagged as COVID-19 related.
    pub is_covid19: bool,

    /// Full text is available in the catalog.
    pub has_full_text: bool,

    /// Journal volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    /// Journal issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    /// Page range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,

    /// Publisher or ingest source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// When the record was added to the catalog (RFC 3339).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Paper {
    /// Get the paper title, falling back to "Untitled" if not available.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }

    /// Get citation count or 0 if not available.
    #[must_use]
    pub fn citations(&self) -> i32 {
        self.citation_count.unwrap_or(0)
    }

    /// Resolver link for the DOI, if any.
    #[must_use]
    pub fn doi_url(&self) -> Option<String> {
        self.doi.as_deref().filter(|d| !d.is_empty()).map(|d| format!("https://doi.org/{d}"))
    }

    /// Whether `year` is an acceptable publication year given the current year.
    #[must_use]
    pub const fn accepts_year(year: i32, current_year: i32) -> bool {
        year >= views::MIN_YEAR && year <= current_year + 1
    }
}

/// Wire shape of a paper; tolerates every key variant the backend has used.
#[derive(Deserialize)]
struct RawPaper {
    #[serde(default)]
    paper_id: Option<IdValue>,
    #[serde(default, rename = "_id")]
    document_id: Option<IdValue>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, rename = "abstract")]
    summary: Option<String>,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    publish_year: Option<i32>,
    #[serde(default)]
    journal: Option<String>,
    #[serde(default)]
    journal_name: Option<String>,
    #[serde(default, deserialize_with = "de::name_list")]
    authors: Vec<String>,
    #[serde(default)]
    doi: Option<String>,
    #[serde(default)]
    citation_count: Option<i32>,
    #[serde(default, deserialize_with = "de::keyword_set")]
    keywords: Vec<String>,
    #[serde(default)]
    is_covid19: Option<bool>,
    #[serde(default)]
    has_full_text: Option<bool>,
    #[serde(default)]
    volume: Option<IdValue>,
    #[serde(default)]
    issue: Option<IdValue>,
    #[serde(default)]
    pages: Option<IdValue>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

impl TryFrom<RawPaper> for Paper {
    type Error = String;

    fn try_from(raw: RawPaper) -> Result<Self, Self::Error> {
        let paper_id = raw
            .paper_id
            .and_then(IdValue::into_id)
            .or_else(|| raw.document_id.and_then(IdValue::into_id))
            .ok_or_else(|| "paper record has no identifier".to_string())?;

        Ok(Self {
            paper_id,
            title: raw.title,
            r#abstract: raw.summary,
            year: raw.year.or(raw.publish_year),
            journal: raw.journal.or(raw.journal_name).filter(|j| !j.is_empty()),
            authors: raw.authors,
            doi: raw.doi.filter(|d| !d.is_empty()),
            citation_count: raw.citation_count,
            keywords: raw.keywords,
            is_covid19: raw.is_covid19.unwrap_or(false),
            has_full_text: raw.has_full_text.unwrap_or(false),
            volume: raw.volume.and_then(IdValue::into_id),
            issue: raw.issue.and_then(IdValue::into_id),
            pages: raw.pages.and_then(IdValue::into_id),
            source: raw.source,
            created_at: raw.created_at,
        })
    }
}

/// `GET /papers/:id` answers with either a bare paper or `{ "paper": … }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PaperEnvelope {
    /// Wrapped form.
    Wrapped {
        /// The paper.
        paper: Paper,
    },
    /// Bare form.
    Bare(Paper),
}

impl PaperEnvelope {
    /// Unwrap to the contained paper.
    #[must_use]
    pub fn into_paper(self) -> Paper {
        match self {
            Self::Wrapped { paper } | Self::Bare(paper) => paper,
        }
    }
}

/// Body for `POST /papers`, `PUT /papers/:id` and `POST /papers/bulk`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInput {
    /// Client-chosen id for new papers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,

    /// Paper title (required).
    pub title: String,

    /// Paper abstract.
    #[serde(default)]
    pub r#abstract: String,

    /// Publication year.
    #[serde(default)]
    pub year: Option<i32>,

    /// Digital Object Identifier.
    #[serde(default)]
    pub doi: String,

    /// Journal name.
    #[serde(default)]
    pub journal: String,

    /// Author names in order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// COVID-19 flag.
    #[serde(default)]
    pub is_covid19: bool,

    /// Full text flag.
    #[serde(default)]
    pub has_full_text: bool,
}
