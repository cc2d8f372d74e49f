//! Author data model matching the catalog backend schema.

use serde::{Deserialize, Serialize};

use super::de::IdValue;

/// An author in the catalog.
///
/// `paper_count` is a server-side aggregate; the client never writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAuthor")]
pub struct Author {
    /// Catalog identifier (read from `author_id` or `_id`).
    pub author_id: String,

    /// Author name.
    pub name: String,

    /// Number of papers linked to this author.
    pub paper_count: u32,

    /// Total citations across the author's papers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u64>,

    /// Year of the author's earliest paper in the catalog.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_paper: Option<i32>,
}

impl Author {
    /// Get the author name, falling back to "Unknown" if blank.
    #[must_use]
    pub fn name_or_default(&self) -> &str {
        if self.name.trim().is_empty() { "Unknown" } else { &self.name }
    }

    /// Average papers per year since the first paper, inclusive of both ends.
    #[must_use]
    pub fn papers_per_year(&self, current_year: i32) -> Option<f64> {
        let first = self.first_paper?;
        let span = (current_year - first + 1).max(1);
        Some(f64::from(self.paper_count) / f64::from(span))
    }
}

#[derive(Deserialize)]
struct RawAuthor {
    #[serde(default)]
    author_id: Option<IdValue>,
    #[serde(default, rename = "_id")]
    document_id: Option<IdValue>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    paper_count: Option<u32>,
    #[serde(default)]
    papers: Option<u32>,
    #[serde(default)]
    citation_count: Option<u64>,
    #[serde(default)]
    citations: Option<u64>,
    #[serde(default)]
    first_paper: Option<i32>,
}

impl TryFrom<RawAuthor> for Author {
    type Error = String;

    fn try_from(raw: RawAuthor) -> Result<Self, Self::Error> {
        let author_id = raw
            .author_id
            .and_then(IdValue::into_id)
            .or_else(|| raw.document_id.and_then(IdValue::into_id))
            .ok_or_else(|| "author record has no identifier".to_string())?;

        Ok(Self {
            author_id,
            name: raw.name.or(raw.author).unwrap_or_default(),
            paper_count: raw.paper_count.or(raw.papers).unwrap_or(0),
            citation_count: raw.citation_count.or(raw.citations),
            first_paper: raw.first_paper,
        })
    }
}

/// Body for `POST /authors` and `PUT /authors/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorInput {
    /// Author name.
    pub name: String,

    /// Paper to link on creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paper_id: Option<String>,
}
