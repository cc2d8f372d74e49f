//! Compact JSON output for machine consumers.

use serde_json::{Value, json};

use crate::models::{Author, JournalStat, Paper, SortOrder};
use crate::query::ListView;
use crate::views::Dashboard;

/// Create a compact paper representation for JSON output.
#[must_use]
pub fn compact_paper(paper: &Paper) -> Value {
    let mut obj = json!({
        "id": paper.paper_id,
        "title": paper.title_or_default(),
        "year": paper.year,
        "citations": paper.citations(),
        "authors": paper.authors,
    });

    // Add optional fields only if present
    if let Some(journal) = &paper.journal {
        obj["journal"] = json!(journal);
    }

    if let Some(doi) = paper.doi.as_deref().filter(|d| !d.is_empty()) {
        obj["doi"] = json!(doi);
    }

    if !paper.keywords.is_empty() {
        obj["keywords"] = json!(paper.keywords);
    }

    obj
}

/// Create a compact author representation for JSON output.
#[must_use]
pub fn compact_author(author: &Author) -> Value {
    let mut obj = json!({
        "id": author.author_id,
        "name": author.name_or_default(),
        "papers": author.paper_count,
    });

    if let Some(citations) = author.citation_count {
        obj["citations"] = json!(citations);
    }

    if let Some(first) = author.first_paper {
        obj["firstPaper"] = json!(first);
    }

    obj
}

/// Create a compact journal representation for JSON output.
#[must_use]
pub fn compact_journal(journal: &JournalStat) -> Value {
    let mut obj = json!({
        "name": journal.name,
        "papers": journal.count,
    });

    if let Some(impact) = journal.impact_factor {
        obj["impactFactor"] = json!(impact);
    }

    if let Some(first) = journal.first_year {
        obj["firstYear"] = json!(first);
    }

    obj
}

/// A list view snapshot: query, paging and compact rows.
#[must_use]
pub fn list_page_json<T, S: SortOrder>(view: &ListView<T, S>, item: impl Fn(&T) -> Value) -> Value {
    let filters: serde_json::Map<String, Value> = view
        .state
        .active_filters()
        .into_iter()
        .map(|(name, value)| (name.wire_name().to_string(), json!(value)))
        .collect();

    let (items, total) = view
        .results
        .as_ref()
        .map_or((Vec::new(), 0), |page| (page.items.iter().map(&item).collect(), page.total_count));

    json!({
        "query": view.state.free_text().trim(),
        "filters": filters,
        "sortBy": view.state.sort_by().as_str(),
        "page": view.controls.page,
        "totalPages": view.controls.total_pages,
        "total": total,
        "items": items,
    })
}

/// Dashboard figures and series.
#[must_use]
pub fn dashboard_json(dashboard: &Dashboard) -> Value {
    let overview = &dashboard.overview;
    json!({
        "totalPapers": overview.total_papers,
        "uniqueAuthors": overview.unique_authors,
        "totalJournals": overview.total_journals,
        "yearsCovered": dashboard.years_covered(),
        "papersPerYear": dashboard.papers_per_year,
        "topJournals": overview.top_journals,
        "topAuthors": dashboard.top_authors,
    })
}
