//! Markdown output formatting.

use std::borrow::Cow;

use crate::config::views::{ABSTRACT_PREVIEW, CARD_KEYWORDS};
use crate::models::{Author, AuthorSort, JournalSort, JournalStat, Paper, PaperSort, Profile, ResultPage, SortOrder};
use crate::query::{FilterName, ListView, PageControls, ViewStatus};
use crate::views::Dashboard;

/// Join author names for display.
///
/// 0 names gives "Unknown", up to three are joined with "and", more than
/// three keeps the first three followed by "et al.".
#[must_use]
pub fn format_authors(names: &[String]) -> String {
    match names {
        [] => "Unknown".to_string(),
        [only] => only.clone(),
        [first, second] => format!("{first} and {second}"),
        [first, second, third] => format!("{first}, {second} and {third}"),
        [first, second, third, ..] => format!("{first}, {second}, {third} et al."),
    }
}

/// Cut `text` to at most `max_chars` characters, appending "..." when cut.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}...", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}

/// Format a paper as a list card.
#[must_use]
pub fn format_paper_card(paper: &Paper, index: u64) -> String {
    let mut output = String::new();

    output.push_str(&format!("## {}. {}\n\n", index, paper.title_or_default()));
    output.push_str(&format!("**Authors**: {}\n\n", format_authors(&paper.authors)));

    let mut meta = Vec::new();
    if let Some(journal) = &paper.journal {
        meta.push(format!("**Journal**: {journal}"));
    }
    if let Some(year) = paper.year {
        meta.push(format!("**Year**: {year}"));
    }
    meta.push(format!("**Citations**: {}", paper.citations()));
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    if let Some(abs) = paper.r#abstract.as_deref().filter(|a| !a.trim().is_empty()) {
        output.push_str(&format!("{}\n\n", truncate_chars(abs, ABSTRACT_PREVIEW)));
    }

    if !paper.keywords.is_empty() {
        let mut tags: Vec<String> =
            paper.keywords.iter().take(CARD_KEYWORDS).map(|k| format!("`{k}`")).collect();
        let hidden = paper.keywords.len().saturating_sub(CARD_KEYWORDS);
        if hidden > 0 {
            tags.push(format!("+{hidden} more"));
        }
        output.push_str(&format!("**Keywords**: {}\n\n", tags.join(" ")));
    }

    if let Some(url) = paper.doi_url() {
        output.push_str(&format!("**DOI**: [{}]({url})\n", paper.doi.as_deref().unwrap_or_default()));
    }

    output
}

/// Format the papers list view.
#[must_use]
pub fn format_papers_page(view: &ListView<Paper, PaperSort>) -> String {
    format_list_page("Papers", "papers", view, |page| {
        let mut output = String::new();
        let first = page.first_rank();
        for (offset, paper) in (0_u64..).zip(&page.items) {
            output.push_str(&format_paper_card(paper, first + offset));
            output.push_str("\n---\n\n");
        }
        output
    })
}

/// Format the authors list view as a table.
#[must_use]
pub fn format_authors_page(view: &ListView<Author, AuthorSort>, current_year: i32) -> String {
    format_list_page("Authors", "authors", view, |page| format_author_table(&page.items, current_year))
}

/// Author table: name, papers, citations, first paper year, papers/year.
#[must_use]
pub fn format_author_table(authors: &[Author], current_year: i32) -> String {
    let mut output =
        String::from("| Name | Papers | Citations | First paper | Papers/year |\n|---|---:|---:|---:|---:|\n");
    for author in authors {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            author.name_or_default(),
            author.paper_count,
            author.citation_count.map_or_else(|| "-".to_string(), |c| c.to_string()),
            author.first_paper.map_or_else(|| "-".to_string(), |y| y.to_string()),
            author.papers_per_year(current_year).map_or_else(|| "-".to_string(), |r| format!("{r:.1}")),
        ));
    }
    output
}

/// Format the journals list view as a table.
#[must_use]
pub fn format_journals_page(view: &ListView<JournalStat, JournalSort>, current_year: i32) -> String {
    format_list_page("Journals", "journals", view, |page| format_journal_table(&page.items, current_year))
}

/// Journal table: name, papers, impact factor, first year, avg papers/year.
#[must_use]
pub fn format_journal_table(journals: &[JournalStat], current_year: i32) -> String {
    let mut output = String::from(
        "| Journal | Papers | Impact factor | First year | Avg papers/year |\n|---|---:|---:|---:|---:|\n",
    );
    for journal in journals {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            journal.name,
            journal.count,
            journal.impact_factor.map_or_else(|| "-".to_string(), |f| format!("{f:.2}")),
            journal.first_year.map_or_else(|| "-".to_string(), |y| y.to_string()),
            journal.avg_papers_per_year(current_year).map_or_else(|| "-".to_string(), |r| format!("{r:.1}")),
        ));
    }
    output
}

/// Format active filters as chips.
#[must_use]
pub fn format_filter_chips(filters: &[(FilterName, &str)]) -> String {
    filters
        .iter()
        .map(|(name, value)| format!("`{}: {}`", name.label(), value))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format a pagination bar; the current page is bold.
#[must_use]
pub fn format_pagination(controls: &PageControls) -> String {
    let mut parts = Vec::new();
    if controls.has_previous {
        parts.push("« Prev".to_string());
    }
    for n in &controls.window {
        if *n == controls.page {
            parts.push(format!("**{n}**"));
        } else {
            parts.push(n.to_string());
        }
    }
    if controls.has_next {
        parts.push("Next »".to_string());
    }
    format!("Page {} of {}: {}", controls.page, controls.total_pages, parts.join(" "))
}

fn format_list_page<T, S: SortOrder>(
    title: &str,
    noun: &str,
    view: &ListView<T, S>,
    rows: impl Fn(&ResultPage<T>) -> String,
) -> String {
    let mut output = match &view.results {
        Some(page) => format!("# {title} ({} results)\n\n", page.total_count),
        None => format!("# {title}\n\n"),
    };

    let query = view.state.free_text().trim();
    if !query.is_empty() {
        output.push_str(&format!("**Search**: \"{query}\"\n\n"));
    }
    let chips = view.state.active_filters();
    if !chips.is_empty() {
        output.push_str(&format!(
            "**Filters ({})**: {}\n\n",
            view.state.active_filter_count(),
            format_filter_chips(&chips)
        ));
    }
    output.push_str(&format!("**Sort**: {}\n\n", view.state.sort_by().label()));

    match (view.status(), &view.results) {
        (ViewStatus::Empty, _) => {
            output.push_str(&format!("No {noun} found. Try adjusting your search or filters.\n"));
        }
        (_, Some(page)) => {
            output.push_str(&rows(page));
            if view.controls.is_needed() {
                output.push_str(&format!("\n{}\n", format_pagination(&view.controls)));
            }
        }
        (ViewStatus::Loading, None) => output.push_str("Loading...\n"),
        (_, None) => {}
    }

    output
}

/// Format a paper with full metadata.
#[must_use]
pub fn format_paper_details(paper: &Paper) -> String {
    let mut output = format!("# {}\n\n", paper.title_or_default());

    let mut meta = vec![format!("**ID**: {}", paper.paper_id)];
    if let Some(journal) = &paper.journal {
        meta.push(format!("**Journal**: {journal}"));
    }
    if let Some(year) = paper.year {
        meta.push(format!("**Year**: {year}"));
    }
    meta.push(format!("**Citations**: {}", paper.citations()));
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    let mut publication = Vec::new();
    if let Some(volume) = &paper.volume {
        publication.push(format!("**Volume**: {volume}"));
    }
    if let Some(issue) = &paper.issue {
        publication.push(format!("**Issue**: {issue}"));
    }
    if let Some(pages) = &paper.pages {
        publication.push(format!("**Pages**: {pages}"));
    }
    if !publication.is_empty() {
        output.push_str(&format!("{}\n\n", publication.join(" | ")));
    }

    let mut flags = Vec::new();
    if paper.is_covid19 {
        flags.push("COVID-19");
    }
    if paper.has_full_text {
        flags.push("Full text");
    }
    if !flags.is_empty() {
        output.push_str(&format!("**Flags**: {}\n\n", flags.join(", ")));
    }

    if let Some(url) = paper.doi_url() {
        output.push_str(&format!("**DOI**: [{}]({url})\n\n", paper.doi.as_deref().unwrap_or_default()));
    }
    if let Some(source) = &paper.source {
        output.push_str(&format!("**Source**: {source}\n\n"));
    }

    output.push_str("## Authors\n\n");
    if paper.authors.is_empty() {
        output.push_str("Unknown\n\n");
    } else {
        for (i, name) in paper.authors.iter().enumerate() {
            output.push_str(&format!("{}. {name}\n", i + 1));
        }
        output.push('\n');
    }

    if let Some(abs) = paper.r#abstract.as_deref().filter(|a| !a.trim().is_empty()) {
        output.push_str(&format!("## Abstract\n\n{abs}\n\n"));
    }

    if !paper.keywords.is_empty() {
        let tags: Vec<String> = paper.keywords.iter().map(|k| format!("`{k}`")).collect();
        output.push_str(&format!("## Keywords\n\n{}\n", tags.join(" ")));
    }

    output
}

/// Format the dashboard: stat cards and textual series.
#[must_use]
pub fn format_dashboard(dashboard: &Dashboard) -> String {
    let overview = &dashboard.overview;
    let mut output = String::from("# Dashboard\n\n");

    output.push_str("| Total papers | Unique authors | Journals | Years covered |\n|---:|---:|---:|---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        overview.total_papers,
        overview.unique_authors,
        overview.total_journals,
        dashboard.years_covered()
    ));

    output.push_str("## Papers per year\n\n");
    if dashboard.papers_per_year.is_empty() {
        output.push_str("No data\n\n");
    } else {
        for point in &dashboard.papers_per_year {
            output.push_str(&format!("- {}: {}\n", point.year, point.count));
        }
        output.push('\n');
    }

    output.push_str("## Top journals\n\n");
    if overview.top_journals.is_empty() {
        output.push_str("No data\n\n");
    } else {
        for (i, journal) in overview.top_journals.iter().enumerate() {
            output.push_str(&format!("{}. {} ({} papers)\n", i + 1, journal.name, journal.value));
        }
        output.push('\n');
    }

    output.push_str("## Top authors\n\n");
    if dashboard.top_authors.is_empty() {
        output.push_str("No data\n");
    } else {
        for (i, author) in dashboard.top_authors.iter().enumerate() {
            output.push_str(&format!("{}. {} ({} papers)\n", i + 1, author.author, author.papers));
        }
    }

    output
}

/// Format the signed-in user's profile.
#[must_use]
pub fn format_profile(profile: &Profile) -> String {
    let mut output = format!("# {}\n\n**Email**: {}\n", profile.name, profile.email);
    if let Some(joined) = &profile.joined {
        output.push_str(&format!("**Member since**: {joined}\n"));
    }
    if let Some(last_login) = &profile.last_login {
        output.push_str(&format!("**Last login**: {last_login}\n"));
    }
    output
}
