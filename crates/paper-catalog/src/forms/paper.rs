//! Paper create/edit form.

use chrono::{DateTime, Datelike, Utc};

use super::{FormMode, FormPhase, FormState};
use crate::client::CatalogClient;
use crate::error::{ViewError, ViewResult};
use crate::events::ListKind;
use crate::models::{Paper, PaperInput};
use crate::routes::Route;

/// Editable paper fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperDraft {
    /// Identifier; blank on create means "generate one".
    pub paper_id: String,
    /// Title (required).
    pub title: String,
    /// Abstract.
    pub r#abstract: String,
    /// Year as typed; blank means unknown.
    pub year: String,
    /// DOI.
    pub doi: String,
    /// Journal.
    pub journal: String,
    /// Comma-separated author names.
    pub authors: String,
    /// COVID-19 flag.
    pub is_covid19: bool,
    /// Full text flag.
    pub has_full_text: bool,
}

impl PaperDraft {
    /// Draft pre-filled from an existing paper.
    #[must_use]
    pub fn from_paper(paper: &Paper) -> Self {
        Self {
            paper_id: paper.paper_id.clone(),
            title: paper.title.clone().unwrap_or_default(),
            r#abstract: paper.r#abstract.clone().unwrap_or_default(),
            year: paper.year.map(|y| y.to_string()).unwrap_or_default(),
            doi: paper.doi.clone().unwrap_or_default(),
            journal: paper.journal.clone().unwrap_or_default(),
            authors: paper.authors.join(", "),
            is_covid19: paper.is_covid19,
            has_full_text: paper.has_full_text,
        }
    }

    /// Validate and convert to a request body.
    ///
    /// On create, a blank id is replaced by [`generate_paper_id`] at `now`.
    pub fn to_input(&self, mode: &FormMode, now: DateTime<Utc>) -> ViewResult<PaperInput> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ViewError::validation("title", "Title is required"));
        }

        let year = parse_year(&self.year, now.year())?;

        let paper_id = match mode {
            FormMode::Create => {
                let typed = self.paper_id.trim();
                Some(if typed.is_empty() { generate_paper_id(now) } else { typed.to_string() })
            }
            FormMode::Edit(id) => Some(id.clone()),
        };

        Ok(PaperInput {
            paper_id,
            title: title.to_string(),
            r#abstract: self.r#abstract.trim().to_string(),
            year,
            doi: self.doi.trim().to_string(),
            journal: self.journal.trim().to_string(),
            authors: parse_author_list(&self.authors),
            is_covid19: self.is_covid19,
            has_full_text: self.has_full_text,
        })
    }
}

fn parse_year(raw: &str, current_year: i32) -> ViewResult<Option<i32>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let year: i32 = raw.parse().map_err(|_| ViewError::validation("year", "Year must be a number"))?;
    if !Paper::accepts_year(year, current_year) {
        return Err(ViewError::validation(
            "year",
            format!("Year must be between 1900 and {}", current_year + 1),
        ));
    }
    Ok(Some(year))
}

/// Split comma-separated names into a trimmed, ordered list without blanks.
#[must_use]
pub fn parse_author_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(ToString::to_string).collect()
}

/// Identifier for a new paper: `P` followed by the unix time in milliseconds.
#[must_use]
pub fn generate_paper_id(now: DateTime<Utc>) -> String {
    format!("P{}", now.timestamp_millis())
}

/// Form for `/papers/new` and `/papers/:id/edit`.
#[derive(Debug)]
pub struct PaperForm {
    client: CatalogClient,
    mode: FormMode,
    state: FormState<PaperDraft>,
}

impl PaperForm {
    /// Empty form for a new paper.
    #[must_use]
    pub fn create(client: CatalogClient) -> Self {
        Self { client, mode: FormMode::Create, state: FormState::new(PaperDraft::default()) }
    }

    /// Form pre-filled with an already loaded paper.
    #[must_use]
    pub fn for_paper(client: CatalogClient, paper: &Paper) -> Self {
        Self {
            client,
            mode: FormMode::Edit(paper.paper_id.clone()),
            state: FormState::new(PaperDraft::from_paper(paper)),
        }
    }

    /// Load a paper and open it for editing.
    pub async fn edit(client: CatalogClient, paper_id: &str) -> ViewResult<Self> {
        match client.get_paper(paper_id).await {
            Ok(paper) => Ok(Self::for_paper(client, &paper)),
            Err(e) => {
                if !e.is_auth_failure() {
                    client.session().events().error("Failed to load paper");
                }
                Err(e.into())
            }
        }
    }

    /// Create or edit.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Current draft.
    pub async fn draft(&self) -> PaperDraft {
        self.state.draft().await
    }

    /// Current phase.
    pub async fn phase(&self) -> FormPhase {
        self.state.phase().await
    }

    /// Message from the last failed submit.
    pub async fn last_error(&self) -> Option<String> {
        self.state.last_error().await
    }

    /// Edit the draft. Rejected unless the form is `Editing`.
    pub async fn update(&self, apply: impl FnOnce(&mut PaperDraft) + Send) -> ViewResult<()> {
        self.state.edit(apply).await
    }

    /// Validate and save.
    pub async fn submit(&self) -> ViewResult<()> {
        let events = self.client.session().events();
        let now = Utc::now();

        let input = match self.state.begin_submit(|draft| draft.to_input(&self.mode, now)).await {
            Ok(input) => input,
            Err(e) => {
                if let ViewError::Validation { message, .. } = &e {
                    events.error(message.clone());
                }
                return Err(e);
            }
        };

        tracing::info!(mode = ?self.mode, paper_id = ?input.paper_id, "Submitting paper");
        let result = match &self.mode {
            FormMode::Create => self.client.create_paper(&input).await,
            FormMode::Edit(id) => self.client.update_paper(id, &input).await,
        };

        match result {
            Ok(()) => {
                self.state.succeed().await;
                events.success(if self.mode.is_create() {
                    "Paper created successfully"
                } else {
                    "Paper updated successfully"
                });
                events.navigate(Route::Papers);
                events.invalidate(ListKind::Papers);
                Ok(())
            }
            Err(e) => {
                let auth_failure = e.is_auth_failure();
                let error = ViewError::Client(e);
                let message = error.to_user_message();
                tracing::warn!(error = %error, "Paper submit failed");
                self.state.fail(message.clone()).await;
                if !auth_failure {
                    events.error(format!("Failed to save paper: {message}"));
                }
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_author_list() {
        assert_eq!(parse_author_list(" Ada ,, Alan,  "), vec!["Ada", "Alan"]);
        assert!(parse_author_list("  ").is_empty());
    }

    #[test]
    fn test_title_required() {
        let draft = PaperDraft { title: "   ".into(), ..Default::default() };
        let err = draft.to_input(&FormMode::Create, at(2024)).unwrap_err();
        assert!(matches!(err, ViewError::Validation { ref field, .. } if field == "title"));
    }

    #[test]
    fn test_year_bounds() {
        let mut draft = PaperDraft { title: "T".into(), year: "1899".into(), ..Default::default() };
        assert!(draft.to_input(&FormMode::Create, at(2024)).is_err());

        draft.year = "2025".into();
        assert_eq!(draft.to_input(&FormMode::Create, at(2024)).unwrap().year, Some(2025));

        draft.year = "2026".into();
        assert!(draft.to_input(&FormMode::Create, at(2024)).is_err());

        draft.year = "soon".into();
        assert!(draft.to_input(&FormMode::Create, at(2024)).is_err());
    }

    #[test]
    fn test_generated_id_on_create_only() {
        let draft = PaperDraft { title: "T".into(), ..Default::default() };
        let now = at(2024);

        let created = draft.to_input(&FormMode::Create, now).unwrap();
        assert_eq!(created.paper_id, Some(format!("P{}", now.timestamp_millis())));

        let edited = draft.to_input(&FormMode::Edit("P42".into()), now).unwrap();
        assert_eq!(edited.paper_id.as_deref(), Some("P42"));
    }

    #[test]
    fn test_draft_from_paper_joins_authors() {
        let paper = Paper {
            paper_id: "P9".into(),
            title: Some("Graphs".into()),
            authors: vec!["Ada".into(), "Alan".into()],
            year: Some(2001),
            ..Default::default()
        };
        let draft = PaperDraft::from_paper(&paper);
        assert_eq!(draft.authors, "Ada, Alan");
        assert_eq!(draft.year, "2001");
    }
}
