//! Author create/edit form with paper linking.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use super::{FormMode, FormPhase, FormState};
use crate::client::CatalogClient;
use crate::config::views::MIN_LOOKUP_CHARS;
use crate::error::{ViewError, ViewResult};
use crate::events::ListKind;
use crate::models::{AuthorInput, Paper};
use crate::query::{Debouncer, SearchRequest};
use crate::routes::Route;

/// Editable author fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorDraft {
    /// Author name (required).
    pub name: String,
    /// Paper linked on creation.
    pub linked_paper: Option<Paper>,
}

impl AuthorDraft {
    /// Validate and convert to a request body.
    ///
    /// New authors must be linked to a paper; edits only rename.
    pub fn to_input(&self, mode: &FormMode) -> ViewResult<AuthorInput> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ViewError::validation("name", "Name is required"));
        }

        let paper_id = match mode {
            FormMode::Create => Some(
                self.linked_paper
                    .as_ref()
                    .map(|p| p.paper_id.clone())
                    .ok_or_else(|| ViewError::validation("paper_id", "Please link a paper to this author"))?,
            ),
            FormMode::Edit(_) => None,
        };

        Ok(AuthorInput { name: name.to_string(), paper_id })
    }
}

struct LookupInner {
    client: CatalogClient,
    query: RwLock<String>,
    results: RwLock<Vec<Paper>>,
    searching: RwLock<bool>,
    issued: AtomicU64,
    debounce: Debouncer,
}

/// Debounced paper search used to pick the paper a new author is linked to.
///
/// Queries shorter than two characters clear the results without a request.
#[derive(Clone)]
pub struct PaperLookup {
    inner: Arc<LookupInner>,
}

impl std::fmt::Debug for PaperLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperLookup")
            .field("issued", &self.inner.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl PaperLookup {
    /// Lookup with the given debounce window.
    #[must_use]
    pub fn new(client: CatalogClient, delay: Duration) -> Self {
        Self {
            inner: Arc::new(LookupInner {
                client,
                query: RwLock::new(String::new()),
                results: RwLock::new(Vec::new()),
                searching: RwLock::new(false),
                issued: AtomicU64::new(0),
                debounce: Debouncer::new(delay),
            }),
        }
    }

    /// Update the lookup text and schedule a search.
    pub async fn set_query(&self, text: impl Into<String>) {
        let text = text.into();
        let trimmed = text.trim().to_string();
        *self.inner.query.write().await = text;
        let seq = self.inner.issued.fetch_add(1, Ordering::SeqCst) + 1;

        if trimmed.chars().count() < MIN_LOOKUP_CHARS {
            self.inner.debounce.cancel();
            *self.inner.searching.write().await = false;
            self.inner.results.write().await.clear();
            return;
        }

        let this = self.clone();
        self.inner.debounce.schedule(async move {
            this.run(seq, trimmed).await;
        });
    }

    async fn run(&self, seq: u64, query: String) {
        *self.inner.searching.write().await = true;
        let result = self.inner.client.search_papers(&SearchRequest::text(query, 1)).await;

        if self.inner.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!(seq, "Discarding stale paper lookup");
            return;
        }
        *self.inner.searching.write().await = false;

        match result {
            Ok(response) => *self.inner.results.write().await = response.papers,
            Err(e) => tracing::warn!(error = %e, "Paper lookup failed"),
        }
    }

    /// Current lookup text.
    pub async fn query(&self) -> String {
        self.inner.query.read().await.clone()
    }

    /// Papers matching the last completed lookup.
    pub async fn results(&self) -> Vec<Paper> {
        self.inner.results.read().await.clone()
    }

    /// Whether a lookup request is in flight.
    pub async fn is_searching(&self) -> bool {
        *self.inner.searching.read().await
    }

    /// Whether a lookup is waiting for typing to pause.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.debounce.is_pending()
    }

    /// Drop text, results and any pending lookup.
    pub async fn clear(&self) {
        self.inner.debounce.cancel();
        self.inner.issued.fetch_add(1, Ordering::SeqCst);
        *self.inner.searching.write().await = false;
        self.inner.query.write().await.clear();
        self.inner.results.write().await.clear();
    }
}

/// Form for `/authors/new` and `/authors/:id/edit`.
#[derive(Debug)]
pub struct AuthorForm {
    client: CatalogClient,
    mode: FormMode,
    state: FormState<AuthorDraft>,
    lookup: PaperLookup,
}

impl AuthorForm {
    /// Empty form for a new author.
    #[must_use]
    pub fn create(client: CatalogClient) -> Self {
        Self::build(client, FormMode::Create, AuthorDraft::default())
    }

    /// Load an author and open it for renaming.
    pub async fn edit(client: CatalogClient, author_id: &str) -> ViewResult<Self> {
        match client.find_author(author_id).await {
            Ok(author) => {
                let draft = AuthorDraft { name: author.name, linked_paper: None };
                Ok(Self::build(client, FormMode::Edit(author.author_id), draft))
            }
            Err(e) => {
                if !e.is_auth_failure() {
                    client.session().events().error("Failed to load author");
                }
                Err(e.into())
            }
        }
    }

    fn build(client: CatalogClient, mode: FormMode, draft: AuthorDraft) -> Self {
        let lookup = PaperLookup::new(client.clone(), client.debounce());
        Self { client, mode, state: FormState::new(draft), lookup }
    }

    /// Replace the lookup debounce window.
    #[must_use]
    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup = PaperLookup::new(self.client.clone(), delay);
        self
    }

    /// Create or edit.
    #[must_use]
    pub const fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Paper lookup for linking.
    #[must_use]
    pub const fn lookup(&self) -> &PaperLookup {
        &self.lookup
    }

    /// Current draft.
    pub async fn draft(&self) -> AuthorDraft {
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

    /// Change the name.
    pub async fn set_name(&self, name: impl Into<String> + Send) -> ViewResult<()> {
        let name = name.into();
        self.state.edit(move |d| d.name = name).await
    }

    /// Link a paper and clear the lookup.
    pub async fn select_paper(&self, paper: Paper) -> ViewResult<()> {
        self.state.edit(move |d| d.linked_paper = Some(paper)).await?;
        self.lookup.clear().await;
        Ok(())
    }

    /// Remove the linked paper.
    pub async fn unlink_paper(&self) -> ViewResult<()> {
        self.state.edit(|d| d.linked_paper = None).await
    }

    /// Validate and save.
    pub async fn submit(&self) -> ViewResult<()> {
        let events = self.client.session().events();

        let input = match self.state.begin_submit(|draft| draft.to_input(&self.mode)).await {
            Ok(input) => input,
            Err(e) => {
                if let ViewError::Validation { message, .. } = &e {
                    events.error(message.clone());
                }
                return Err(e);
            }
        };

        tracing::info!(mode = ?self.mode, "Submitting author");
        let result = match &self.mode {
            FormMode::Create => self.client.create_author(&input).await,
            FormMode::Edit(id) => self.client.update_author(id, &input).await,
        };

        match result {
            Ok(()) => {
                self.state.succeed().await;
                events.success(if self.mode.is_create() {
                    "Author created successfully"
                } else {
                    "Author updated successfully"
                });
                events.navigate(Route::Authors);
                events.invalidate(ListKind::Authors);
                Ok(())
            }
            Err(e) => {
                let auth_failure = e.is_auth_failure();
                let error = ViewError::Client(e);
                let message = error.to_user_message();
                tracing::warn!(error = %error, "Author submit failed");
                self.state.fail(message.clone()).await;
                if !auth_failure {
                    events.error(format!("Failed to save author: {message}"));
                }
                Err(error)
            }
        }
    }
}
