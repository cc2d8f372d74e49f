//! List view coordinator: turns query state into retrievals and commits only
//! the newest response.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::debounce::Debouncer;
use super::pagination::{PageControls, clamp_page};
use super::request::{BrowseRequest, Retrieval, SearchRequest};
use super::state::{FilterName, QueryState};
use crate::config::views::DEBOUNCE;
use crate::error::{ClientError, ClientResult, ViewError, ViewResult};
use crate::events::{EventBus, ListKind};
use crate::models::{ResultPage, SortOrder};

/// Backend access for one list view.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    /// Row type.
    type Item: Clone + Send + Sync + 'static;
    /// Sort orders the view offers.
    type Sort: SortOrder;

    /// Which list this is.
    const KIND: ListKind;
    /// Narrowing filters the view exposes.
    const FILTERS: &'static [FilterName];

    /// Unfiltered, server-paged listing.
    async fn browse(&self, request: &BrowseRequest) -> ClientResult<ResultPage<Self::Item>>;

    /// Free-text search with filters.
    async fn search(&self, request: &SearchRequest) -> ClientResult<ResultPage<Self::Item>>;
}

/// A list whose rows can be deleted in place.
#[async_trait]
pub trait DeletableSource: ListSource {
    /// Noun used in notifications ("Paper", "Author").
    const ITEM_NAME: &'static str;

    /// Delete one row by id.
    async fn delete(&self, id: &str) -> ClientResult<()>;
}

/// What happened to a retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Response committed as the current results.
    Committed,
    /// A newer request was issued meanwhile; response dropped.
    Discarded,
    /// Request failed; previous results kept.
    Failed,
}

/// Coarse display state of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    /// Nothing fetched yet.
    Idle,
    /// A retrieval is in flight.
    Loading,
    /// Results available.
    Ready,
    /// The last retrieval matched nothing.
    Empty,
}

/// Point-in-time snapshot of a list view.
#[derive(Debug, Clone)]
pub struct ListView<T, S: SortOrder> {
    /// Query state.
    pub state: QueryState<S>,
    /// Last committed results.
    pub results: Option<ResultPage<T>>,
    /// Whether a retrieval is in flight.
    pub loading: bool,
    /// Pagination bar.
    pub controls: PageControls,
}

impl<T, S: SortOrder> ListView<T, S> {
    /// Display state.
    #[must_use]
    pub fn status(&self) -> ViewStatus {
        if self.loading {
            return ViewStatus::Loading;
        }
        match &self.results {
            None => ViewStatus::Idle,
            Some(page) if page.is_empty() => ViewStatus::Empty,
            Some(_) => ViewStatus::Ready,
        }
    }

    /// Items on the current page.
    #[must_use]
    pub fn items(&self) -> &[T] {
        self.results.as_ref().map_or(&[], |p| p.items.as_slice())
    }
}

struct Committed<T> {
    page: Option<ResultPage<T>>,
    loading: bool,
}

struct Inner<L: ListSource> {
    source: L,
    events: EventBus,
    state: RwLock<QueryState<L::Sort>>,
    committed: RwLock<Committed<L::Item>>,
    issued: AtomicU64,
    debounce: Debouncer,
    live_search: bool,
}

/// Coordinates one list view.
///
/// Every retrieval gets a sequence number; a response is committed only if no
/// newer retrieval was issued while it was in flight.
pub struct QueryCoordinator<L: ListSource> {
    inner: Arc<Inner<L>>,
}

impl<L: ListSource> Clone for QueryCoordinator<L> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<L: ListSource> std::fmt::Debug for QueryCoordinator<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCoordinator")
            .field("kind", &L::KIND)
            .field("issued", &self.inner.issued.load(Ordering::SeqCst))
            .field("live_search", &self.inner.live_search)
            .finish_non_exhaustive()
    }
}

impl<L: ListSource> QueryCoordinator<L> {
    /// Coordinator whose text query runs only on explicit submit.
    #[must_use]
    pub fn new(source: L, page_size: u32, events: EventBus) -> Self {
        Self::build(source, page_size, events, DEBOUNCE, false)
    }

    /// Coordinator that also searches as the user types, after `delay` of
    /// inactivity.
    #[must_use]
    pub fn with_live_search(source: L, page_size: u32, events: EventBus, delay: Duration) -> Self {
        Self::build(source, page_size, events, delay, true)
    }

    fn build(source: L, page_size: u32, events: EventBus, delay: Duration, live_search: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                events,
                state: RwLock::new(QueryState::new(page_size, L::FILTERS)),
                committed: RwLock::new(Committed { page: None, loading: false }),
                issued: AtomicU64::new(0),
                debounce: Debouncer::new(delay),
                live_search,
            }),
        }
    }

    /// Which list this coordinates.
    #[must_use]
    pub const fn kind(&self) -> ListKind {
        L::KIND
    }

    /// Backend source.
    #[must_use]
    pub fn source(&self) -> &L {
        &self.inner.source
    }

    /// Copy of the current query state.
    pub async fn state(&self) -> QueryState<L::Sort> {
        self.inner.state.read().await.clone()
    }

    /// Edit the query state without retrieving. The next [`Self::submit_search`]
    /// sends every staged edit in a single request.
    pub async fn stage<R>(&self, edit: impl FnOnce(&mut QueryState<L::Sort>) -> R) -> R {
        edit(&mut *self.inner.state.write().await)
    }

    /// Snapshot for rendering.
    pub async fn view(&self) -> ListView<L::Item, L::Sort> {
        let state = self.state().await;
        let committed = self.inner.committed.read().await;
        let controls = committed.page.as_ref().map_or_else(
            || PageControls::new(state.page(), 1),
            |p| PageControls::new(p.page, p.total_pages),
        );
        ListView { state, results: committed.page.clone(), loading: committed.loading, controls }
    }

    /// Whether a debounced text search is waiting to fire.
    #[must_use]
    pub fn has_pending_search(&self) -> bool {
        self.inner.debounce.is_pending()
    }

    /// Update the free-text query. With live search on, a retrieval follows
    /// once typing pauses; otherwise nothing is sent until [`Self::submit_search`].
    pub async fn set_free_text(&self, text: impl Into<String>) {
        self.inner.state.write().await.set_free_text(text);

        if self.inner.live_search {
            let this = self.clone();
            self.inner.debounce.schedule(async move {
                this.refresh().await;
            });
        }
    }

    /// Update a structured filter. Narrowing filters wait for
    /// [`Self::submit_search`]; a sort change retrieves immediately.
    pub async fn set_filter(&self, name: FilterName, value: &str) -> ViewResult<Option<RefreshOutcome>> {
        let sort_changed = {
            let mut state = self.inner.state.write().await;
            let before = state.sort_by();
            state.set_filter(name, value)?;
            state.sort_by() != before
        };

        if sort_changed { Ok(Some(self.refresh_now().await)) } else { Ok(None) }
    }

    /// Change the sort; retrieves if it changed.
    pub async fn set_sort(&self, sort: L::Sort) -> Option<RefreshOutcome> {
        {
            let mut state = self.inner.state.write().await;
            if state.sort_by() == sort {
                return None;
            }
            state.set_sort(sort);
        }
        Some(self.refresh_now().await)
    }

    /// Remove one filter chip and retrieve.
    pub async fn remove_filter(&self, name: FilterName) -> ViewResult<RefreshOutcome> {
        self.inner.state.write().await.set_filter(name, "")?;
        Ok(self.refresh_now().await)
    }

    /// Jump to page `n`, clamped to the last known page count. Retrieves if
    /// the page changed.
    pub async fn set_page(&self, n: u32) -> Option<RefreshOutcome> {
        let total_pages =
            self.inner.committed.read().await.page.as_ref().map_or(1, |p| p.total_pages);
        let target = clamp_page(n, total_pages);

        {
            let mut state = self.inner.state.write().await;
            if state.page() == target {
                return None;
            }
            state.set_page(target);
        }
        Some(self.refresh_now().await)
    }

    /// Next page, if there is one.
    pub async fn next_page(&self) -> Option<RefreshOutcome> {
        let page = self.inner.state.read().await.page();
        self.set_page(page.saturating_add(1)).await
    }

    /// Previous page, if there is one.
    pub async fn previous_page(&self) -> Option<RefreshOutcome> {
        let page = self.inner.state.read().await.page();
        if page <= 1 {
            return None;
        }
        self.set_page(page - 1).await
    }

    /// Reset text, filters, sort and page together, then retrieve.
    pub async fn clear_all(&self) -> RefreshOutcome {
        self.inner.state.write().await.clear_all();
        self.refresh_now().await
    }

    /// Explicit Search/Apply: drop any pending debounced search and retrieve now.
    pub async fn submit_search(&self) -> RefreshOutcome {
        self.refresh_now().await
    }

    /// Retrieval driven by an explicit action. The state it reads already
    /// includes any typed text, so a pending debounced search is dropped.
    async fn refresh_now(&self) -> RefreshOutcome {
        if self.inner.debounce.cancel() {
            tracing::debug!(list = ?L::KIND, "Superseded pending debounced search");
        }
        self.refresh().await
    }

    /// Retrieve for the current state and commit if still the newest request.
    pub async fn refresh(&self) -> RefreshOutcome {
        let inner = &self.inner;

        let (retrieval, seq) = {
            let state = inner.state.write().await;
            (state.to_retrieval(), inner.issued.fetch_add(1, Ordering::SeqCst) + 1)
        };
        inner.committed.write().await.loading = true;

        tracing::debug!(
            list = ?L::KIND,
            seq,
            search = retrieval.is_search(),
            page = retrieval.page(),
            "Issuing retrieval"
        );

        let result = match &retrieval {
            Retrieval::Browse(request) => inner.source.browse(request).await,
            Retrieval::Search(request) => inner.source.search(request).await,
        };

        let mut committed = inner.committed.write().await;
        if inner.issued.load(Ordering::SeqCst) != seq {
            tracing::debug!(list = ?L::KIND, seq, "Discarding stale response");
            return RefreshOutcome::Discarded;
        }
        committed.loading = false;

        match result {
            Ok(page) => {
                tracing::debug!(
                    list = ?L::KIND,
                    seq,
                    total = page.total_count,
                    items = page.items.len(),
                    "Committed results"
                );
                let served_page = page.page;
                committed.page = Some(page);
                drop(committed);

                let mut state = inner.state.write().await;
                if inner.issued.load(Ordering::SeqCst) == seq && state.page() != served_page {
                    state.set_page(served_page);
                }
                RefreshOutcome::Committed
            }
            Err(e) => {
                drop(committed);
                tracing::warn!(list = ?L::KIND, seq, retryable = e.is_retryable(), error = %e, "Retrieval failed");
                report(&inner.events, e);
                RefreshOutcome::Failed
            }
        }
    }
}

impl<L: DeletableSource> QueryCoordinator<L> {
    /// Delete a row, then retrieve the current page again.
    pub async fn delete_item(&self, id: &str) -> ViewResult<RefreshOutcome> {
        match self.inner.source.delete(id).await {
            Ok(()) => {
                tracing::info!(list = ?L::KIND, id, "Deleted");
                self.inner.events.success(format!("{} deleted successfully", L::ITEM_NAME));
                Ok(self.refresh_now().await)
            }
            Err(e) => {
                let auth_failure = e.is_auth_failure();
                let error = ViewError::Client(e);
                if !auth_failure {
                    self.inner.events.error(format!("Failed to delete: {}", error.to_user_message()));
                }
                Err(error)
            }
        }
    }
}

/// Surface a failed call as an error notification. Session rejections are
/// already handled by the HTTP adapter.
fn report(events: &EventBus, error: ClientError) {
    if error.is_auth_failure() {
        return;
    }
    events.error(ViewError::Client(error).to_user_message());
}
