//! Backend sources for the papers, authors and journals list views.

use std::cmp::Ordering;

use async_trait::async_trait;

use super::coordinator::{DeletableSource, ListSource, QueryCoordinator};
use super::request::{BrowseRequest, SearchRequest};
use super::state::FilterName;
use crate::client::CatalogClient;
use crate::config::views::{AUTHORS_PAGE_SIZE, JOURNALS_PAGE_SIZE, PAPERS_PAGE_SIZE};
use crate::error::ClientResult;
use crate::events::ListKind;
use crate::models::{Author, AuthorSort, JournalSort, JournalStat, Paper, PaperSort, ResultPage, SortOrder};

/// Papers list view.
pub type PapersView = QueryCoordinator<PapersSource>;
/// Authors list view.
pub type AuthorsView = QueryCoordinator<AuthorsSource>;
/// Journals table view.
pub type JournalsView = QueryCoordinator<JournalsSource>;

/// Papers from `/papers` and `/papers/search`.
#[derive(Debug, Clone)]
pub struct PapersSource {
    client: CatalogClient,
}

impl PapersSource {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Papers view; text search and filters run on submit.
    #[must_use]
    pub fn view(client: CatalogClient) -> PapersView {
        let events = client.session().events().clone();
        QueryCoordinator::new(Self::new(client), PAPERS_PAGE_SIZE, events)
    }
}

#[async_trait]
impl ListSource for PapersSource {
    type Item = Paper;
    type Sort = PaperSort;

    const KIND: ListKind = ListKind::Papers;
    const FILTERS: &'static [FilterName] = FilterName::NARROWING;

    async fn browse(&self, request: &BrowseRequest) -> ClientResult<ResultPage<Paper>> {
        let response = self.client.browse_papers(request).await?;
        let total = if response.pagination.total > 0 {
            response.pagination.total
        } else {
            response.papers.len() as u64
        };
        Ok(ResultPage::new(response.papers, total, request.page, request.limit))
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<ResultPage<Paper>> {
        let response = self.client.search_papers(request).await?;
        Ok(ResultPage::from_full_set(response.papers, response.total, request.page, request.page_size))
    }
}

#[async_trait]
impl DeletableSource for PapersSource {
    const ITEM_NAME: &'static str = "Paper";

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.client.delete_paper(id).await
    }
}

/// Authors from `/authors` and `/authors/search`.
#[derive(Debug, Clone)]
pub struct AuthorsSource {
    client: CatalogClient,
}

impl AuthorsSource {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Authors view that searches as the user types.
    #[must_use]
    pub fn view(client: CatalogClient) -> AuthorsView {
        let events = client.session().events().clone();
        let delay = client.debounce();
        QueryCoordinator::with_live_search(Self::new(client), AUTHORS_PAGE_SIZE, events, delay)
    }
}

#[async_trait]
impl ListSource for AuthorsSource {
    type Item = Author;
    type Sort = AuthorSort;

    const KIND: ListKind = ListKind::Authors;
    const FILTERS: &'static [FilterName] = &[];

    async fn browse(&self, request: &BrowseRequest) -> ClientResult<ResultPage<Author>> {
        let response = self.client.browse_authors(request).await?;
        let total = response.total_count();
        Ok(ResultPage::new(response.authors, total, request.page, request.limit))
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<ResultPage<Author>> {
        let response = self.client.search_authors(request).await?;
        let total = response.total_count();
        Ok(ResultPage::from_full_set(response.authors, Some(total), request.page, request.page_size))
    }
}

#[async_trait]
impl DeletableSource for AuthorsSource {
    const ITEM_NAME: &'static str = "Author";

    async fn delete(&self, id: &str) -> ClientResult<()> {
        self.client.delete_author(id).await
    }
}

/// Journals from `/stats/journals`, sorted and filtered locally.
#[derive(Debug, Clone)]
pub struct JournalsSource {
    client: CatalogClient,
}

impl JournalsSource {
    /// Wrap a client.
    #[must_use]
    pub const fn new(client: CatalogClient) -> Self {
        Self { client }
    }

    /// Journals view; text filter runs on submit.
    #[must_use]
    pub fn view(client: CatalogClient) -> JournalsView {
        let events = client.session().events().clone();
        QueryCoordinator::new(Self::new(client), JOURNALS_PAGE_SIZE, events)
    }
}

#[async_trait]
impl ListSource for JournalsSource {
    type Item = JournalStat;
    type Sort = JournalSort;

    const KIND: ListKind = ListKind::Journals;
    const FILTERS: &'static [FilterName] = &[];

    async fn browse(&self, request: &BrowseRequest) -> ClientResult<ResultPage<JournalStat>> {
        let mut journals = self.client.journal_stats().await?;
        sort_journals(&mut journals, JournalSort::parse(request.sort_by).unwrap_or_default());
        Ok(ResultPage::from_full_set(journals, None, request.page, request.limit))
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<ResultPage<JournalStat>> {
        let needle = request.query.to_lowercase();
        let mut journals: Vec<JournalStat> = self
            .client
            .journal_stats()
            .await?
            .into_iter()
            .filter(|j| j.name.to_lowercase().contains(&needle))
            .collect();
        let sort = request.sort_by.and_then(JournalSort::parse).unwrap_or_default();
        sort_journals(&mut journals, sort);
        Ok(ResultPage::from_full_set(journals, None, request.page, request.page_size))
    }
}

/// Order journals for display. Ties fall back to name.
pub fn sort_journals(journals: &mut [JournalStat], sort: JournalSort) {
    let by_name = |a: &JournalStat, b: &JournalStat| a.name.to_lowercase().cmp(&b.name.to_lowercase());

    match sort {
        JournalSort::Count => journals.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| by_name(a, b))),
        JournalSort::Impact => journals.sort_by(|a, b| {
            match (a.impact_factor, b.impact_factor) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
            .then_with(|| by_name(a, b))
        }),
        JournalSort::Name => journals.sort_by(by_name),
    }
}
