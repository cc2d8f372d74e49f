//! List view coordinator behavior against a scripted in-process source.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use paper_catalog::error::{ClientError, ClientResult};
use paper_catalog::events::{EventBus, ListKind, NotificationLevel, UiEvent};
use paper_catalog::models::{PaperSort, ResultPage};
use paper_catalog::query::{
    BrowseRequest, FilterName, ListSource, QueryCoordinator, RefreshOutcome, Retrieval, SearchRequest, ViewStatus,
};

/// Source that records every request and answers after a short delay.
#[derive(Clone, Default)]
struct ScriptedSource {
    log: Arc<Mutex<Vec<Retrieval>>>,
    total: u64,
    slow_page: Option<u32>,
    failing: Arc<AtomicBool>,
}

impl ScriptedSource {
    fn with_total(total: u64) -> Self {
        Self { total, ..Default::default() }
    }

    fn requests(&self) -> Vec<Retrieval> {
        self.log.lock().unwrap().clone()
    }

    async fn answer(&self, page: u32) -> ClientResult<()> {
        let delay = if self.slow_page == Some(page) { 200 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClientError::server(500, "boom"));
        }
        Ok(())
    }
}

#[async_trait]
impl ListSource for ScriptedSource {
    type Item = String;
    type Sort = PaperSort;

    const KIND: ListKind = ListKind::Papers;
    const FILTERS: &'static [FilterName] = FilterName::NARROWING;

    async fn browse(&self, request: &BrowseRequest) -> ClientResult<ResultPage<String>> {
        self.log.lock().unwrap().push(Retrieval::Browse(request.clone()));
        self.answer(request.page).await?;
        let items = (0..request.limit).map(|i| format!("p{}-{i}", request.page)).collect();
        Ok(ResultPage::new(items, self.total, request.page, request.limit))
    }

    async fn search(&self, request: &SearchRequest) -> ClientResult<ResultPage<String>> {
        self.log.lock().unwrap().push(Retrieval::Search(request.clone()));
        self.answer(request.page).await?;
        let all = (0..self.total).map(|i| format!("{}-{i}", request.query)).collect();
        Ok(ResultPage::from_full_set(all, None, request.page, request.page_size))
    }
}

fn coordinator(source: ScriptedSource) -> (QueryCoordinator<ScriptedSource>, EventBus) {
    let events = EventBus::default();
    (QueryCoordinator::new(source, 10, events.clone()), events)
}

#[tokio::test(start_paused = true)]
async fn test_initial_browse_commits_first_page() {
    let source = ScriptedSource::with_total(50);
    let (view, _events) = coordinator(source.clone());

    assert_eq!(view.view().await.status(), ViewStatus::Idle);
    assert_eq!(view.refresh().await, RefreshOutcome::Committed);

    let snapshot = view.view().await;
    assert_eq!(snapshot.status(), ViewStatus::Ready);
    assert_eq!(snapshot.items().len(), 10);
    assert_eq!(snapshot.controls.total_pages, 5);
    assert!(snapshot.controls.has_next);
    assert!(!snapshot.controls.has_previous);

    assert_eq!(source.requests(), vec![Retrieval::Browse(BrowseRequest::new(1, 10, "recent"))]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_response_is_discarded() {
    let source = ScriptedSource { slow_page: Some(3), ..ScriptedSource::with_total(50) };
    let (view, _events) = coordinator(source.clone());
    view.refresh().await;

    let slow = {
        let view = view.clone();
        tokio::spawn(async move { view.set_page(3).await })
    };
    // Let the page-3 request go out before asking for page 2.
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(view.set_page(2).await, Some(RefreshOutcome::Committed));
    assert_eq!(slow.await.unwrap(), Some(RefreshOutcome::Discarded));

    let snapshot = view.view().await;
    let page = snapshot.results.unwrap();
    assert_eq!(page.page, 2);
    assert_eq!(page.items[0], "p2-0");
    assert_eq!(snapshot.state.page(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failure_keeps_previous_results() {
    let source = ScriptedSource::with_total(50);
    let (view, events) = coordinator(source.clone());
    let mut rx = events.subscribe();
    view.refresh().await;

    source.failing.store(true, Ordering::SeqCst);
    assert_eq!(view.set_page(2).await, Some(RefreshOutcome::Failed));

    let snapshot = view.view().await;
    assert_eq!(snapshot.status(), ViewStatus::Ready);
    assert_eq!(snapshot.results.unwrap().page, 1);

    match rx.recv().await.unwrap() {
        UiEvent::Notify(n) => assert_eq!(n.level, NotificationLevel::Error),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_search_with_no_matches_is_empty() {
    let source = ScriptedSource::with_total(0);
    let (view, _events) = coordinator(source.clone());

    view.set_free_text("  zebrafish  ").await;
    assert!(source.requests().is_empty());

    assert_eq!(view.submit_search().await, RefreshOutcome::Committed);
    let snapshot = view.view().await;
    assert_eq!(snapshot.status(), ViewStatus::Empty);
    assert_eq!(snapshot.controls.total_pages, 1);

    match source.requests().last() {
        Some(Retrieval::Search(request)) => assert_eq!(request.query, "zebrafish"),
        other => panic!("expected a search, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_set_page_clamps_to_known_pages() {
    let source = ScriptedSource::with_total(50);
    let (view, _events) = coordinator(source.clone());
    view.refresh().await;

    assert_eq!(view.set_page(99).await, Some(RefreshOutcome::Committed));
    assert_eq!(view.state().await.page(), 5);

    // Already there: nothing is sent.
    assert_eq!(view.set_page(5).await, None);
    assert_eq!(view.next_page().await, None);
    assert_eq!(source.requests().len(), 2);

    assert_eq!(view.previous_page().await, Some(RefreshOutcome::Committed));
    assert_eq!(view.state().await.page(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_filter_change_resets_page_and_waits_for_submit() {
    let source = ScriptedSource::with_total(50);
    let (view, _events) = coordinator(source.clone());
    view.refresh().await;
    view.set_page(3).await;

    view.set_free_text("graph").await;
    assert_eq!(view.set_filter(FilterName::Journal, "Nature").await.unwrap(), None);
    assert_eq!(view.state().await.page(), 1);
    assert_eq!(source.requests().len(), 2);

    view.submit_search().await;
    match source.requests().last() {
        Some(Retrieval::Search(request)) => {
            assert_eq!(request.query, "graph");
            assert_eq!(request.filters, vec![(FilterName::Journal, "Nature".to_string())]);
            assert_eq!(request.sort_by, Some("recent"));
            assert_eq!(request.page, 1);
        }
        other => panic!("expected a search, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_sort_change_retrieves_immediately() {
    let source = ScriptedSource::with_total(50);
    let (view, _events) = coordinator(source.clone());
    view.refresh().await;
    view.set_page(2).await;

    assert_eq!(view.set_sort(PaperSort::Citations).await, Some(RefreshOutcome::Committed));
    assert_eq!(view.set_sort(PaperSort::Citations).await, None);

    assert_eq!(source.requests().last(), Some(&Retrieval::Browse(BrowseRequest::new(1, 10, "citations"))));
}

#[tokio::test(start_paused = true)]
async fn test_sort_filter_rejects_unknown_value() {
    let (view, _events) = coordinator(ScriptedSource::with_total(5));

    let err = view.set_filter(FilterName::SortBy, "popularity").await.unwrap_err();
    assert!(err.is_local());
    assert_eq!(view.state().await.sort_by(), PaperSort::Recent);
}

#[tokio::test(start_paused = true)]
async fn test_clear_all_returns_to_browse() {
    let source = ScriptedSource::with_total(50);
    let (view, _events) = coordinator(source.clone());
    view.set_free_text("graph").await;
    view.set_filter(FilterName::YearFrom, "2019").await.unwrap();
    view.submit_search().await;

    assert_eq!(view.clear_all().await, RefreshOutcome::Committed);

    let state = view.state().await;
    assert_eq!(state.free_text(), "");
    assert_eq!(state.active_filter_count(), 0);
    assert_eq!(source.requests().last(), Some(&Retrieval::Browse(BrowseRequest::new(1, 10, "recent"))));
}

#[tokio::test(start_paused = true)]
async fn test_typing_pause_issues_one_search() {
    let source = ScriptedSource::with_total(3);
    let view = QueryCoordinator::with_live_search(
        source.clone(),
        10,
        EventBus::default(),
        Duration::from_millis(500),
    );

    view.set_free_text("ne").await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    view.set_free_text("neural").await;
    assert!(view.has_pending_search());

    tokio::time::sleep(Duration::from_millis(600)).await;

    let requests = source.requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        Retrieval::Search(request) => assert_eq!(request.query, "neural"),
        other => panic!("expected a search, got {other:?}"),
    }
    assert_eq!(view.view().await.items().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_explicit_search_supersedes_pending_one() {
    let source = ScriptedSource::with_total(3);
    let view = QueryCoordinator::with_live_search(
        source.clone(),
        10,
        EventBus::default(),
        Duration::from_millis(500),
    );

    view.set_free_text("neural").await;
    assert_eq!(view.submit_search().await, RefreshOutcome::Committed);
    assert!(!view.has_pending_search());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.requests().len(), 1);
}

fn live_view(source: ScriptedSource) -> QueryCoordinator<ScriptedSource> {
    QueryCoordinator::with_live_search(source, 10, EventBus::default(), Duration::from_millis(500))
}

fn searched_pages(source: &ScriptedSource) -> Vec<(String, Option<&'static str>, u32)> {
    source
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            Retrieval::Search(s) => Some((s.query, s.sort_by, s.page)),
            Retrieval::Browse(_) => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_sort_change_while_typing_sends_one_search() {
    let source = ScriptedSource::with_total(50);
    let view = live_view(source.clone());

    view.set_free_text("neural").await;
    assert_eq!(view.set_sort(PaperSort::Citations).await, Some(RefreshOutcome::Committed));
    assert!(!view.has_pending_search());

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(searched_pages(&source), vec![("neural".to_string(), Some("citations"), 1)]);
}

#[tokio::test(start_paused = true)]
async fn test_page_change_while_typing_sends_one_search() {
    let source = ScriptedSource::with_total(50);
    let view = live_view(source.clone());
    view.refresh().await;

    view.set_free_text("neural").await;
    assert_eq!(view.set_page(2).await, Some(RefreshOutcome::Committed));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.requests().len(), 2);
    assert_eq!(searched_pages(&source), vec![("neural".to_string(), Some("recent"), 2)]);
}

#[tokio::test(start_paused = true)]
async fn test_removing_chip_while_typing_sends_one_search() {
    let source = ScriptedSource::with_total(5);
    let view = live_view(source.clone());

    view.set_filter(FilterName::Journal, "Nature").await.unwrap();
    view.set_free_text("neural").await;
    view.remove_filter(FilterName::Journal).await.unwrap();

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_staged_edits_go_out_in_one_request() {
    let source = ScriptedSource::with_total(50);
    let (view, _events) = coordinator(source.clone());

    view.stage(|state| {
        state.set_free_text("neural");
        state.set_filter(FilterName::Journal, "Nature").unwrap();
        state.set_sort(PaperSort::Citations);
        state.set_page(3);
    })
    .await;
    assert!(source.requests().is_empty());

    assert_eq!(view.submit_search().await, RefreshOutcome::Committed);
    assert_eq!(searched_pages(&source), vec![("neural".to_string(), Some("citations"), 3)]);
    assert_eq!(source.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_search_windows_the_match_set() {
    let source = ScriptedSource::with_total(25);
    let (view, _events) = coordinator(source.clone());

    view.set_free_text("graph").await;
    view.submit_search().await;
    assert_eq!(view.view().await.controls.total_pages, 3);

    view.set_page(3).await;
    let snapshot = view.view().await;
    assert_eq!(snapshot.items(), ["graph-20", "graph-21", "graph-22", "graph-23", "graph-24"]);
    assert_eq!(snapshot.results.unwrap().total_count, 25);
}
