//! Dashboard and paper details views against a mock catalog backend.

use paper_catalog::events::{ListKind, NotificationLevel, UiEvent};
use paper_catalog::views::{DashboardView, PaperDetailsView};
use paper_catalog::{CatalogClient, Config, EventBus, Route, SessionContext};
use serde_json::json;
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> (CatalogClient, broadcast::Receiver<UiEvent>) {
    let events = EventBus::default();
    let rx = events.subscribe();
    let session = SessionContext::in_memory(events);
    (CatalogClient::new(&Config::for_testing(&server.uri()), session).unwrap(), rx)
}

fn drain(rx: &mut broadcast::Receiver<UiEvent>) -> Vec<UiEvent> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

async fn mount_overview(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/stats/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalPapers": 120,
            "uniqueAuthors": 80,
            "totalJournals": 15,
            "topJournals": [{ "name": "Nature", "value": 40 }],
            "topAuthors": [{ "author": "Overview Author", "papers": 9 }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_dashboard_loads_all_figures() {
    let mock_server = MockServer::start().await;
    mount_overview(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/papers-per-year"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "year": 2023, "count": 2 },
            { "year": 2021, "count": 0 },
            { "year": 2022, "count": 5 }
        ])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats/authors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "Ada", "paper_count": 4 }])))
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let view = DashboardView::new(client);
    let dashboard = view.load().await.unwrap();

    assert_eq!(dashboard.overview.total_papers, 120);
    assert_eq!(dashboard.years_covered(), 2);
    let years: Vec<_> = dashboard.papers_per_year.iter().map(|p| p.year).collect();
    assert_eq!(years, [2021, 2022, 2023]);
    assert_eq!(dashboard.top_authors[0].author, "Ada");
    assert_eq!(view.current().await, Some(dashboard));
}

#[tokio::test]
async fn test_dashboard_survives_missing_author_stats() {
    let mock_server = MockServer::start().await;
    mount_overview(&mock_server).await;

    Mock::given(method("GET"))
        .and(path("/api/stats/papers-per-year"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats/authors"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let dashboard = DashboardView::new(client).load().await.unwrap();

    assert_eq!(dashboard.top_authors[0].author, "Overview Author");
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_dashboard_failure_keeps_previous() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stats/overview"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let view = DashboardView::new(client);

    assert!(view.load().await.is_err());
    assert_eq!(view.current().await, None);

    let events = drain(&mut rx);
    assert!(matches!(
        &events[..],
        [UiEvent::Notify(n)] if n.level == NotificationLevel::Error && n.message == "Failed to load dashboard data"
    ));
}

#[tokio::test]
async fn test_paper_details_load_and_delete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/papers/P42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paper_id": "P42",
            "title": "On Computable Numbers",
            "journal_name": "Proc. London Math. Soc.",
            "year": 1936,
            "volume": 42,
            "keywords": ["computability", " computability ", ""]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/papers/P42"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let view = PaperDetailsView::new(client, "P42");
    assert_eq!(view.edit_route(), Route::EditPaper("P42".into()));

    let paper = view.load().await.unwrap();
    assert_eq!(paper.journal.as_deref(), Some("Proc. London Math. Soc."));
    assert_eq!(paper.volume.as_deref(), Some("42"));
    assert_eq!(paper.keywords, vec!["computability"]);

    view.delete().await.unwrap();
    assert_eq!(view.paper().await, None);

    let events = drain(&mut rx);
    assert!(matches!(&events[0], UiEvent::Notify(n) if n.message == "Paper deleted successfully"));
    assert_eq!(events[1], UiEvent::Navigate(Route::Papers));
    assert_eq!(events[2], UiEvent::ListInvalidated(ListKind::Papers));
}

#[tokio::test]
async fn test_missing_paper_reports_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/papers/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Paper not found" })))
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let err = PaperDetailsView::new(client, "nope").load().await.unwrap_err();

    assert_eq!(err.to_user_message(), "Not found: Paper not found");
    assert_eq!(drain(&mut rx).len(), 1);
}
