//! Paper, author and profile forms against a mock catalog backend.

use std::sync::Arc;
use std::time::Duration;

use paper_catalog::events::{ListKind, NotificationLevel, UiEvent};
use paper_catalog::forms::{AuthorForm, FormPhase, PaperForm};
use paper_catalog::models::Paper;
use paper_catalog::views::ProfileEditor;
use paper_catalog::{CatalogClient, Config, EventBus, Route, Session, SessionContext, ViewError};
use serde_json::json;
use tokio::sync::broadcast;
use tokio_test::assert_ok;
use wiremock::matchers::{any, body_json, body_partial_json, method, path, query_param};
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

fn linked_paper() -> Paper {
    Paper { paper_id: "P9".to_string(), title: Some("Graph Attention".to_string()), ..Default::default() }
}

#[tokio::test]
async fn test_new_paper_success_navigates_and_invalidates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/papers"))
        .and(body_partial_json(json!({
            "title": "Attention Is All You Need",
            "authors": ["Vaswani", "Shazeer"],
            "year": 2017
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "created" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let form = PaperForm::create(client);
    assert_ok!(
        form.update(|d| {
            d.title = " Attention Is All You Need ".into();
            d.authors = "Vaswani, Shazeer".into();
            d.year = "2017".into();
        })
        .await
    );

    assert_ok!(form.submit().await);
    assert_eq!(form.phase().await, FormPhase::Succeeded);

    let events = drain(&mut rx);
    assert!(matches!(&events[0], UiEvent::Notify(n) if n.message == "Paper created successfully"));
    assert_eq!(events[1], UiEvent::Navigate(Route::Papers));
    assert_eq!(events[2], UiEvent::ListInvalidated(ListKind::Papers));

    // A finished form takes no more edits.
    assert!(matches!(form.update(|d| d.title.clear()).await, Err(ViewError::NotEditable { .. })));
}

#[tokio::test]
async fn test_failed_submit_keeps_draft() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/papers"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "disk full" })))
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let form = PaperForm::create(client);
    form.update(|d| d.title = "Keep me".into()).await.unwrap();

    assert!(form.submit().await.is_err());
    assert_eq!(form.phase().await, FormPhase::Editing);
    assert_eq!(form.draft().await.title, "Keep me");
    assert!(form.last_error().await.unwrap().contains("disk full"));

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], UiEvent::Notify(n) if n.level == NotificationLevel::Error));

    // Still editable, so the user can retry.
    assert_ok!(form.update(|d| d.journal = "Nature".into()).await);
}

#[tokio::test]
async fn test_second_submit_while_in_flight_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/papers"))
        .respond_with(ResponseTemplate::new(201).set_delay(Duration::from_millis(300)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let form = Arc::new(PaperForm::create(client));
    form.update(|d| d.title = "Slow".into()).await.unwrap();

    let first = {
        let form = Arc::clone(&form);
        tokio::spawn(async move { form.submit().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(form.phase().await, FormPhase::Submitting);
    assert!(matches!(form.submit().await, Err(ViewError::SubmitInFlight)));
    assert!(matches!(form.update(|d| d.title.clear()).await, Err(ViewError::SubmitInFlight)));

    assert_ok!(first.await.unwrap());
    assert_eq!(form.phase().await, FormPhase::Succeeded);
}

#[tokio::test]
async fn test_edit_paper_loads_and_puts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/papers/P1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "paper": {
                "paper_id": "P1",
                "title": "Old title",
                "authors": ["Ada", "Alan"],
                "publish_year": 2019
            }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/papers/P1"))
        .and(body_partial_json(json!({ "paper_id": "P1", "title": "New title", "year": 2019 })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let form = PaperForm::edit(client, "P1").await.unwrap();
    let draft = form.draft().await;
    assert_eq!(draft.title, "Old title");
    assert_eq!(draft.authors, "Ada, Alan");
    assert_eq!(draft.year, "2019");

    form.update(|d| d.title = "New title".into()).await.unwrap();
    assert_ok!(form.submit().await);
}

#[tokio::test]
async fn test_unauthorized_submit_redirects_without_error_toast() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/papers"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    client.session().begin(Session::new("old", "a@b.c")).await.unwrap();
    let form = PaperForm::create(client.clone());
    form.update(|d| d.title = "T".into()).await.unwrap();

    assert!(form.submit().await.is_err());
    assert!(!client.session().is_authenticated().await);
    assert_eq!(form.phase().await, FormPhase::Editing);
    assert_eq!(drain(&mut rx), vec![UiEvent::Navigate(Route::Login)]);
}

#[tokio::test]
async fn test_new_author_without_paper_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(any()).respond_with(ResponseTemplate::new(200)).expect(0).mount(&mock_server).await;

    let (client, mut rx) = client_for(&mock_server);
    let form = AuthorForm::create(client);
    form.set_name("Jane Doe").await.unwrap();

    let err = form.submit().await.unwrap_err();
    assert!(matches!(err, ViewError::Validation { ref field, .. } if field == "paper_id"));
    assert_eq!(form.phase().await, FormPhase::Editing);
    assert!(mock_server.received_requests().await.unwrap().is_empty());

    let events = drain(&mut rx);
    assert!(matches!(&events[..], [UiEvent::Notify(n)] if n.level == NotificationLevel::Error));
}

#[tokio::test]
async fn test_new_author_with_linked_paper() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/authors"))
        .and(body_json(json!({ "name": "Jane Doe", "paper_id": "P9" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, mut rx) = client_for(&mock_server);
    let form = AuthorForm::create(client);
    form.set_name("  Jane Doe ").await.unwrap();
    form.select_paper(linked_paper()).await.unwrap();

    assert_ok!(form.submit().await);
    let events = drain(&mut rx);
    assert_eq!(events[1], UiEvent::Navigate(Route::Authors));
    assert_eq!(events[2], UiEvent::ListInvalidated(ListKind::Authors));
}

#[tokio::test]
async fn test_edit_author_sends_name_only() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/authors"))
        .and(query_param("limit", "1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "authors": [
                { "_id": "A1", "name": "Ada" },
                { "_id": "A2", "name": "Alan Turing" }
            ]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/authors/A2"))
        .and(body_json(json!({ "name": "A. M. Turing" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let form = AuthorForm::edit(client, "A2").await.unwrap();
    assert_eq!(form.draft().await.name, "Alan Turing");

    form.set_name("A. M. Turing").await.unwrap();
    assert_ok!(form.submit().await);
}

#[tokio::test]
async fn test_edit_unknown_author_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/authors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "authors": [] })))
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let err = AuthorForm::edit(client, "missing").await.unwrap_err();
    assert!(err.to_user_message().starts_with("Not found"));
}

#[tokio::test]
async fn test_paper_lookup_searching_tracks_newest_query() {
    let mock_server = MockServer::start().await;

    for (q, id) in [("gr", "P1"), ("graph", "P9")] {
        Mock::given(method("GET"))
            .and(path("/api/papers/search"))
            .and(query_param("q", q))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "papers": [{ "paper_id": id }] }))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&mock_server)
            .await;
    }

    let (client, _rx) = client_for(&mock_server);
    let form = AuthorForm::create(client).with_lookup_delay(Duration::from_millis(20));
    let lookup = form.lookup();

    lookup.set_query("gr").await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(lookup.is_searching().await);

    lookup.set_query("graph").await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(lookup.is_searching().await);

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!lookup.is_searching().await);
    assert_eq!(lookup.results().await[0].paper_id, "P9");

    // Shortening the text mid-flight drops the lookup and the flag with it.
    lookup.set_query("gr").await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(lookup.is_searching().await);
    lookup.set_query("g").await;
    assert!(!lookup.is_searching().await);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(!lookup.is_searching().await);
    assert!(lookup.results().await.is_empty());
}

#[tokio::test]
async fn test_paper_lookup_waits_for_two_characters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/papers/search"))
        .and(query_param("q", "graph"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "papers": [{ "paper_id": "P9", "title": "Graph Attention" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let form = AuthorForm::create(client).with_lookup_delay(Duration::from_millis(20));
    let lookup = form.lookup();

    lookup.set_query("g").await;
    assert!(!lookup.is_pending());

    lookup.set_query("gr").await;
    lookup.set_query("graph").await;
    assert!(lookup.is_pending());

    tokio::time::sleep(Duration::from_millis(300)).await;
    let results = lookup.results().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].paper_id, "P9");

    form.select_paper(results[0].clone()).await.unwrap();
    assert!(lookup.results().await.is_empty());
    assert_eq!(lookup.query().await, "");
    assert_eq!(form.draft().await.linked_paper.unwrap().paper_id, "P9");
}

#[tokio::test]
async fn test_profile_edit_and_cancel() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ada",
            "email": "ada@example.org",
            "createdAt": "2024-01-02"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/auth/profile"))
        .and(body_partial_json(json!({ "name": "Ada Lovelace" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _rx) = client_for(&mock_server);
    let editor = ProfileEditor::new(client).await;
    editor.load().await.unwrap();

    assert!(matches!(editor.update(|p| p.name.clear()).await, Err(ViewError::NotEditable { .. })));

    editor.begin_edit().await;
    editor.update(|p| p.name = "Someone else".into()).await.unwrap();
    editor.cancel().await;
    assert_eq!(editor.draft().await.name, "Ada");

    editor.begin_edit().await;
    editor.update(|p| p.name = "Ada Lovelace".into()).await.unwrap();
    let saved = editor.save().await.unwrap();
    assert_eq!(saved.name, "Ada Lovelace");
    assert_eq!(editor.profile().await.name, "Ada Lovelace");
    assert!(!editor.is_editing().await);
}
