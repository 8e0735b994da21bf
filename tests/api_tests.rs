use serde_json::json;

use crawler_studio::api::api_model::{FlowCheckRequest, FlowContext};
use crawler_studio::api::client::{BackendApi, HttpBackend};
use crawler_studio::api::error::ApiError;
use crawler_studio::api::mock::MockBackend;
use crawler_studio::crawler::crawler_model::{
    CrawlerDefinition, CrawlerPatch, CrawlerStatus, Schedule,
};
use crawler_studio::element::classifier::classify;
use crawler_studio::element::element_model::SelectedElement;
use crawler_studio::element::ingest::ingest_elements;
use crawler_studio::flow::flow_model::{ActionType, CrawlerTask, TaskAction};

use crate::common::server::OneShotServer;

mod common;

fn backend(server: &OneShotServer) -> HttpBackend {
    HttpBackend::new(&server.base_url, None).unwrap()
}

fn flow_request() -> FlowCheckRequest {
    FlowCheckRequest {
        start_url: "https://shop.test".into(),
        flows: Vec::new(),
        tasks: vec![CrawlerTask::single(
            TaskAction::for_selector(ActionType::Click, "#login-link", None),
            0,
        )],
        context: FlowContext::default(),
    }
}

fn definition() -> CrawlerDefinition {
    CrawlerDefinition {
        name: "Products".into(),
        start_url: "https://shop.test".into(),
        max_depth: 2,
        max_pages: 50,
        schedule: Some(Schedule::Weekly),
        selected_elements: vec![SelectedElement::from_selector(".product")],
        flows: Vec::new(),
    }
}

// =========================================================================
// ApiError
// =========================================================================

#[test]
fn status_error_prefers_body_message() {
    let err = ApiError::from_status(500, r#"{"message":"Failed to analyze URL"}"#);
    assert_eq!(err.to_string(), "Failed to analyze URL");
    assert_eq!(err.status(), Some(500));

    let err = ApiError::from_status(400, r#"{"error":"bad url"}"#);
    assert_eq!(err.to_string(), "bad url");
}

#[test]
fn status_error_falls_back_to_status_text() {
    assert_eq!(
        ApiError::from_status(502, "<html>Bad Gateway</html>").to_string(),
        "HTTP error! status: 502"
    );
    assert_eq!(
        ApiError::from_status(500, r#"{"message":"  "}"#).to_string(),
        "HTTP error! status: 500"
    );
}

// =========================================================================
// HttpBackend
// =========================================================================

#[test]
fn analyze_url_posts_url_and_returns_elements() {
    let server = OneShotServer::start(
        200,
        r#"[{"tag":"div","id":"a","class":["x"],"name":null},{"tag":"div","class":["x","y"]}]"#,
    );
    let api = backend(&server);

    let values = api.analyze_url("https://example.com").unwrap();
    let request = server.request();

    assert!(request.starts_with("POST /api/element "));
    assert!(request.contains(r#"{"url":"https://example.com"}"#));

    let parsed = classify(&ingest_elements(values).elements);
    assert_eq!(parsed.classes["x"].count, 2);
}

#[test]
fn analyze_url_surfaces_backend_message() {
    let server = OneShotServer::start(500, r#"{"message":"Failed to analyze URL"}"#);
    let err = backend(&server).analyze_url("https://example.com").unwrap_err();
    server.request();

    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Failed to analyze URL");
}

#[test]
fn invalid_json_is_a_decode_error() {
    let server = OneShotServer::start(200, "not json");
    let err = backend(&server).analyze_url("https://example.com").unwrap_err();
    server.request();
    assert!(matches!(err, ApiError::Decode { .. }));
}

#[test]
fn trailing_slash_in_base_url_is_ignored() {
    let server = OneShotServer::start(200, "[]");
    let api = HttpBackend::new(&format!("{}/", server.base_url), None).unwrap();
    assert_eq!(api.base_url(), server.base_url);

    api.list_crawlers().unwrap();
    assert!(server.request().starts_with("GET /api/crawlers "));
}

#[test]
fn flowcheck_sends_camel_case_body() {
    let server = OneShotServer::start(200, r#"{"elements":[],"metadata":{"ok":true}}"#);
    let response = backend(&server).analyze_flow(&flow_request()).unwrap();
    let request = server.request();

    assert!(request.starts_with("POST /api/flowcheck "));
    assert!(request.contains(r#""startUrl":"https://shop.test""#));
    assert!(request.contains(r#""selectorType":"id""#));
    assert!(request.contains(r#""currentFlowId":null"#));
    assert_eq!(response.metadata, json!({ "ok": true }));
    assert!(response.errors.is_none());
}

#[test]
fn flowcheck_accepts_bare_element_array() {
    let server = OneShotServer::start(200, r#"[{"tag":"form"},{"tag":"input"}]"#);
    let response = backend(&server).analyze_flow(&flow_request()).unwrap();
    server.request();

    assert_eq!(response.elements.len(), 2);
    assert!(response.metadata.is_null());
}

#[test]
fn flowcheck_passes_reported_errors_through() {
    let server = OneShotServer::start(
        200,
        r#"{"elements":[],"errors":["timeout on #login-link"]}"#,
    );
    let response = backend(&server).analyze_flow(&flow_request()).unwrap();
    server.request();
    assert_eq!(response.errors, Some(vec!["timeout on #login-link".to_string()]));
}

#[test]
fn crawler_endpoints_use_expected_paths() {
    let server = OneShotServer::start(
        200,
        r#"{"id":"c1","status":"running","lastRun":"2024-01-01T00:00:00Z","pagesCrawled":12}"#,
    );
    let report = backend(&server).start_crawler("c1").unwrap();
    assert!(server.request().starts_with("POST /api/crawlers/c1/start "));
    assert_eq!(report.status, CrawlerStatus::Running);
    assert_eq!(report.pages_crawled, Some(12));

    let server = OneShotServer::start(200, "");
    backend(&server).delete_crawler("c1").unwrap();
    assert!(server.request().starts_with("DELETE /api/crawlers/c1 "));

    let server = OneShotServer::start(
        200,
        r#"{"id":"c1","name":"Renamed","url":"https://shop.test","status":"idle"}"#,
    );
    let patch = CrawlerPatch {
        name: Some("Renamed".into()),
        ..Default::default()
    };
    let crawler = backend(&server).update_crawler("c1", &patch).unwrap();
    let request = server.request();
    assert!(request.starts_with("PATCH /api/crawlers/c1 "));
    assert!(request.contains(r#"{"name":"Renamed"}"#));
    assert_eq!(crawler.name, "Renamed");
    assert!(crawler.schedule.is_none());
}

#[test]
fn export_returns_raw_body() {
    let server = OneShotServer::start(200, "id,name\nc1,Products\n");
    let body = backend(&server).export_crawler("c1").unwrap();
    assert!(server.request().starts_with("GET /api/crawlers/c1/export "));
    assert_eq!(body, "id,name\nc1,Products\n");
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let api = HttpBackend::new("http://127.0.0.1:1", None).unwrap();
    assert!(matches!(api.list_crawlers(), Err(ApiError::Transport { .. })));
}

// =========================================================================
// MockBackend
// =========================================================================

#[test]
fn mock_serves_sample_page() {
    let mock = MockBackend::instant();
    let ingested = ingest_elements(mock.analyze_url("https://anything.test").unwrap());
    assert!(ingested.rejected.is_empty());

    let parsed = classify(&ingested.elements);
    assert_eq!(parsed.tags.values().map(|i| i.count).sum::<usize>(), 36);
    assert_eq!(parsed.tags["a"].count, 5);
    assert_eq!(parsed.classes["card"].count, 4);
    assert_eq!(parsed.ids.len(), 10);
    assert!(parsed.ids.contains_key("search-input"));
}

#[test]
fn mock_flowcheck_reports_metadata() {
    let mock = MockBackend::instant();
    let response = mock.analyze_flow(&flow_request()).unwrap();

    assert_eq!(response.elements.len(), 36);
    assert_eq!(response.metadata["mock"], true);
    assert_eq!(response.metadata["startUrl"], "https://shop.test");
    assert_eq!(response.metadata["tasksExecuted"], 1);
}

#[test]
fn mock_crawler_lifecycle() {
    let mock = MockBackend::instant();
    assert!(mock.list_crawlers().unwrap().is_empty());

    let created = mock.create_crawler(&definition()).unwrap();
    assert_eq!(created.id, "mock-1");
    assert_eq!(created.status, CrawlerStatus::Idle);
    assert_eq!(created.schedule, Some(Schedule::Weekly));

    let started = mock.start_crawler("mock-1").unwrap();
    assert_eq!(started.status, CrawlerStatus::Running);
    assert!(started.last_run.is_some());
    assert_eq!(mock.crawler_status("mock-1").unwrap().status, CrawlerStatus::Running);

    mock.stop_crawler("mock-1").unwrap();
    assert_eq!(mock.list_crawlers().unwrap()[0].status, CrawlerStatus::Idle);

    let exported = mock.export_crawler("mock-1").unwrap();
    assert!(exported.contains("\"name\": \"Products\""));

    mock.delete_crawler("mock-1").unwrap();
    assert!(matches!(mock.delete_crawler("mock-1"), Err(ApiError::NotFound(_))));
    assert!(matches!(mock.crawler_status("mock-1"), Err(ApiError::NotFound(_))));
}

#[test]
fn mock_ids_keep_increasing() {
    let mock = MockBackend::instant();
    mock.create_crawler(&definition()).unwrap();
    mock.delete_crawler("mock-1").unwrap();
    assert_eq!(mock.create_crawler(&definition()).unwrap().id, "mock-2");
}

#[test]
fn mock_update_applies_patch() {
    let mock = MockBackend::instant();
    mock.create_crawler(&definition()).unwrap();

    let patch = CrawlerPatch {
        schedule: Some(Schedule::Daily),
        ..Default::default()
    };
    let updated = mock.update_crawler("mock-1", &patch).unwrap();
    assert_eq!(updated.name, "Products");
    assert_eq!(updated.schedule, Some(Schedule::Daily));
}

#[test]
fn crawler_definition_wire_format() {
    let value = serde_json::to_value(definition()).unwrap();
    assert_eq!(value["startUrl"], "https://shop.test");
    assert_eq!(value["maxDepth"], 2);
    assert_eq!(value["schedule"], "weekly");
    assert_eq!(value["selectedElements"][0]["type"], "class");
}
