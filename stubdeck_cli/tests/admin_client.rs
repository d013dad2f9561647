//! Admin client and dashboard runner against an in-process admin API

mod support;

use std::path::Path;

use serde_json::json;
use stubdeck_cli::admin::{AdminClient, AdminError, RequestScope};
use stubdeck_cli::commands::ui::{build_clients, perform, Clients};
use stubdeck_cli::config::Theme;
use stubdeck_cli::dashboard::{Command, Dashboard, Drawer, Tab};
use stubdeck_common::{parse_instances, StubMapping};
use support::{logged, mapping, FakeAdmin};

fn stub(value: serde_json::Value) -> StubMapping {
    serde_json::from_value(value).unwrap()
}

/// Perform commands and fold outcomes until nothing is left to do
async fn settle(dashboard: &mut Dashboard, clients: &Clients, mut commands: Vec<Command>) {
    while let Some(command) = commands.pop() {
        if let Some(outcome) = perform(command, clients, Path::new(".")).await {
            commands.extend(dashboard.apply(outcome));
        }
    }
}

fn dashboard_for(server: &FakeAdmin) -> (Dashboard, Clients) {
    let instances = parse_instances(&server.base_url).unwrap();
    let clients = build_clients(&instances).unwrap();
    (Dashboard::new(instances, 0, Theme::Dark), clients)
}

#[tokio::test]
async fn test_list_requests_sends_limit_and_reads_total() {
    let server = FakeAdmin::start().await;
    server.with_requests(vec![
        logged("r1", "GET", "/a", None),
        logged("r2", "GET", "/b", Some("m1")),
        logged("r3", "POST", "/c", None),
    ]);
    let client = AdminClient::new(&server.base_url).unwrap();

    let limited = client.list_requests(RequestScope::Limited(2)).await.unwrap();
    assert_eq!(limited.requests.len(), 2);
    assert_eq!(limited.meta.total, 3);
    assert_eq!(limited.requests[1].matched_stub_id(), Some("m1"));

    let all = client.list_requests(RequestScope::All).await.unwrap();
    assert_eq!(all.requests.len(), 3);

    let limits = server.state.lock().unwrap().request_limits.clone();
    assert_eq!(limits, vec![Some(2), None]);
}

#[tokio::test]
async fn test_create_and_update_mapping() {
    let server = FakeAdmin::start().await;
    let client = AdminClient::new(&format!("{}/", server.base_url)).unwrap();

    let draft = stub(json!({
        "request": { "method": "GET", "urlPath": "/health" },
        "response": { "status": 200, "body": "ok" },
    }));
    let created = client.create_mapping(&draft).await.unwrap();
    assert!(!created.id.is_empty());
    assert_eq!(created.url_label(), "/health");

    let mut changed = created.clone();
    changed.response.status = 503;
    let updated = client.update_mapping(&changed).await.unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.response.status, 503);

    let listed = client.list_mappings().await.unwrap();
    assert_eq!(listed.mappings.len(), 1);
    assert_eq!(listed.mappings[0].response.status, 503);
}

#[tokio::test]
async fn test_failed_save_surfaces_server_message() {
    let server = FakeAdmin::start().await;
    let client = AdminClient::new(&server.base_url).unwrap();
    let draft = stub(json!({ "request": {}, "response": { "status": 200 } }));

    server.fail_saves(422, Some("Invalid matcher"));
    let err = client.create_mapping(&draft).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid matcher");
    assert_eq!(err.status(), Some(422));

    server.fail_saves(500, None);
    let err = client.create_mapping(&draft).await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP 500");
}

#[tokio::test]
async fn test_delete_unknown_mapping_is_application_error() {
    let server = FakeAdmin::start().await;
    let client = AdminClient::new(&server.base_url).unwrap();

    let err = client.delete_mapping("missing").await.unwrap_err();
    assert!(matches!(err, AdminError::Application { status: 404, .. }));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AdminClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.list_mappings().await.unwrap_err();
    assert!(matches!(err, AdminError::Transport(_)));
    assert_eq!(err.to_string(), "Network error: could not reach the server.");
}

#[tokio::test]
async fn test_bulk_delete_reports_each_outcome() {
    let server = FakeAdmin::start().await;
    server.with_mappings(vec![
        mapping("m1", "GET", "/a", 200),
        mapping("m2", "GET", "/b", 200),
        mapping("m3", "GET", "/c", 200),
    ]);
    server.fail_delete("m2");
    let client = AdminClient::new(&server.base_url).unwrap();

    let ids = vec!["m1".to_string(), "m2".to_string(), "m3".to_string()];
    let results = client.delete_mappings(&ids).await;

    let failed: Vec<&str> = results
        .iter()
        .filter(|(_, result)| result.is_err())
        .map(|(id, _)| id.as_str())
        .collect();
    assert_eq!(failed, vec!["m2"]);
    assert_eq!(server.mapping_ids(), vec!["m2"]);
}

#[tokio::test]
async fn test_import_posts_document_verbatim() {
    let server = FakeAdmin::start().await;
    let client = AdminClient::new(&server.base_url).unwrap();
    let document = json!({
        "mappings": [mapping("m9", "GET", "/imported", 201)],
        "importOptions": { "duplicatePolicy": "OVERWRITE" },
    });

    client.import_mappings(&document).await.unwrap();

    assert_eq!(server.state.lock().unwrap().imports, vec![document]);
    assert_eq!(server.mapping_ids(), vec!["m9"]);
}

#[tokio::test]
async fn test_dashboard_loads_and_follows_matched_stub() {
    let server = FakeAdmin::start().await;
    server.with_mappings(vec![mapping("m1", "GET", "/users", 200)]);
    server.with_requests(vec![logged("r1", "GET", "/users", Some("m1"))]);
    let (mut dashboard, clients) = dashboard_for(&server);

    let commands = dashboard.start();
    settle(&mut dashboard, &clients, commands).await;
    assert_eq!(dashboard.requests.records.len(), 1);
    assert_eq!(dashboard.requests.total, 1);

    dashboard.open_selected();
    let commands = dashboard.open_matched_stub();
    settle(&mut dashboard, &clients, commands).await;

    match &dashboard.drawer {
        Some(Drawer::Mapping(drawer)) => {
            assert_eq!(drawer.mapping.id, "m1");
            assert_eq!(drawer.back.as_ref().map(|r| r.id.as_str()), Some("r1"));
        }
        _ => panic!("expected the mapping drawer"),
    }
}

#[tokio::test]
async fn test_dashboard_stub_from_request_creates_mapping() {
    let server = FakeAdmin::start().await;
    server.with_requests(vec![logged("r1", "GET", "/orders?page=2", None)]);
    let (mut dashboard, clients) = dashboard_for(&server);

    let commands = dashboard.start();
    settle(&mut dashboard, &clients, commands).await;

    dashboard.open_selected();
    dashboard.create_stub_from_request();
    assert!(dashboard.editor.is_some());

    let commands = dashboard.submit_editor();
    settle(&mut dashboard, &clients, commands).await;

    assert!(dashboard.editor.is_none());
    assert!(dashboard.drawer.is_none());
    assert_eq!(server.mapping_ids().len(), 1);
    assert_eq!(dashboard.mappings.mappings.len(), 1);
    assert_eq!(dashboard.mappings.mappings[0].method_label(), "GET");
}

#[tokio::test]
async fn test_dashboard_bulk_delete_keeps_failures_selected() {
    let server = FakeAdmin::start().await;
    server.with_mappings(vec![
        mapping("m1", "GET", "/a", 200),
        mapping("m2", "GET", "/b", 200),
    ]);
    server.fail_delete("m2");
    let (mut dashboard, clients) = dashboard_for(&server);

    let commands = dashboard.switch_tab(Tab::Mappings);
    settle(&mut dashboard, &clients, commands).await;
    assert_eq!(dashboard.mappings.mappings.len(), 2);

    dashboard.mappings.toggle_all();
    dashboard.mappings.request_bulk_delete();
    let commands = dashboard.confirm_bulk_delete();
    settle(&mut dashboard, &clients, commands).await;

    let remaining: Vec<&str> = dashboard.mappings.mappings.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(remaining, vec!["m2"]);
    assert!(dashboard.mappings.selected.contains("m2"));
    assert_eq!(
        dashboard.mappings.error.as_deref(),
        Some("Failed to delete 1 mapping(s).")
    );
}

#[tokio::test]
async fn test_dashboard_import_refreshes_list() {
    let server = FakeAdmin::start().await;
    server.with_mappings(vec![mapping("m1", "GET", "/a", 200)]);
    let (mut dashboard, clients) = dashboard_for(&server);

    let commands = dashboard.switch_tab(Tab::Mappings);
    settle(&mut dashboard, &clients, commands).await;

    let file = std::env::temp_dir().join(format!("stubdeck-import-{}.json", std::process::id()));
    let document = json!({
        "mappings": [
            mapping("m1", "GET", "/a", 500),
            mapping("m2", "POST", "/b", 201),
        ],
    });
    std::fs::write(&file, document.to_string()).unwrap();

    dashboard.mappings.open_import_prompt();
    dashboard.mappings.import_prompt = Some(file.display().to_string());
    let commands = dashboard.submit_import();
    settle(&mut dashboard, &clients, commands).await;

    assert!(!dashboard.mappings.importing);
    assert!(dashboard.mappings.import_error.is_none());
    assert!(dashboard.mappings.notice.is_some());
    assert_eq!(dashboard.mappings.mappings.len(), 2);

    std::fs::remove_file(&file).unwrap();
}
