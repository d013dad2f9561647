//! In-process fake of the mock server's admin API

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Server-side state the tests seed and inspect
#[derive(Default)]
pub struct FakeState {
    pub mappings: Vec<Value>,
    pub requests: Vec<Value>,
    /// Ids whose DELETE answers 500
    pub failing_deletes: HashSet<String>,
    /// Forced answer for POST/PUT on mappings
    pub save_failure: Option<(u16, Option<String>)>,
    /// Bodies received on the import endpoint
    pub imports: Vec<Value>,
    /// `limit` query values seen on the request journal
    pub request_limits: Vec<Option<usize>>,
}

pub type Shared = Arc<Mutex<FakeState>>;

/// A running fake; the server lives until the test's runtime shuts down
pub struct FakeAdmin {
    pub base_url: String,
    pub state: Shared,
}

impl FakeAdmin {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));
        let app = Router::new()
            .route("/__admin/requests", get(list_requests))
            .route("/__admin/mappings", get(list_mappings).post(create_mapping))
            .route(
                "/__admin/mappings/{id}",
                put(update_mapping).delete(delete_mapping),
            )
            .route("/__admin/mappings/import", post(import_mappings))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn with_mappings(&self, mappings: Vec<Value>) {
        self.state.lock().unwrap().mappings = mappings;
    }

    pub fn with_requests(&self, requests: Vec<Value>) {
        self.state.lock().unwrap().requests = requests;
    }

    pub fn fail_delete(&self, id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(id.to_string());
    }

    pub fn fail_saves(&self, status: u16, message: Option<&str>) {
        self.state.lock().unwrap().save_failure = Some((status, message.map(str::to_string)));
    }

    pub fn mapping_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .mappings
            .iter()
            .filter_map(|m| m["id"].as_str().map(str::to_string))
            .collect()
    }
}

pub fn mapping(id: &str, method: &str, url: &str, status: u16) -> Value {
    json!({
        "id": id,
        "uuid": id,
        "request": { "method": method, "url": url },
        "response": { "status": status },
    })
}

pub fn logged(id: &str, method: &str, url: &str, stub_id: Option<&str>) -> Value {
    let status = if stub_id.is_some() { 200 } else { 404 };
    let mut record = json!({
        "id": id,
        "request": {
            "method": method,
            "url": url,
            "absoluteUrl": format!("http://localhost:8080{}", url),
            "headers": { "Accept": "application/json" },
            "loggedDate": 1_700_000_000_000i64,
        },
        "responseDefinition": { "status": status },
        "wasMatched": stub_id.is_some(),
    });
    if let Some(stub_id) = stub_id {
        record["stubMapping"] = json!({ "id": stub_id });
    }
    record
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<usize>,
}

fn error(status: u16, message: Option<String>) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match message {
        Some(message) => (status, Json(json!({ "error": message }))).into_response(),
        None => (status, "boom").into_response(),
    }
}

async fn list_requests(State(state): State<Shared>, Query(query): Query<LimitQuery>) -> Json<Value> {
    let mut state = state.lock().unwrap();
    state.request_limits.push(query.limit);
    let total = state.requests.len();
    let requests: Vec<Value> = match query.limit {
        Some(limit) => state.requests.iter().take(limit).cloned().collect(),
        None => state.requests.clone(),
    };
    Json(json!({ "requests": requests, "meta": { "total": total } }))
}

async fn list_mappings(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().unwrap();
    Json(json!({
        "mappings": state.mappings,
        "meta": { "total": state.mappings.len() },
    }))
}

async fn create_mapping(State(state): State<Shared>, Json(mut body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    if let Some((status, message)) = state.save_failure.clone() {
        return error(status, message);
    }
    let id = uuid::Uuid::new_v4().to_string();
    body["id"] = json!(id);
    body["uuid"] = json!(id);
    state.mappings.insert(0, body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_mapping(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut state = state.lock().unwrap();
    if let Some((status, message)) = state.save_failure.clone() {
        return error(status, message);
    }
    body["id"] = json!(id);
    match state.mappings.iter_mut().find(|m| m["id"] == json!(id)) {
        Some(existing) => {
            *existing = body.clone();
            Json(body).into_response()
        }
        None => error(404, None),
    }
}

async fn delete_mapping(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = state.lock().unwrap();
    if state.failing_deletes.contains(&id) {
        return error(500, Some(format!("cannot delete {}", id)));
    }
    let before = state.mappings.len();
    state.mappings.retain(|m| m["id"] != json!(id));
    if state.mappings.len() == before {
        return error(404, None);
    }
    StatusCode::OK.into_response()
}

async fn import_mappings(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().unwrap();
    let incoming = body["mappings"].as_array().cloned().unwrap_or_default();
    for mapping in incoming {
        let id = mapping["id"].clone();
        match state.mappings.iter_mut().find(|m| !id.is_null() && m["id"] == id) {
            Some(existing) => *existing = mapping,
            None => state.mappings.push(mapping),
        }
    }
    state.imports.push(body);
    StatusCode::OK.into_response()
}
