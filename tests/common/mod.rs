//! In-process stacks backend for integration tests: the stacks REST contract
//! (bounded listing with ETag revalidation, stack CRUD, identity echo) over
//! an in-memory store, plus counters and failure injection so tests can
//! observe exactly what the client put on the wire.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use stackctl::model::RemoteConfig;
use stackctl::remote::StackClient;
use stackctl::repository::StackRepository;

#[derive(Default)]
pub struct BackendState {
    pub stacks: Vec<Value>,
    pub version: u64,
    pub next_id: u64,
    pub list_requests: u64,
    pub delete_requests: u64,
    pub created_payloads: Vec<Value>,
    pub fail_list: bool,
    pub fail_create: bool,
    pub fail_delete: HashSet<String>,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct Backend {
    pub base_url: String,
    state: Shared,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for Backend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn spawn_backend() -> Backend {
    let state: Shared = Arc::new(Mutex::new(BackendState::default()));

    let app = Router::new()
        .route("/list-stacks", get(list_stacks))
        .route("/stacks", post(create_stack))
        .route(
            "/stacks/:id",
            get(get_stack).put(update_stack).delete(delete_stack),
        )
        .route("/whoami", get(whoami))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Backend {
        base_url: format!("http://{}", addr),
        state,
        handle,
    }
}

impl Backend {
    pub fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state")
    }

    pub fn client(&self, token: &str) -> StackClient {
        StackClient::new(RemoteConfig {
            base_url: self.base_url.clone(),
            token: token.to_string(),
        })
        .expect("build client")
    }

    pub fn repository(&self, token: &str) -> StackRepository {
        StackRepository::new(self.client(token))
    }

    pub fn seed(&self, id: &str, name: &str, creator: &str) {
        let mut st = self.state();
        st.stacks.push(json!({
            "id": id,
            "name": name,
            "description": "",
            "scope": "general",
            "tags": [],
            "creator": creator,
            "links": [{"href": format!("/stacks/{}", id), "rel": "self"}],
        }));
        st.version += 1;
    }

    pub fn stack_ids(&self) -> Vec<String> {
        self.state()
            .stacks
            .iter()
            .filter_map(|s| s.get("id").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn list_requests(&self) -> u64 {
        self.state().list_requests
    }

    pub fn delete_requests(&self) -> u64 {
        self.state().delete_requests
    }

    pub fn created_payloads(&self) -> Vec<Value> {
        self.state().created_payloads.clone()
    }

    pub fn set_fail_list(&self, on: bool) {
        self.state().fail_list = on;
    }

    pub fn set_fail_create(&self, on: bool) {
        self.state().fail_create = on;
    }

    pub fn fail_delete(&self, id: &str) {
        self.state().fail_delete.insert(id.to_string());
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({"message": text}))).into_response()
}

async fn list_stacks(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let mut st = state.lock().expect("backend state");
    st.list_requests += 1;

    if st.fail_list {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "listing unavailable");
    }

    let etag = format!("\"v{}\"", st.version);
    if headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        == Some(etag.as_str())
    {
        return StatusCode::NOT_MODIFIED.into_response();
    }

    let max = params
        .get("maxItems")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let items: Vec<Value> = st.stacks.iter().take(max).cloned().collect();
    ([(header::ETAG, etag)], Json(Value::Array(items))).into_response()
}

async fn get_stack(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let st = state.lock().expect("backend state");
    match st
        .stacks
        .iter()
        .find(|s| s.get("id").and_then(Value::as_str) == Some(id.as_str()))
    {
        Some(stack) => Json(stack.clone()).into_response(),
        None => message(StatusCode::NOT_FOUND, "stack not found"),
    }
}

async fn create_stack(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Response {
    let Some(user) = bearer(&headers) else {
        return message(StatusCode::UNAUTHORIZED, "missing token");
    };

    let mut st = state.lock().expect("backend state");
    st.created_payloads.push(payload.clone());

    if st.fail_create {
        return message(StatusCode::INTERNAL_SERVER_ERROR, "stack service unavailable");
    }

    let name = payload.get("name").and_then(Value::as_str).unwrap_or("");
    if st
        .stacks
        .iter()
        .any(|s| s.get("name").and_then(Value::as_str) == Some(name))
    {
        return message(StatusCode::CONFLICT, "stack name already in use");
    }

    st.next_id += 1;
    let id = format!("stack-{}", st.next_id);
    let mut stored = payload;
    stored["id"] = json!(id.as_str());
    stored["creator"] = json!(user.as_str());
    stored["links"] = json!([{"href": format!("/stacks/{}", id), "rel": "self"}]);
    st.stacks.push(stored.clone());
    st.version += 1;

    (StatusCode::CREATED, Json(stored)).into_response()
}

async fn update_stack(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(payload): Json<Value>,
) -> Response {
    let mut st = state.lock().expect("backend state");
    let Some(pos) = st
        .stacks
        .iter()
        .position(|s| s.get("id").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return message(StatusCode::NOT_FOUND, "stack not found");
    };

    let creator = st.stacks[pos].get("creator").cloned();
    let mut stored = payload;
    stored["id"] = json!(id);
    if let Some(creator) = creator {
        stored["creator"] = creator;
    }
    st.stacks[pos] = stored.clone();
    st.version += 1;

    Json(stored).into_response()
}

async fn delete_stack(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut st = state.lock().expect("backend state");
    st.delete_requests += 1;

    if st.fail_delete.contains(&id) {
        return message(StatusCode::CONFLICT, "stack is locked");
    }

    let Some(pos) = st
        .stacks
        .iter()
        .position(|s| s.get("id").and_then(Value::as_str) == Some(id.as_str()))
    else {
        return message(StatusCode::NOT_FOUND, "stack not found");
    };

    st.stacks.remove(pos);
    st.version += 1;
    StatusCode::NO_CONTENT.into_response()
}

async fn whoami(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(user) => Json(json!({
            "user": user.as_str(),
            "user_id": user.as_str(),
            "admin": false,
        }))
        .into_response(),
        None => message(StatusCode::UNAUTHORIZED, "missing token"),
    }
}
