//! Shared utilities for integration testing: a programmable mock Clash
//! controller speaking the subset of the controller API the service uses.

// Each test binary uses a different slice of this module.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

/// One selector group held by the mock controller.
pub struct MockGroup {
    pub now: Mutex<String>,
    pub members: Vec<String>,
    /// Member → latency returned by the delay endpoint. Members absent
    /// here are omitted from the response (unreachable).
    pub delays: Mutex<HashMap<String, u64>>,
}

impl MockGroup {
    pub fn new(now: &str, members: &[&str]) -> Self {
        Self {
            now: Mutex::new(now.to_string()),
            members: members.iter().map(|m| m.to_string()).collect(),
            delays: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_delays(&self, delays: &[(&str, u64)]) {
        let mut guard = self.delays.lock().unwrap();
        guard.clear();
        for (member, delay) in delays {
            guard.insert(member.to_string(), *delay);
        }
    }

    pub fn active(&self) -> String {
        self.now.lock().unwrap().clone()
    }
}

/// Programmable mock Clash controller.
pub struct MockClash {
    pub groups: HashMap<String, MockGroup>,
    pub select_calls: AtomicU32,
    pub probe_calls: AtomicU32,
    /// When set, the select endpoint answers 500.
    pub fail_select: AtomicBool,
}

impl MockClash {
    pub fn new() -> Self {
        Self {
            groups: HashMap::new(),
            select_calls: AtomicU32::new(0),
            probe_calls: AtomicU32::new(0),
            fail_select: AtomicBool::new(false),
        }
    }

    pub fn with_group(mut self, name: &str, group: MockGroup) -> Self {
        self.groups.insert(name.to_string(), group);
        self
    }

    pub fn group(&self, name: &str) -> &MockGroup {
        &self.groups[name]
    }
}

async fn get_version() -> Json<Value> {
    Json(json!({ "version": "1.18.0", "premium": true }))
}

async fn get_group(
    State(state): State<Arc<MockClash>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    let group = state.groups.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({
        "name": name,
        "type": "Selector",
        "now": group.active(),
        "all": group.members,
    })))
}

async fn select_proxy(
    State(state): State<Arc<MockClash>>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    state.select_calls.fetch_add(1, Ordering::SeqCst);
    if state.fail_select.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let Some(group) = state.groups.get(&name) else {
        return StatusCode::NOT_FOUND;
    };
    let Some(target) = body.get("name").and_then(Value::as_str) else {
        return StatusCode::BAD_REQUEST;
    };
    if !group.members.iter().any(|m| m == target) {
        return StatusCode::BAD_REQUEST;
    }
    *group.now.lock().unwrap() = target.to_string();
    StatusCode::NO_CONTENT
}

async fn group_delay(
    State(state): State<Arc<MockClash>>,
    Path(name): Path<String>,
    Query(_params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    state.probe_calls.fetch_add(1, Ordering::SeqCst);
    let group = state.groups.get(&name).ok_or(StatusCode::NOT_FOUND)?;
    let delays = group.delays.lock().unwrap();
    let body: serde_json::Map<String, Value> = delays
        .iter()
        .map(|(member, delay)| (member.clone(), json!(delay)))
        .collect();
    Ok(Json(Value::Object(body)))
}

/// Start the mock controller on an ephemeral port, returning its state and
/// base URL.
pub async fn start_mock_clash(mock: MockClash) -> (Arc<MockClash>, String) {
    let state = Arc::new(mock);
    let app = Router::new()
        .route("/version", get(get_version))
        .route("/proxies/{name}", get(get_group).put(select_proxy))
        .route("/group/{name}/delay", get(group_delay))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0".parse::<SocketAddr>().unwrap())
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (state, format!("http://{}", addr))
}
