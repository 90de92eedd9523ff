//! In-process mock of the auth backend for async tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::types::Role;

/// One request observed by the mock.
#[derive(Clone, Debug)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone)]
struct MockState {
    replies: Arc<HashMap<String, (StatusCode, String)>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

pub struct MockBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl MockBackend {
    /// Serve canned `(path, status, body)` replies on an ephemeral port.
    /// Unknown paths answer 404 with a non-JSON body.
    pub async fn start(routes: &[(&str, u16, String)]) -> Self {
        let replies: HashMap<String, (StatusCode, String)> = routes
            .iter()
            .map(|(path, status, body)| {
                ((*path).to_owned(), (StatusCode::from_u16(*status).unwrap(), body.clone()))
            })
            .collect();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let state = MockState { replies: Arc::new(replies), hits: Arc::clone(&hits) };

        let app = Router::new().fallback(handle).with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url: format!("http://{addr}"), hits }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_for(&self, path: &str) -> Vec<Hit> {
        self.hits().into_iter().filter(|h| h.path == path).collect()
    }
}

async fn handle(State(state): State<MockState>, method: Method, uri: Uri, headers: HeaderMap, body: String) -> Response {
    let path = uri.path().to_owned();
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state
        .hits
        .lock()
        .unwrap()
        .push(Hit { method, path: path.clone(), authorization, body });

    match state.replies.get(&path) {
        Some((status, body)) => (*status, body.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "not found".to_owned()).into_response(),
    }
}

/// Base URL that refuses connections.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Base URL that accepts connections and never answers.
pub async fn silent_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{addr}")
}

pub fn user_value(role: Role) -> serde_json::Value {
    json!({
        "id": 12,
        "first_name": "Sam",
        "last_name": "Fade",
        "email": "sam@example.com",
        "role": role,
    })
}

pub fn success_body(token: &str, role: Role) -> String {
    json!({ "success": true, "data": { "token": token, "user": user_value(role) } }).to_string()
}

pub fn failure_body(message: &str) -> String {
    json!({ "success": false, "message": message }).to_string()
}
