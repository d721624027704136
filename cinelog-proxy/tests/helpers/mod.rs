//! Mock game catalog upstream for integration tests
//!
//! Serves a token endpoint and a games endpoint on an ephemeral port, counts
//! hits, and records what the proxy sent.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Upstream behavior knobs and recorded traffic
pub struct UpstreamState {
    pub token_hits: AtomicUsize,
    pub games_hits: AtomicUsize,
    pub token_status: AtomicU16,
    pub token_ttl_secs: AtomicU64,
    pub games_status: AtomicU16,
    pub games_body: Mutex<Value>,
    pub last_authorization: Mutex<Option<String>>,
    pub last_client_id: Mutex<Option<String>>,
    pub last_query_body: Mutex<Option<String>>,
}

impl Default for UpstreamState {
    fn default() -> Self {
        Self {
            token_hits: AtomicUsize::new(0),
            games_hits: AtomicUsize::new(0),
            token_status: AtomicU16::new(200),
            token_ttl_secs: AtomicU64::new(3600),
            games_status: AtomicU16::new(200),
            games_body: Mutex::new(json!([])),
            last_authorization: Mutex::new(None),
            last_client_id: Mutex::new(None),
            last_query_body: Mutex::new(None),
        }
    }
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub state: Arc<UpstreamState>,
}

impl MockUpstream {
    pub async fn start() -> Self {
        let state = Arc::new(UpstreamState::default());
        let app = Router::new()
            .route("/oauth2/token", post(token_handler))
            .route("/v4/games", post(games_handler))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn token_url(&self) -> String {
        format!("http://{}/oauth2/token", self.addr)
    }

    pub fn games_url(&self) -> String {
        format!("http://{}/v4/games", self.addr)
    }

    pub fn token_hits(&self) -> usize {
        self.state.token_hits.load(Ordering::SeqCst)
    }

    pub fn games_hits(&self) -> usize {
        self.state.games_hits.load(Ordering::SeqCst)
    }

    pub fn set_token_status(&self, status: u16) {
        self.state.token_status.store(status, Ordering::SeqCst);
    }

    pub fn set_token_ttl(&self, secs: u64) {
        self.state.token_ttl_secs.store(secs, Ordering::SeqCst);
    }

    pub fn set_games(&self, status: u16, body: Value) {
        self.state.games_status.store(status, Ordering::SeqCst);
        *self.state.games_body.lock().unwrap() = body;
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }

    pub fn last_client_id(&self) -> Option<String> {
        self.state.last_client_id.lock().unwrap().clone()
    }

    pub fn last_query_body(&self) -> Option<String> {
        self.state.last_query_body.lock().unwrap().clone()
    }
}

async fn token_handler(State(state): State<Arc<UpstreamState>>) -> Response {
    let hit = state.token_hits.fetch_add(1, Ordering::SeqCst) + 1;
    let status = StatusCode::from_u16(state.token_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if !status.is_success() {
        return (status, "invalid client").into_response();
    }
    Json(json!({
        "access_token": format!("token-{}", hit),
        "expires_in": state.token_ttl_secs.load(Ordering::SeqCst),
        "token_type": "bearer"
    }))
    .into_response()
}

async fn games_handler(
    State(state): State<Arc<UpstreamState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    state.games_hits.fetch_add(1, Ordering::SeqCst);
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    *state.last_authorization.lock().unwrap() = header("authorization");
    *state.last_client_id.lock().unwrap() = header("client-id");
    *state.last_query_body.lock().unwrap() = Some(body);

    let status = StatusCode::from_u16(state.games_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let payload = state.games_body.lock().unwrap().clone();
    if status.is_success() {
        (status, Json(payload)).into_response()
    } else {
        let text = payload.as_str().map(str::to_string).unwrap_or_else(|| payload.to_string());
        (status, text).into_response()
    }
}

/// A game in the raw upstream shape
pub fn raw_game(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "cover": { "url": format!("//images.igdb.com/igdb/image/upload/t_thumb/co{}.jpg", id) },
        "first_release_date": 1_600_000_000,
        "genres": [{ "name": "Adventure" }],
        "involved_companies": [{ "company": { "name": "Studio" }, "developer": true }],
        "platforms": [{ "name": "PC (Microsoft Windows)", "abbreviation": "PC" }]
    })
}
