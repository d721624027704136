//! Health check endpoint
//!
//! Reports whether the proxy can authenticate against the game catalog
//! without minting a token. `degraded` means no credentials are configured,
//! so every search will fail with 502.

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::token::{TokenSource, TokenStatus};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok" or "degraded"
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Bearer token state for the game catalog
    pub token: TokenStatus,
    /// Last failed search, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let token = state.igdb.tokens().status().await;
    let status = match token.source {
        TokenSource::Unconfigured => "degraded",
        TokenSource::Static | TokenSource::ClientCredentials => "ok",
    };
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    Json(HealthResponse {
        status,
        service: "cinelog-proxy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        token,
        last_error: state.last_error.read().await.clone(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
