//! Game search endpoint
//!
//! `POST /api/igdb` (alias `POST /api/search-games`)
//!
//! **Request:** `{"query": "zelda"}`, a bare text body, or `?query=zelda`
//! **Response:** JSON array of normalized game candidates
//!
//! **Errors:**
//! - 400 Bad Request: missing or blank query, or a malformed query string
//! - 502 Bad Gateway: token exchange or upstream search failed

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::Uri,
    routing::post,
    Json, Router,
};
use cinelog_common::models::GameCandidate;
use serde::Deserialize;
use tracing::{error, info};

use crate::{ApiError, ApiResult, AppState};

/// Query-string form of the search request
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse the query string, rejecting it as a JSON 400 when malformed
pub fn search_params(uri: &Uri) -> Result<SearchParams, ApiError> {
    Query::<SearchParams>::try_from_uri(uri)
        .map(|Query(params)| params)
        .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {}", e.body_text())))
}

/// Pull the query from the query string, a JSON body, or a plain text body
pub fn extract_query(params: &SearchParams, body: &[u8]) -> Option<String> {
    if let Some(query) = params.query.as_deref().and_then(non_blank) {
        return Some(query);
    }

    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            map.get("query").and_then(|q| q.as_str()).and_then(non_blank)
        }
        Ok(serde_json::Value::String(text)) => non_blank(&text),
        Ok(_) => None,
        Err(_) => std::str::from_utf8(body).ok().and_then(non_blank),
    }
}

/// POST /api/igdb handler
pub async fn search_games(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> ApiResult<Json<Vec<GameCandidate>>> {
    let params = search_params(&uri)?;
    let query = extract_query(&params, &body)
        .ok_or_else(|| ApiError::BadRequest("Query is required".to_string()))?;

    info!(query = %query, "Game search request");

    match state.igdb.search(&query).await {
        Ok(games) => Ok(Json(games)),
        Err(e) => {
            error!(query = %query, "Game search failed: {}", e);
            *state.last_error.write().await = Some(e.to_string());
            Err(e.into())
        }
    }
}

/// Build search routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/igdb", post(search_games))
        .route("/api/search-games", post(search_games))
}
