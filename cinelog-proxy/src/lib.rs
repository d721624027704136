//! cinelog-proxy library interface
//!
//! Game-catalog search proxy: holds the IGDB secrets server side and exposes
//! a CORS-open search endpoint to clients.

pub mod api;
pub mod error;
pub mod igdb;
pub mod token;

pub use crate::error::{ApiError, ApiResult};

use axum::http::Method;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::igdb::IgdbClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Game catalog client (owns the token cache)
    pub igdb: Arc<IgdbClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last upstream error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(igdb: IgdbClient) -> Self {
        Self {
            igdb: Arc::new(igdb),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Permissive CORS: the endpoint is a public proxy holding server-side secrets
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::OPTIONS,
            Method::PATCH,
            Method::DELETE,
            Method::POST,
            Method::PUT,
        ])
        .allow_headers(Any)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::search_routes())
        .merge(api::health_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
