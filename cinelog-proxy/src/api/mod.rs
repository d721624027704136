//! HTTP API handlers for cinelog-proxy

pub mod health;
pub mod search;

pub use health::health_routes;
pub use search::search_routes;
