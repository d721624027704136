//! Error types for cinelog-proxy
//!
//! Every failure is rendered as `{ "error": message }` so browser clients can
//! show it directly.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("{0}")]
    BadRequest(String),

    /// cinelog-common error (token exchange, upstream search, ...)
    #[error(transparent)]
    Common(#[from] cinelog_common::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Common(cinelog_common::Error::UpstreamAuth(_))
            | ApiError::Common(cinelog_common::Error::Upstream { .. }) => StatusCode::BAD_GATEWAY,
            ApiError::Common(cinelog_common::Error::InvalidInput(_)) => StatusCode::BAD_REQUEST,
            ApiError::Common(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_maps_to_bad_gateway() {
        let err = ApiError::from(cinelog_common::Error::upstream(500, "boom"));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "Upstream error 500: boom");
    }

    #[test]
    fn test_bad_request_message_is_bare() {
        let err = ApiError::BadRequest("Query is required".to_string());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Query is required");
    }
}
