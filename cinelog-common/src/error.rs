//! Common error types for CineLog

use thiserror::Error;

/// Common result type for CineLog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the proxy and the client
///
/// None of these are retried automatically. Callers either degrade to an
/// empty/previous state or surface the message and wait for the user.
#[derive(Error, Debug)]
pub enum Error {
    /// No identity present for a store operation
    #[error("Sign in required")]
    AuthRequired,

    /// Minting a game-catalog bearer token failed
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),

    /// Upstream catalog returned a non-success status
    #[error("Upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Remote store write/delete failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Candidate already present in the local list
    #[error("Already in your list: {0}")]
    Duplicate(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build an upstream error from a status code and response body
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Error::Upstream {
            status,
            body: body.into(),
        }
    }

    /// True for failures of a remote store mutation (the revert trigger)
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Error::AuthRequired | Error::Persistence(_))
    }
}
