//! # CineLog client
//!
//! Everything the `cinelog` binary needs to talk to the outside world:
//! - Identity provider (sign in, sign up, persisted session)
//! - Remote entry store behind the [`store::EntryStore`] trait
//! - Optimistic sync controller owning the local entry list
//! - Catalog search (movies/series directly, games through the proxy)
//! - Taste profile analysis

pub mod auth;
pub mod catalog;
pub mod events;
pub mod profile;
pub mod store;
pub mod sync;

use std::time::Duration;

use cinelog_common::{Error, Result};

pub use auth::Identity;
pub use events::{EventBus, SyncEvent};
pub use store::{EntryStore, SupabaseStore};
pub use sync::SyncController;

const USER_AGENT: &str = concat!("cinelog/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for every upstream the client talks to
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Config(format!("HTTP client: {}", e)))
}
