//! # CineLog Common Library
//!
//! Shared code for the CineLog proxy and client including:
//! - Entry data model and catalog candidates
//! - Error taxonomy
//! - Configuration loading
//! - List view projection and statistics
//! - Backup document

pub mod backup;
pub mod config;
pub mod error;
pub mod models;
pub mod projection;
pub mod stats;

pub use error::{Error, Result};
pub use models::{CatalogCandidate, Entry, ForeignId, GameCandidate, MediaKind, TitleCandidate};
