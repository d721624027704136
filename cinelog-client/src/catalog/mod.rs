//! Catalog search
//!
//! Movies and series come straight from TMDB; games go through the proxy so
//! the game catalog credentials never reach the client. Search failures are
//! logged and degrade to an empty result list.

pub mod games;
pub mod tmdb;

use cinelog_common::config::CineLogConfig;
use cinelog_common::projection::AppMode;
use cinelog_common::CatalogCandidate;
use tracing::warn;

pub use games::GameSearchClient;
pub use tmdb::TmdbClient;

/// Shorter queries are not sent upstream
pub const MIN_QUERY_LEN: usize = 3;

pub struct CatalogSearch {
    tmdb: TmdbClient,
    games: GameSearchClient,
}

impl CatalogSearch {
    pub fn new(tmdb: TmdbClient, games: GameSearchClient) -> Self {
        Self { tmdb, games }
    }

    pub fn from_config(http: reqwest::Client, config: &CineLogConfig) -> Self {
        Self::new(
            TmdbClient::new(http.clone(), &config.tmdb),
            GameSearchClient::new(http, config.proxy.url.clone()),
        )
    }

    /// Search the catalog that belongs to `mode`
    pub async fn search(&self, query: &str, mode: AppMode) -> Vec<CatalogCandidate> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        match mode {
            AppMode::Catalog => match self.tmdb.search(query).await {
                Ok(titles) => titles.into_iter().map(CatalogCandidate::Title).collect(),
                Err(e) => {
                    warn!(query = %query, "Title search failed: {}", e);
                    Vec::new()
                }
            },
            AppMode::Game => match self.games.search(query).await {
                Ok(games) => games.into_iter().map(CatalogCandidate::Game).collect(),
                Err(e) => {
                    warn!(query = %query, "Game search failed: {}", e);
                    Vec::new()
                }
            },
        }
    }

    /// Fill in details that the search result lacks (the director of a movie)
    pub async fn enrich(&self, candidate: CatalogCandidate) -> CatalogCandidate {
        match candidate {
            CatalogCandidate::Title(mut title) if title.director.is_none() => {
                match self.tmdb.director(&title).await {
                    Ok(director) => title.director = director,
                    Err(e) => warn!(id = title.id, "Credits lookup failed: {}", e),
                }
                CatalogCandidate::Title(title)
            }
            other => other,
        }
    }
}
