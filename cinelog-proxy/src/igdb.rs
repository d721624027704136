//! IGDB game search client
//!
//! Forwards a free-text query to the IGDB games endpoint using the cached
//! bearer token and normalizes the result shape.

use std::sync::Arc;
use std::time::Duration;

use cinelog_common::config::IgdbConfig;
use cinelog_common::models::GameCandidate;
use cinelog_common::{Error, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::token::TokenCache;

/// Upper bound on returned candidates
pub const MAX_RESULTS: usize = 20;

const USER_AGENT: &str = concat!("cinelog-proxy/", env!("CARGO_PKG_VERSION"));

/// Status reported when the upstream could not be reached at all
const TRANSPORT_FAILURE_STATUS: u16 = 502;

/// Escape a value for use inside an IGDB query string literal
fn escape_query(query: &str) -> String {
    query.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Build the IGDB query body for a free-text search
pub fn build_search_query(query: &str) -> String {
    format!(
        "search \"{}\";\n\
         fields name, cover.url, first_release_date, summary, genres.name, \
         involved_companies.company.name, involved_companies.developer, \
         platforms.name, platforms.abbreviation, total_rating, category;\n\
         where category = (0, 8, 9);\n\
         limit {};\n",
        escape_query(query),
        MAX_RESULTS
    )
}

/// IGDB API client
pub struct IgdbClient {
    http: reqwest::Client,
    api_url: String,
    tokens: Arc<TokenCache>,
}

impl IgdbClient {
    pub fn new(http: reqwest::Client, api_url: impl Into<String>, tokens: Arc<TokenCache>) -> Self {
        Self {
            http,
            api_url: api_url.into(),
            tokens,
        }
    }

    /// Build the client and its token cache from configuration
    pub fn from_config(config: &IgdbConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;
        let tokens = Arc::new(TokenCache::from_config(http.clone(), config));
        Ok(Self::new(http, config.api_url.clone(), tokens))
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Search games by name, at most [`MAX_RESULTS`] candidates
    ///
    /// Zero matches is an empty list, not an error.
    pub async fn search(&self, query: &str) -> Result<Vec<GameCandidate>> {
        let token = self.tokens.get_token().await?;

        debug!(query = %query, "Querying IGDB API");

        let mut request = self
            .http
            .post(&self.api_url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "text/plain")
            .body(build_search_query(query));
        if let Some(client_id) = self.tokens.client_id() {
            request = request.header("Client-ID", client_id);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::upstream(TRANSPORT_FAILURE_STATUS, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                warn!("IGDB rejected bearer token, dropping cached token");
                self.tokens.invalidate().await;
            }
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(status.as_u16(), body));
        }

        let mut games: Vec<GameCandidate> = response
            .json()
            .await
            .map_err(|e| Error::upstream(status.as_u16(), format!("invalid IGDB response: {}", e)))?;

        games.truncate(MAX_RESULTS);
        let games: Vec<GameCandidate> = games
            .into_iter()
            .map(GameCandidate::with_processed_image)
            .collect();

        info!(query = %query, results = games.len(), "IGDB search complete");
        Ok(games)
    }
}
