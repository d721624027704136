//! Game search through the cinelog proxy

use cinelog_common::models::GameCandidate;
use cinelog_common::{Error, Result};
use serde_json::json;
use tracing::debug;

pub struct GameSearchClient {
    http: reqwest::Client,
    proxy_url: String,
}

impl GameSearchClient {
    pub fn new(http: reqwest::Client, proxy_url: impl Into<String>) -> Self {
        Self {
            http,
            proxy_url: proxy_url.into(),
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<GameCandidate>> {
        let response = self
            .http
            .post(&self.proxy_url)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| Error::upstream(502, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(status.as_u16(), body));
        }

        let games: Vec<GameCandidate> = response
            .json()
            .await
            .map_err(|e| Error::upstream(status.as_u16(), format!("invalid proxy response: {}", e)))?;

        debug!(query = %query, results = games.len(), "Game search complete");
        Ok(games)
    }
}
