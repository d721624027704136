//! Movie/series catalog client (TMDB)

use cinelog_common::config::TmdbConfig;
use cinelog_common::models::TitleCandidate;
use cinelog_common::{Error, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    name: String,
    #[serde(default)]
    job: String,
}

#[derive(Debug, Deserialize)]
struct Credits {
    #[serde(default)]
    crew: Vec<CrewMember>,
}

pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    language: String,
}

impl TmdbClient {
    pub fn new(http: reqwest::Client, config: &TmdbConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            language: config.language.clone(),
        }
    }

    /// Multi-search, keeping only movies and series that have a poster
    ///
    /// Without an API key this is an empty list and no request is made.
    pub async fn search(&self, query: &str) -> Result<Vec<TitleCandidate>> {
        let Some(api_key) = &self.api_key else {
            debug!("No TMDB API key configured");
            return Ok(Vec::new());
        };

        let response = self
            .http
            .get(format!("{}/search/multi", self.base_url))
            .query(&[
                ("api_key", api_key.as_str()),
                ("language", self.language.as_str()),
                ("query", query),
                ("page", "1"),
                ("include_adult", "false"),
            ])
            .send()
            .await
            .map_err(|e| Error::upstream(502, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(status.as_u16(), body));
        }

        let page: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(status.as_u16(), format!("invalid TMDB response: {}", e)))?;

        // People results have a different shape; skip anything that does not parse
        let titles: Vec<TitleCandidate> = page
            .results
            .into_iter()
            .filter_map(|v| serde_json::from_value::<TitleCandidate>(v).ok())
            .filter(TitleCandidate::is_listable)
            .collect();

        debug!(query = %query, results = titles.len(), "TMDB search complete");
        Ok(titles)
    }

    /// Director of a movie; series have no single director and yield `None`
    pub async fn director(&self, candidate: &TitleCandidate) -> Result<Option<String>> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };
        if !candidate.is_movie() {
            return Ok(None);
        }

        let response = self
            .http
            .get(format!("{}/movie/{}/credits", self.base_url, candidate.id))
            .query(&[("api_key", api_key.as_str()), ("language", self.language.as_str())])
            .send()
            .await
            .map_err(|e| Error::upstream(502, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(status.as_u16(), body));
        }

        let credits: Credits = response
            .json()
            .await
            .map_err(|e| Error::upstream(status.as_u16(), format!("invalid credits response: {}", e)))?;

        Ok(credits
            .crew
            .into_iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name))
    }
}
