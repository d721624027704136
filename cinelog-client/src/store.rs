//! Remote entry store
//!
//! [`EntryStore`] is the seam between the sync controller and persistence.
//! [`SupabaseStore`] implements it over the PostgREST interface of the
//! `watch_entries` table. Rows are snake_case; entries are translated 1:1.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinelog_common::config::SupabaseConfig;
use cinelog_common::{Entry, Error, MediaKind, Result};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::auth::Identity;

const TABLE_PATH: &str = "/rest/v1/watch_entries";

/// Per-identity entry persistence
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// All entries of the identity, newest first; no identity yields an empty list
    async fn fetch_all(&self, identity: Option<&Identity>) -> Result<Vec<Entry>>;

    /// Persist a new entry under its client-generated id
    async fn insert(&self, entry: &Entry, identity: Option<&Identity>) -> Result<()>;

    /// Delete by id; deleting an id that does not exist succeeds
    async fn delete(&self, id: Uuid, identity: Option<&Identity>) -> Result<()>;
}

/// Row shape of the `watch_entries` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRow {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub date_watched: Option<DateTime<Utc>>,
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub director_or_creator: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub tmdb_id: Option<i64>,
    #[serde(default)]
    pub igdb_id: Option<i64>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub time_played: Option<f64>,
}

impl EntryRow {
    pub fn from_entry(entry: &Entry, user_id: &str) -> Self {
        Self {
            id: entry.id,
            user_id: Some(user_id.to_string()),
            title: entry.title.clone(),
            kind: entry.kind,
            rating: entry.rating,
            date_watched: entry.watched_at,
            genre: Some(entry.genres.clone()),
            year: entry.year,
            summary: entry.summary.clone(),
            director_or_creator: entry.creator.clone(),
            image_url: entry.image_url.clone(),
            tmdb_id: entry.tmdb_id,
            igdb_id: entry.igdb_id,
            platform: entry.platform.clone(),
            time_played: entry.hours_played,
        }
    }

    pub fn into_entry(self) -> Entry {
        Entry {
            id: self.id,
            title: self.title,
            kind: self.kind,
            // 0 is the table's "unrated"
            rating: self.rating.filter(|r| (1..=5).contains(r)),
            watched_at: self.date_watched,
            genres: self.genre.unwrap_or_default(),
            year: self.year,
            creator: self.director_or_creator,
            platform: self.platform,
            summary: self.summary,
            review: None,
            image_url: self.image_url,
            tmdb_id: self.tmdb_id,
            igdb_id: self.igdb_id,
            hours_played: self.time_played,
        }
    }
}

/// PostgREST-backed store
pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseStore {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
        }
    }

    pub fn from_config(http: reqwest::Client, config: &SupabaseConfig) -> Result<Self> {
        match (&config.url, &config.anon_key) {
            (Some(url), Some(key)) => Ok(Self::new(http, url.clone(), key.clone())),
            _ => Err(Error::Config(
                "Supabase url and anon key are required".to_string(),
            )),
        }
    }

    fn table_url(&self) -> String {
        format!("{}{}", self.base_url, TABLE_PATH)
    }

    fn authorized(&self, request: RequestBuilder, identity: &Identity) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&identity.access_token)
    }

    async fn send(request: RequestBuilder, action: &str) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("{} failed: {}", action, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Store {} rejected", action);
            return Err(Error::Persistence(format!(
                "{} returned {}: {}",
                action,
                status.as_u16(),
                body
            )));
        }
        Ok(response)
    }
}

#[async_trait]
impl EntryStore for SupabaseStore {
    async fn fetch_all(&self, identity: Option<&Identity>) -> Result<Vec<Entry>> {
        let Some(identity) = identity else {
            debug!("No identity, skipping fetch");
            return Ok(Vec::new());
        };

        let user_filter = format!("eq.{}", identity.user_id);
        let request = self.authorized(self.http.get(self.table_url()), identity).query(&[
            ("select", "*"),
            ("user_id", user_filter.as_str()),
            ("order", "date_watched.desc"),
        ]);

        let rows: Vec<EntryRow> = Self::send(request, "fetch")
            .await?
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("invalid fetch response: {}", e)))?;

        debug!(count = rows.len(), "Fetched entries");
        Ok(rows.into_iter().map(EntryRow::into_entry).collect())
    }

    async fn insert(&self, entry: &Entry, identity: Option<&Identity>) -> Result<()> {
        let identity = identity.ok_or(Error::AuthRequired)?;
        let row = EntryRow::from_entry(entry, &identity.user_id);

        let request = self
            .authorized(self.http.post(self.table_url()), identity)
            .header("Prefer", "return=minimal")
            .json(&[row]);

        Self::send(request, "insert").await?;
        debug!(id = %entry.id, "Entry inserted");
        Ok(())
    }

    async fn delete(&self, id: Uuid, identity: Option<&Identity>) -> Result<()> {
        let identity = identity.ok_or(Error::AuthRequired)?;

        let id_filter = format!("eq.{}", id);
        let user_filter = format!("eq.{}", identity.user_id);
        let request = self
            .authorized(self.http.delete(self.table_url()), identity)
            .query(&[("id", id_filter.as_str()), ("user_id", user_filter.as_str())]);

        Self::send(request, "delete").await?;
        debug!(id = %id, "Entry deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_to_entry() {
        let row: EntryRow = serde_json::from_value(json!({
            "id": "5f0c6a2e-8d6b-4f0e-9a51-2b7b1d1c9e01",
            "user_id": "user-1",
            "title": "Hades",
            "type": "Jogo",
            "rating": 0,
            "date_watched": "2024-03-01T12:00:00Z",
            "genre": null,
            "igdb_id": 113112,
            "platform": "PC",
            "time_played": 42.5
        }))
        .unwrap();

        let entry = row.into_entry();
        assert_eq!(entry.kind, MediaKind::Game);
        assert_eq!(entry.rating, None);
        assert!(entry.genres.is_empty());
        assert_eq!(entry.igdb_id, Some(113112));
        assert_eq!(entry.hours_played, Some(42.5));
    }

    #[test]
    fn test_entry_to_row_is_snake_case() {
        let mut entry = Entry::new("Arrival", MediaKind::Movie);
        entry.creator = Some("Denis Villeneuve".into());
        entry.tmdb_id = Some(329865);
        entry.rating = Some(4);

        let value = serde_json::to_value(EntryRow::from_entry(&entry, "user-1")).unwrap();
        assert_eq!(value["user_id"], "user-1");
        assert_eq!(value["type"], "Filme");
        assert_eq!(value["director_or_creator"], "Denis Villeneuve");
        assert_eq!(value["tmdb_id"], 329865);
        assert_eq!(value["rating"], 4);
        assert!(value.get("date_watched").is_some());
        assert!(value.get("directorOrCreator").is_none());
    }
}
