//! Upstream search candidates
//!
//! Candidates are never persisted. The two catalog shapes stay separate until
//! the point where a user picks one and it is mapped into an [`Entry`].

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entry::{Entry, ForeignId, MediaKind};
use super::genres::tmdb_genre_names;

/// Poster base URL for TMDB images
pub const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

const THUMB_SIZE_TOKEN: &str = "t_thumb";
const LARGE_SIZE_TOKEN: &str = "t_cover_big";

/// Rewrite an IGDB cover reference to the large variant with an explicit scheme
///
/// `//images.igdb.com/.../t_thumb/abc.jpg` becomes
/// `https://images.igdb.com/.../t_cover_big/abc.jpg`.
pub fn normalize_cover_url(url: &str) -> String {
    let resized = url.replace(THUMB_SIZE_TOKEN, LARGE_SIZE_TOKEN);
    if resized.starts_with("//") {
        format!("https:{}", resized)
    } else {
        resized
    }
}

/// Movie/series search result (TMDB multi-search shape)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleCandidate {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    #[serde(default)]
    pub vote_average: f64,
    /// Filled from the credits endpoint when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
}

impl TitleCandidate {
    pub fn is_movie(&self) -> bool {
        self.media_type == "movie"
    }

    /// Movies and TV shows with a poster; people and poster-less results are dropped
    pub fn is_listable(&self) -> bool {
        (self.media_type == "movie" || self.media_type == "tv") && self.poster_path.is_some()
    }

    pub fn display_title(&self) -> &str {
        let preferred = if self.is_movie() {
            self.title.as_deref().or(self.name.as_deref())
        } else {
            self.name.as_deref().or(self.title.as_deref())
        };
        preferred.unwrap_or_default()
    }

    pub fn year(&self) -> Option<i32> {
        let date = if self.is_movie() {
            self.release_date.as_deref()
        } else {
            self.first_air_date.as_deref()
        }?;
        date.get(..4)?.parse().ok()
    }

    pub fn kind(&self) -> MediaKind {
        if self.is_movie() {
            MediaKind::Movie
        } else {
            MediaKind::Series
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvolvedCompany {
    pub company: NamedRef,
    #[serde(default)]
    pub developer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

/// Game search result (IGDB shape plus the derived large image)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameCandidate {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<Cover>,
    /// Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_release_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    pub involved_companies: Vec<InvolvedCompany>,
    #[serde(default)]
    pub platforms: Vec<Platform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rating: Option<f64>,
    /// Large cover URL, empty when the game has no cover
    #[serde(default)]
    pub processed_image_url: String,
}

impl GameCandidate {
    /// Fill `processed_image_url` from the cover reference
    pub fn with_processed_image(mut self) -> Self {
        self.processed_image_url = self
            .cover
            .as_ref()
            .map(|c| normalize_cover_url(&c.url))
            .unwrap_or_default();
        self
    }

    /// First developer, falling back to the first involved company
    pub fn developer(&self) -> Option<&str> {
        self.involved_companies
            .iter()
            .find(|c| c.developer)
            .or_else(|| self.involved_companies.first())
            .map(|c| c.company.name.as_str())
    }

    pub fn primary_platform(&self) -> Option<&str> {
        let platform = self.platforms.first()?;
        Some(platform.abbreviation.as_deref().unwrap_or(&platform.name))
    }

    pub fn year(&self) -> Option<i32> {
        let secs = self.first_release_date?;
        DateTime::<Utc>::from_timestamp(secs, 0).map(|d| d.year())
    }

    pub fn image_url(&self) -> Option<String> {
        if !self.processed_image_url.is_empty() {
            return Some(self.processed_image_url.clone());
        }
        self.cover.as_ref().map(|c| normalize_cover_url(&c.url))
    }
}

/// A selectable search result from either catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "catalog", rename_all = "lowercase")]
pub enum CatalogCandidate {
    Title(TitleCandidate),
    Game(GameCandidate),
}

impl CatalogCandidate {
    pub fn foreign_id(&self) -> ForeignId {
        match self {
            CatalogCandidate::Title(t) => ForeignId::Tmdb(t.id),
            CatalogCandidate::Game(g) => ForeignId::Igdb(g.id),
        }
    }

    pub fn display_title(&self) -> &str {
        match self {
            CatalogCandidate::Title(t) => t.display_title(),
            CatalogCandidate::Game(g) => &g.name,
        }
    }

    /// Map into a new entry with a fresh id and the current timestamp
    pub fn to_entry(&self, rating: Option<u8>) -> Entry {
        match self {
            CatalogCandidate::Title(t) => Entry {
                id: Uuid::new_v4(),
                title: t.display_title().to_string(),
                kind: t.kind(),
                rating,
                watched_at: Some(Utc::now()),
                genres: tmdb_genre_names(&t.genre_ids),
                year: t.year(),
                creator: t.director.clone().filter(|d| !d.is_empty()),
                platform: None,
                summary: Some(t.overview.clone()).filter(|s| !s.is_empty()),
                review: None,
                image_url: t
                    .poster_path
                    .as_ref()
                    .map(|p| format!("{}{}", TMDB_IMAGE_BASE_URL, p)),
                tmdb_id: Some(t.id),
                igdb_id: None,
                hours_played: None,
            },
            CatalogCandidate::Game(g) => Entry {
                id: Uuid::new_v4(),
                title: g.name.clone(),
                kind: MediaKind::Game,
                rating,
                watched_at: Some(Utc::now()),
                genres: g.genres.iter().map(|n| n.name.clone()).collect(),
                year: g.year(),
                creator: g.developer().map(str::to_string),
                platform: g.primary_platform().map(str::to_string),
                summary: g.summary.clone(),
                review: None,
                image_url: g.image_url(),
                tmdb_id: None,
                igdb_id: Some(g.id),
                hours_played: None,
            },
        }
    }
}
