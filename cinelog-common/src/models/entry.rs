//! Catalog entry model
//!
//! An [`Entry`] is one item a user has consumed. Ids are generated on the
//! client so an entry can be shown before the remote store has seen it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Kind of catalogued item
///
/// Wire labels are the values already stored in the remote table; English
/// names are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MediaKind {
    #[serde(rename = "Filme", alias = "Movie")]
    Movie,
    #[serde(rename = "Série", alias = "Series")]
    Series,
    #[serde(rename = "Anime")]
    Anime,
    #[serde(rename = "Jogo", alias = "Game")]
    Game,
}

impl MediaKind {
    pub const ALL: [MediaKind; 4] = [
        MediaKind::Movie,
        MediaKind::Series,
        MediaKind::Anime,
        MediaKind::Game,
    ];

    /// Label used in the remote table and in backups
    pub fn wire_label(self) -> &'static str {
        match self {
            MediaKind::Movie => "Filme",
            MediaKind::Series => "Série",
            MediaKind::Anime => "Anime",
            MediaKind::Game => "Jogo",
        }
    }

    pub fn is_game(self) -> bool {
        self == MediaKind::Game
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Movie => "Movie",
            MediaKind::Series => "Series",
            MediaKind::Anime => "Anime",
            MediaKind::Game => "Game",
        };
        f.write_str(name)
    }
}

impl FromStr for MediaKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        MediaKind::ALL
            .into_iter()
            .find(|kind| {
                trimmed.eq_ignore_ascii_case(&kind.to_string()) || trimmed == kind.wire_label()
            })
            .ok_or_else(|| Error::InvalidInput(format!("unknown media kind: {}", s)))
    }
}

/// Identifier into one of the upstream catalogs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignId {
    /// Movie/series catalog (TMDB)
    Tmdb(i64),
    /// Game catalog (IGDB)
    Igdb(i64),
}

impl fmt::Display for ForeignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForeignId::Tmdb(id) => write!(f, "tmdb:{}", id),
            ForeignId::Igdb(id) => write!(f, "igdb:{}", id),
        }
    }
}

/// One catalogued item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(rename = "dateWatched", default)]
    pub watched_at: Option<DateTime<Utc>>,
    #[serde(rename = "genre", default)]
    pub genres: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "directorOrCreator", default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub igdb_id: Option<i64>,
    #[serde(rename = "timePlayed", default, skip_serializing_if = "Option::is_none")]
    pub hours_played: Option<f64>,
}

impl Entry {
    /// Create an entry with a fresh client-side id and no optional fields
    pub fn new(title: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            rating: None,
            watched_at: Some(Utc::now()),
            genres: Vec::new(),
            year: None,
            creator: None,
            platform: None,
            summary: None,
            review: None,
            image_url: None,
            tmdb_id: None,
            igdb_id: None,
            hours_played: None,
        }
    }

    /// Duplicate-guard match; ids are only compared within the same catalog
    pub fn has_foreign_id(&self, foreign_id: ForeignId) -> bool {
        match foreign_id {
            ForeignId::Tmdb(id) => self.tmdb_id == Some(id),
            ForeignId::Igdb(id) => self.igdb_id == Some(id),
        }
    }

    /// Case-insensitive substring match on title or creator
    ///
    /// `needle` must already be lowercased.
    pub fn matches_text(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(needle)
            || self
                .creator
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
    }
}

/// Normalize a user rating: 0 means unrated, 1..=5 is kept, anything else is rejected
pub fn normalize_rating(rating: u8) -> Result<Option<u8>> {
    match rating {
        0 => Ok(None),
        1..=5 => Ok(Some(rating)),
        other => Err(Error::InvalidInput(format!(
            "rating must be between 1 and 5, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_to_wire_label() {
        let json = serde_json::to_string(&MediaKind::Series).unwrap();
        assert_eq!(json, "\"Série\"");
    }

    #[test]
    fn test_kind_accepts_english_alias() {
        let kind: MediaKind = serde_json::from_str("\"Game\"").unwrap();
        assert_eq!(kind, MediaKind::Game);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("movie".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert_eq!("Jogo".parse::<MediaKind>().unwrap(), MediaKind::Game);
        assert!("podcast".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_has_foreign_id_within_catalog() {
        let mut entry = Entry::new("Dune", MediaKind::Movie);
        assert!(!entry.has_foreign_id(ForeignId::Tmdb(438631)));
        entry.tmdb_id = Some(438631);
        assert!(entry.has_foreign_id(ForeignId::Tmdb(438631)));
        assert!(!entry.has_foreign_id(ForeignId::Igdb(438631)));

        let mut game = Entry::new("Hades", MediaKind::Game);
        game.igdb_id = Some(113112);
        assert!(game.has_foreign_id(ForeignId::Igdb(113112)));
    }

    #[test]
    fn test_same_number_in_different_catalogs_is_distinct() {
        assert_ne!(ForeignId::Tmdb(7), ForeignId::Igdb(7));
    }

    #[test]
    fn test_matches_text_on_creator() {
        let mut entry = Entry::new("Arrival", MediaKind::Movie);
        assert!(!entry.matches_text("villeneuve"));
        entry.creator = Some("Denis Villeneuve".into());
        assert!(entry.matches_text("villeneuve"));
        assert!(entry.matches_text("arr"));
        assert!(entry.matches_text(""));
    }

    #[test]
    fn test_normalize_rating() {
        assert_eq!(normalize_rating(0).unwrap(), None);
        assert_eq!(normalize_rating(5).unwrap(), Some(5));
        assert!(normalize_rating(6).is_err());
    }

    #[test]
    fn test_entry_json_uses_camel_case() {
        let mut entry = Entry::new("Dune", MediaKind::Movie);
        entry.creator = Some("Denis Villeneuve".into());
        entry.tmdb_id = Some(438631);
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "Filme");
        assert_eq!(value["directorOrCreator"], "Denis Villeneuve");
        assert_eq!(value["tmdbId"], 438631);
        assert!(value.get("dateWatched").is_some());
        assert!(value.get("rating").is_none());
    }
}
