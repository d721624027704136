//! List view projection
//!
//! Pure derivation of the visible list from the authoritative local entries.
//! Filtering keeps relative order and every sort is stable, so projecting an
//! already projected list with the same parameters returns it unchanged.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Entry, MediaKind};
use crate::{Error, Result};

/// Which half of the catalog is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    /// Movies, series and anime
    #[default]
    Catalog,
    /// Games only
    Game,
}

impl AppMode {
    pub fn admits(self, kind: MediaKind) -> bool {
        match self {
            AppMode::Game => kind.is_game(),
            AppMode::Catalog => !kind.is_game(),
        }
    }
}

impl FromStr for AppMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "catalog" | "cine" => Ok(AppMode::Catalog),
            "game" | "games" => Ok(AppMode::Game),
            other => Err(Error::InvalidInput(format!("unknown mode: {}", other))),
        }
    }
}

/// Kind filter; `All` is the pass-through sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(MediaKind),
}

impl TypeFilter {
    pub fn admits(self, kind: MediaKind) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(k) => k == kind,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        s.parse().map(TypeFilter::Only)
    }
}

/// Total orders offered by the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    #[default]
    Recent,
    Oldest,
    TitleAsc,
    TitleDesc,
    RatingDesc,
}

impl FromStr for SortOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "recent" => Ok(SortOption::Recent),
            "oldest" => Ok(SortOption::Oldest),
            "titleAsc" | "title-asc" => Ok(SortOption::TitleAsc),
            "titleDesc" | "title-desc" => Ok(SortOption::TitleDesc),
            "ratingDesc" | "rating-desc" => Ok(SortOption::RatingDesc),
            other => Err(Error::InvalidInput(format!("unknown sort option: {}", other))),
        }
    }
}

/// Filter and sort `entries` for display
pub fn project(
    entries: &[Entry],
    mode: AppMode,
    search_term: &str,
    type_filter: TypeFilter,
    sort: SortOption,
) -> Vec<Entry> {
    let needle = search_term.to_lowercase();

    let mut visible: Vec<Entry> = entries
        .iter()
        .filter(|e| mode.admits(e.kind))
        .filter(|e| e.matches_text(&needle))
        .filter(|e| type_filter.admits(e.kind))
        .cloned()
        .collect();

    // sort_by is stable: equal keys keep insertion order
    match sort {
        SortOption::Recent => visible.sort_by(|a, b| b.watched_at.cmp(&a.watched_at)),
        SortOption::Oldest => visible.sort_by(|a, b| a.watched_at.cmp(&b.watched_at)),
        SortOption::TitleAsc => visible.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortOption::TitleDesc => visible.sort_by(|a, b| compare_titles(&b.title, &a.title)),
        SortOption::RatingDesc => visible.sort_by(|a, b| rating_key(b).cmp(&rating_key(a))),
    }

    visible
}

fn rating_key(entry: &Entry) -> i16 {
    entry.rating.map(i16::from).unwrap_or(-1)
}

/// Primary collation key: accents folded, case folded
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Locale-style title comparison
///
/// Accent- and case-insensitive first, raw text only as a tie-break so the
/// order stays total.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_titles_folds_accents_and_case() {
        assert_ne!(compare_titles("Élite", "elite"), Ordering::Equal);
        assert_eq!(compare_titles("Élite", "Fargo"), Ordering::Less);
        assert_eq!(compare_titles("amélie", "Avatar"), Ordering::Less);
        assert_eq!(compare_titles("zodiac", "Alien"), Ordering::Greater);
    }

    #[test]
    fn test_sort_option_from_wire_names() {
        assert_eq!("ratingDesc".parse::<SortOption>().unwrap(), SortOption::RatingDesc);
        assert_eq!("title-asc".parse::<SortOption>().unwrap(), SortOption::TitleAsc);
        assert!("random".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_type_filter_from_str() {
        assert_eq!("ALL".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "series".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(MediaKind::Series)
        );
    }

    #[test]
    fn test_mode_admits() {
        assert!(AppMode::Game.admits(MediaKind::Game));
        assert!(!AppMode::Game.admits(MediaKind::Anime));
        assert!(AppMode::Catalog.admits(MediaKind::Anime));
        assert!(!AppMode::Catalog.admits(MediaKind::Game));
    }
}
