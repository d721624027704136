//! Derived statistics over the local entry list

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Entry, MediaKind};

/// Aggregates shown on the statistics screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub by_kind: BTreeMap<MediaKind, usize>,
    /// Mean over entries rated 1..=5; `None` when nothing is rated
    pub average_rating: Option<f64>,
    /// Counts for ratings 1 through 5
    pub rating_histogram: [usize; 5],
}

impl Stats {
    pub fn from_entries(entries: &[Entry]) -> Self {
        let mut by_kind = BTreeMap::new();
        let mut rating_histogram = [0usize; 5];
        let mut rating_sum = 0u64;
        let mut rated = 0u64;

        for entry in entries {
            *by_kind.entry(entry.kind).or_insert(0) += 1;
            if let Some(rating @ 1..=5) = entry.rating {
                rating_histogram[usize::from(rating) - 1] += 1;
                rating_sum += u64::from(rating);
                rated += 1;
            }
        }

        let average_rating = (rated > 0).then(|| rating_sum as f64 / rated as f64);

        Self {
            total: entries.len(),
            by_kind,
            average_rating,
            rating_histogram,
        }
    }

    pub fn count(&self, kind: MediaKind) -> usize {
        self.by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rated(title: &str, kind: MediaKind, rating: Option<u8>) -> Entry {
        let mut entry = Entry::new(title, kind);
        entry.rating = rating;
        entry
    }

    #[test]
    fn test_empty_list() {
        let stats = Stats::from_entries(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.average_rating, None);
        assert_eq!(stats.rating_histogram, [0; 5]);
    }

    #[test]
    fn test_counts_and_average_ignore_unrated() {
        let entries = vec![
            rated("Dune", MediaKind::Movie, Some(5)),
            rated("Arrival", MediaKind::Movie, None),
            rated("Dark", MediaKind::Series, Some(4)),
            rated("Hades", MediaKind::Game, Some(3)),
        ];
        let stats = Stats::from_entries(&entries);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.count(MediaKind::Movie), 2);
        assert_eq!(stats.count(MediaKind::Series), 1);
        assert_eq!(stats.count(MediaKind::Anime), 0);
        assert_eq!(stats.average_rating, Some(4.0));
        assert_eq!(stats.rating_histogram, [0, 0, 1, 1, 1]);
    }
}
