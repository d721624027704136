//! Shared fixtures for cinelog-client integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cinelog_client::store::EntryStore;
use cinelog_client::Identity;
use cinelog_common::models::{GameCandidate, TitleCandidate};
use cinelog_common::{CatalogCandidate, Entry, Error, Result};
use tokio::sync::Notify;
use uuid::Uuid;

/// In-memory store with per-title failure injection and gating
#[derive(Default)]
pub struct MockStore {
    rows: Mutex<Vec<Entry>>,
    failing_titles: Mutex<HashSet<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub fail_fetch: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fetch_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MockStore {
    pub fn with_rows(rows: Vec<Entry>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Self::default()
        }
    }

    pub fn rows(&self) -> Vec<Entry> {
        self.rows.lock().unwrap().clone()
    }

    /// Inserts of this title are rejected
    pub fn fail_insert_of(&self, title: &str) {
        self.failing_titles.lock().unwrap().insert(title.to_string());
    }

    /// Inserts of this title wait until the returned handle is notified
    pub fn gate_insert_of(&self, title: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(title.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EntryStore for MockStore {
    async fn fetch_all(&self, identity: Option<&Identity>) -> Result<Vec<Entry>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if identity.is_none() {
            return Ok(Vec::new());
        }
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(Error::Persistence("fetch unavailable".into()));
        }
        Ok(self.rows())
    }

    async fn insert(&self, entry: &Entry, identity: Option<&Identity>) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gates.lock().unwrap().get(&entry.title).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if identity.is_none() {
            return Err(Error::AuthRequired);
        }
        if self.failing_titles.lock().unwrap().contains(&entry.title) {
            return Err(Error::Persistence(format!("insert of {} rejected", entry.title)));
        }
        self.rows.lock().unwrap().insert(0, entry.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid, identity: Option<&Identity>) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if identity.is_none() {
            return Err(Error::AuthRequired);
        }
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::Persistence("delete rejected".into()));
        }
        self.rows.lock().unwrap().retain(|e| e.id != id);
        Ok(())
    }
}

pub fn identity() -> Identity {
    Identity {
        user_id: "8d2f3c1a-0b4e-4c57-9f6e-1a2b3c4d5e6f".to_string(),
        access_token: "jwt-token".to_string(),
        email: Some("ana@example.com".to_string()),
    }
}

pub fn movie(id: i64, title: &str) -> CatalogCandidate {
    CatalogCandidate::Title(TitleCandidate {
        id,
        title: Some(title.to_string()),
        name: None,
        media_type: "movie".to_string(),
        poster_path: Some(format!("/poster{}.jpg", id)),
        release_date: Some("2021-09-15".to_string()),
        first_air_date: None,
        overview: String::new(),
        genre_ids: vec![878],
        vote_average: 7.5,
        director: None,
    })
}

pub fn game(id: i64, name: &str) -> CatalogCandidate {
    CatalogCandidate::Game(GameCandidate {
        id,
        name: name.to_string(),
        cover: None,
        first_release_date: None,
        summary: None,
        genres: Vec::new(),
        involved_companies: Vec::new(),
        platforms: Vec::new(),
        total_rating: None,
        processed_image_url: String::new(),
    })
}

/// A stored entry carrying a catalog id
pub fn stored_movie(tmdb_id: i64, title: &str) -> Entry {
    let mut entry = Entry::new(title, cinelog_common::MediaKind::Movie);
    entry.tmdb_id = Some(tmdb_id);
    entry
}
