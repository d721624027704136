//! Optimistic sync controller
//!
//! Owns the local entry list. Mutations are applied locally first, then sent
//! to the store. When the store call fails, the controller emits
//! [`SyncEvent::MutationFailed`], reloads the full list from the store and
//! returns the original error.
//!
//! A revert replaces the whole list, so it can also discard another local
//! mutation whose remote call has not landed yet. The next refresh restores
//! whatever the store actually holds.
//!
//! The list lock is never held across a store call.

use std::sync::Arc;

use cinelog_common::backup::Backup;
use cinelog_common::models::{normalize_rating, TasteProfile};
use cinelog_common::projection::{project, AppMode, SortOption, TypeFilter};
use cinelog_common::stats::Stats;
use cinelog_common::{CatalogCandidate, Entry, Error, Result};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::Identity;
use crate::events::{EventBus, SyncEvent};
use crate::store::EntryStore;

/// Local entry list kept in step with an [`EntryStore`]
pub struct SyncController<S: EntryStore> {
    store: Arc<S>,
    entries: RwLock<Vec<Entry>>,
    identity: RwLock<Option<Identity>>,
    events: EventBus,
}

impl<S: EntryStore> SyncController<S> {
    pub fn new(store: Arc<S>, events: EventBus) -> Self {
        Self {
            store,
            entries: RwLock::new(Vec::new()),
            identity: RwLock::new(None),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    /// Switch identity and reload the list for it
    ///
    /// The local list is emptied before the fetch, so a failed fetch leaves
    /// an empty list rather than the previous identity's entries.
    pub async fn set_identity(&self, identity: Option<Identity>) -> Result<usize> {
        match &identity {
            Some(i) => info!(user_id = %i.user_id, "Identity changed"),
            None => info!("Signed out"),
        }
        {
            let mut entries = self.entries.write().await;
            *self.identity.write().await = identity;
            entries.clear();
        }
        self.events.emit_lossy(SyncEvent::EntriesReplaced { count: 0 });
        self.refresh().await
    }

    /// Replace the local list with the store's contents
    pub async fn refresh(&self) -> Result<usize> {
        let identity = self.identity().await;
        let fetched = self.store.fetch_all(identity.as_ref()).await?;
        let count = fetched.len();
        *self.entries.write().await = fetched;

        debug!(count, "Entry list replaced");
        self.events.emit_lossy(SyncEvent::EntriesReplaced { count });
        Ok(count)
    }

    /// Add a picked search result
    ///
    /// `rating` 0 means unrated. A candidate whose catalog id is already in
    /// the list is rejected without touching the list. The new entry is first
    /// in the list before the store call resolves.
    pub async fn save(&self, candidate: &CatalogCandidate, rating: u8) -> Result<Entry> {
        let rating = normalize_rating(rating)?;
        let foreign_id = candidate.foreign_id();

        let entry = {
            let mut entries = self.entries.write().await;
            if entries.iter().any(|e| e.has_foreign_id(foreign_id)) {
                debug!(%foreign_id, "Duplicate save rejected");
                return Err(Error::Duplicate(candidate.display_title().to_string()));
            }
            let entry = candidate.to_entry(rating);
            entries.insert(0, entry.clone());
            entry
        };

        info!(id = %entry.id, title = %entry.title, "Entry added locally");
        self.events.emit_lossy(SyncEvent::EntryAdded {
            id: entry.id,
            title: entry.title.clone(),
        });

        let identity = self.identity().await;
        match self.store.insert(&entry, identity.as_ref()).await {
            Ok(()) => Ok(entry),
            Err(e) => {
                self.revert(&e).await;
                Err(e)
            }
        }
    }

    /// Delete an entry; without confirmation nothing happens
    ///
    /// Returns whether a delete was attempted.
    pub async fn remove(&self, id: Uuid, confirmed: bool) -> Result<bool> {
        if !confirmed {
            debug!(id = %id, "Remove not confirmed");
            return Ok(false);
        }

        self.entries.write().await.retain(|e| e.id != id);
        info!(id = %id, "Entry removed locally");
        self.events.emit_lossy(SyncEvent::EntryRemoved { id });

        let identity = self.identity().await;
        match self.store.delete(id, identity.as_ref()).await {
            Ok(()) => Ok(true),
            Err(e) => {
                self.revert(&e).await;
                Err(e)
            }
        }
    }

    async fn revert(&self, cause: &Error) {
        if cause.is_store_failure() {
            warn!("Store mutation failed, resyncing: {}", cause);
        } else {
            error!("Mutation failed, resyncing: {}", cause);
        }
        self.events.emit_lossy(SyncEvent::MutationFailed {
            message: cause.to_string(),
        });

        let identity = self.identity().await;
        match self.store.fetch_all(identity.as_ref()).await {
            Ok(fetched) => {
                let count = fetched.len();
                *self.entries.write().await = fetched;
                self.events.emit_lossy(SyncEvent::Reverted { count });
            }
            Err(e) => {
                warn!("Resync after failed mutation also failed, keeping local list: {}", e);
            }
        }
    }

    /// Snapshot of the local list
    pub async fn entries(&self) -> Vec<Entry> {
        self.entries.read().await.clone()
    }

    pub async fn find(&self, id: Uuid) -> Option<Entry> {
        self.entries.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// Projected view of the local list
    pub async fn view(
        &self,
        mode: AppMode,
        search_term: &str,
        type_filter: TypeFilter,
        sort: SortOption,
    ) -> Vec<Entry> {
        let entries = self.entries.read().await;
        project(&entries, mode, search_term, type_filter, sort)
    }

    pub async fn stats(&self) -> Stats {
        Stats::from_entries(&self.entries.read().await)
    }

    pub async fn export_backup(&self, analysis: Option<TasteProfile>) -> Backup {
        Backup::new(self.entries().await, analysis)
    }
}
