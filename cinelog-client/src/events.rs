//! Sync events
//!
//! The controller broadcasts every change to the local list so a front end
//! can redraw or surface an error without polling.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Changes to the local entry list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    /// The list was replaced wholesale by a fetch
    EntriesReplaced { count: usize },

    /// An entry was prepended locally (remote insert pending)
    EntryAdded { id: Uuid, title: String },

    /// An entry was filtered out locally (remote delete pending)
    EntryRemoved { id: Uuid },

    /// A remote mutation failed; `message` is meant for the user
    MutationFailed { message: String },

    /// The local list was resynced after a failed mutation
    Reverted { count: usize },
}

/// Broadcast channel for [`SyncEvent`]s
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// `capacity` events are buffered per receiver before the oldest are dropped
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}
