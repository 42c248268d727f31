//! Shared snapshot store
//!
//! Holds at most one [`StatusSnapshot`]: whatever the poller last wrote.
//! Exactly one writer (the poller) and any number of concurrent readers
//! (the delivery handlers). Snapshots are handed out as `Arc`s, so both the
//! write and the read critical sections reduce to a pointer swap/clone and
//! readers can never observe a half-written value.

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::client::StatusSnapshot;

#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<StatusSnapshot>>>,
}

/// Store handle shared between the poller and the delivery layer.
pub type SharedStore = Arc<SnapshotStore>;

impl SnapshotStore {
    /// A new, empty shared store. No snapshot exists until the first
    /// successful poll.
    pub fn new() -> SharedStore {
        Arc::new(Self::default())
    }

    /// Replace the current snapshot wholesale. Never merges fields.
    pub async fn replace(&self, snapshot: StatusSnapshot) {
        *self.current.write().await = Some(Arc::new(snapshot));
    }

    /// The most recent snapshot, or `None` before the first successful poll.
    pub async fn get(&self) -> Option<Arc<StatusSnapshot>> {
        self.current.read().await.clone()
    }
}
