// ── Snapshot store ──
//
// Last-known-good snapshot behind watch channels: one writer (the poll
// task), any number of observers. Failed cycles never touch the stored
// snapshot, so readers always see the most recent complete pair.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::Snapshot;

#[derive(Debug)]
pub struct SnapshotStore {
    snapshot: watch::Sender<Arc<Snapshot>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::default()));
        let (last_refresh, _) = watch::channel(None);
        Self {
            snapshot,
            last_refresh,
        }
    }

    /// Replace the stored snapshot and stamp the refresh instant.
    pub(crate) fn publish(&self, snapshot: Snapshot) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|current| *current = Arc::new(snapshot));
        self.last_refresh.send_modify(|at| *at = Some(Utc::now()));
    }

    /// Current snapshot; empty before the first successful cycle.
    pub fn current(&self) -> Arc<Snapshot> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot publications.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot.subscribe()
    }

    /// Instant of the last successful publish.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Age of the stored snapshot, `None` before the first publish.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|at| Utc::now() - at)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
