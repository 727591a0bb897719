//! In-memory snapshot capture.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ember_core::{Iteration, SnapshotError, WorkerId};
use indexmap::IndexMap;

use crate::view::{OwnedSnapshot, SnapshotView};
use crate::writer::SnapshotWriter;

type Store = IndexMap<(WorkerId, Iteration), OwnedSnapshot>;

/// Captures snapshots into a map shared by every clone.
///
/// Clone one handle per worker; all clones append to the same store, in
/// arrival order. Writing the same `(worker, iteration)` twice is rejected.
#[derive(Clone, Debug, Default)]
pub struct MemoryWriter {
    store: Arc<Mutex<Store>>,
}

impl MemoryWriter {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A panicking writer cannot leave the map half-updated.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of captured snapshots.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The snapshot for `(worker, iteration)`, if captured.
    pub fn get(&self, worker: WorkerId, iteration: Iteration) -> Option<OwnedSnapshot> {
        self.lock().get(&(worker, iteration)).cloned()
    }

    /// Every captured key, in arrival order.
    pub fn keys(&self) -> Vec<(WorkerId, Iteration)> {
        self.lock().keys().copied().collect()
    }

    /// Every captured snapshot, in arrival order.
    pub fn snapshots(&self) -> Vec<OwnedSnapshot> {
        self.lock().values().cloned().collect()
    }

    /// Iterations captured for `worker`, in arrival order.
    pub fn iterations_of(&self, worker: WorkerId) -> Vec<Iteration> {
        self.lock()
            .keys()
            .filter(|(w, _)| *w == worker)
            .map(|(_, it)| *it)
            .collect()
    }
}

impl SnapshotWriter for MemoryWriter {
    fn write(&mut self, snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
        let key = (snapshot.worker(), snapshot.iteration());
        let mut store = self.lock();
        if store.contains_key(&key) {
            return Err(SnapshotError::Rejected {
                reason: format!(
                    "snapshot for worker {} at iteration {} already written",
                    key.0, key.1
                ),
            });
        }
        store.insert(key, snapshot.to_owned_snapshot());
        Ok(())
    }
}
