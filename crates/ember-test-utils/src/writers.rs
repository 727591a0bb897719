//! Snapshot writer fixtures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ember_core::{Iteration, SnapshotError};
use ember_snapshot::{SnapshotView, SnapshotWriter};

/// Fails deterministically after a configurable number of successful
/// writes, or at one chosen iteration.
///
/// The call counter is shared between clones so a test can inspect it
/// after the writer has moved into a worker.
#[derive(Clone)]
pub struct FailingWriter {
    succeed_count: usize,
    fail_at: Option<Iteration>,
    fail_finish: bool,
    writes: Arc<AtomicUsize>,
    finishes: Arc<AtomicUsize>,
}

impl FailingWriter {
    /// Succeed `succeed_count` times, then reject every write.
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            fail_at: None,
            fail_finish: false,
            writes: Arc::new(AtomicUsize::new(0)),
            finishes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reject only the snapshot of `iteration`.
    pub fn at(iteration: Iteration) -> Self {
        Self {
            fail_at: Some(iteration),
            ..Self::new(usize::MAX)
        }
    }

    /// Accept every write but fail at `finish()`.
    pub fn on_finish() -> Self {
        Self {
            fail_finish: true,
            ..Self::new(usize::MAX)
        }
    }

    /// How many times `write()` has been called.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// How many times `finish()` has been called.
    pub fn finishes(&self) -> usize {
        self.finishes.load(Ordering::Relaxed)
    }
}

impl SnapshotWriter for FailingWriter {
    fn write(&mut self, snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
        let n = self.writes.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count || self.fail_at == Some(snapshot.iteration()) {
            return Err(SnapshotError::Rejected {
                reason: format!("deliberate failure at iteration {}", snapshot.iteration()),
            });
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SnapshotError> {
        self.finishes.fetch_add(1, Ordering::Relaxed);
        if self.fail_finish {
            return Err(SnapshotError::Io {
                path: "<finish>".into(),
                reason: "deliberate flush failure".into(),
            });
        }
        Ok(())
    }
}
