//! The persistence boundary consumed by the time-stepping driver.

use ember_core::{Iteration, SnapshotError};

use crate::view::SnapshotView;

/// Destination for periodic snapshots.
///
/// Each `(worker, iteration)` pair is written at most once. Writers are
/// owned by a single worker and never shared.
pub trait SnapshotWriter: Send {
    /// Persist one snapshot.
    fn write(&mut self, snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError>;

    /// Flush anything still pending. Called once when the run ends.
    fn finish(&mut self) -> Result<(), SnapshotError> {
        Ok(())
    }

    /// Failures of earlier writes that were accepted but later lost,
    /// keyed by the iteration of the lost snapshot.
    ///
    /// Writers that persist inside [`write`](Self::write) report there and
    /// never have late failures.
    fn drain_failures(&mut self) -> Vec<(Iteration, SnapshotError)> {
        Vec::new()
    }
}

impl<W: SnapshotWriter + ?Sized> SnapshotWriter for Box<W> {
    fn write(&mut self, snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
        (**self).write(snapshot)
    }

    fn finish(&mut self) -> Result<(), SnapshotError> {
        (**self).finish()
    }

    fn drain_failures(&mut self) -> Vec<(Iteration, SnapshotError)> {
        (**self).drain_failures()
    }
}

/// What the driver does when a snapshot write fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log a warning, count the failure, keep iterating.
    #[default]
    Warn,
    /// Stop the worker with a fatal error.
    Abort,
}

/// Discards every snapshot.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullWriter;

impl SnapshotWriter for NullWriter {
    fn write(&mut self, _snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
        Ok(())
    }
}
