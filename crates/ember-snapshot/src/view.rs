//! Borrowed and owned snapshot representations.

use ember_core::{Iteration, WorkerId};

/// Read-only view of a worker's owned rows at one iteration.
///
/// Halo rows are never part of a snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapshotView<'a> {
    worker: WorkerId,
    iteration: Iteration,
    cols: usize,
    values: &'a [f64],
}

impl<'a> SnapshotView<'a> {
    /// View over `values`, which must be a whole number of rows of width
    /// `cols`.
    pub fn new(worker: WorkerId, iteration: Iteration, cols: usize, values: &'a [f64]) -> Self {
        debug_assert!(cols == 0 || values.len() % cols == 0);
        Self {
            worker,
            iteration,
            cols,
            values,
        }
    }

    /// Emitting worker.
    pub fn worker(&self) -> WorkerId {
        self.worker
    }

    /// Iteration the state belongs to.
    pub fn iteration(&self) -> Iteration {
        self.iteration
    }

    /// Row width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        if self.cols == 0 {
            0
        } else {
            self.values.len() / self.cols
        }
    }

    /// All values, row-major.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &'a [f64]> + 'a {
        self.values.chunks(self.cols.max(1))
    }

    /// Detached copy.
    pub fn to_owned_snapshot(&self) -> OwnedSnapshot {
        OwnedSnapshot {
            worker: self.worker,
            iteration: self.iteration,
            cols: self.cols,
            values: self.values.to_vec(),
        }
    }
}

/// A snapshot that owns its data, for queues and in-memory capture.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedSnapshot {
    /// Emitting worker.
    pub worker: WorkerId,
    /// Iteration the state belongs to.
    pub iteration: Iteration,
    /// Row width.
    pub cols: usize,
    /// Owned rows, row-major.
    pub values: Vec<f64>,
}

impl OwnedSnapshot {
    /// Borrow as a view.
    pub fn view(&self) -> SnapshotView<'_> {
        SnapshotView::new(self.worker, self.iteration, self.cols, &self.values)
    }
}
