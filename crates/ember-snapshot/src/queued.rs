//! Background snapshot persistence.
//!
//! [`QueuedWriter`] copies each snapshot into a bounded queue drained by a
//! dedicated thread that owns the real writer. The compute loop only pays
//! for the copy. A write that fails on the background thread is reported
//! later through [`drain_failures`](SnapshotWriter::drain_failures), keyed
//! by the iteration of the snapshot that was lost; the inner writer's own
//! flush result comes back from [`finish`](SnapshotWriter::finish).

use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use ember_core::{Iteration, SnapshotError};

use crate::view::{OwnedSnapshot, SnapshotView};
use crate::writer::SnapshotWriter;

/// Offloads an inner writer to a background thread.
pub struct QueuedWriter {
    queue_tx: Option<Sender<OwnedSnapshot>>,
    failure_rx: Receiver<(Iteration, SnapshotError)>,
    thread: Option<JoinHandle<Result<(), SnapshotError>>>,
}

impl QueuedWriter {
    /// Start the background thread around `inner`.
    ///
    /// `depth` bounds the number of snapshots in flight; a full queue
    /// blocks the caller until the background thread catches up.
    pub fn spawn<W>(mut inner: W, depth: usize, name: &str) -> Result<Self, SnapshotError>
    where
        W: SnapshotWriter + 'static,
    {
        let (queue_tx, queue_rx) = crossbeam_channel::bounded::<OwnedSnapshot>(depth);
        let (failure_tx, failure_rx) = crossbeam_channel::unbounded();
        let thread = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                for snapshot in queue_rx.iter() {
                    if let Err(e) = inner.write(&snapshot.view()) {
                        let _ = failure_tx.send((snapshot.iteration, e));
                    }
                }
                for late in inner.drain_failures() {
                    let _ = failure_tx.send(late);
                }
                inner.finish()
            })
            .map_err(|e| SnapshotError::Rejected {
                reason: format!("failed to spawn snapshot thread: {e}"),
            })?;
        Ok(Self {
            queue_tx: Some(queue_tx),
            failure_rx,
            thread: Some(thread),
        })
    }

    /// Close the queue and wait for the background thread.
    fn shut_down(&mut self) -> Result<(), SnapshotError> {
        self.queue_tx.take();
        match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(SnapshotError::Rejected {
                    reason: "snapshot thread panicked".into(),
                })
            }),
            None => Ok(()),
        }
    }
}

impl SnapshotWriter for QueuedWriter {
    fn write(&mut self, snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
        let tx = self.queue_tx.as_ref().ok_or(SnapshotError::QueueClosed)?;
        tx.send(snapshot.to_owned_snapshot())
            .map_err(|_| SnapshotError::QueueClosed)
    }

    fn finish(&mut self) -> Result<(), SnapshotError> {
        self.shut_down()
    }

    fn drain_failures(&mut self) -> Vec<(Iteration, SnapshotError)> {
        self.failure_rx.try_iter().collect()
    }
}

impl Drop for QueuedWriter {
    fn drop(&mut self) {
        let _ = self.shut_down();
    }
}
