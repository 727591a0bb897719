//! Per-worker performance counters.
//!
//! [`WorkerMetrics`] accumulates over a whole run and is returned in the
//! worker's report. All durations are in microseconds.

use std::time::Duration;

/// Cumulative timing and counters for one worker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerMetrics {
    /// Time spent in halo exchange, including waits on neighbours.
    pub exchange_us: u64,
    /// Time spent applying the stencil.
    pub sweep_us: u64,
    /// Time spent handing snapshots to the writer.
    pub snapshot_us: u64,
    /// Iterations completed.
    pub iterations: u64,
    /// Snapshots accepted by the writer.
    pub snapshots_written: u64,
    /// Snapshot writes that failed (including failures reported at finish).
    pub snapshots_failed: u64,
    /// Halo rows sent.
    pub rows_sent: u64,
    /// Halo rows received.
    pub rows_received: u64,
}

impl WorkerMetrics {
    /// Sum of the three phase timings.
    pub fn busy_us(&self) -> u64 {
        self.exchange_us + self.sweep_us + self.snapshot_us
    }

    /// Mean time per iteration, if any iteration ran.
    pub fn mean_iteration_us(&self) -> Option<u64> {
        (self.iterations > 0).then(|| self.busy_us() / self.iterations)
    }
}

pub(crate) fn micros(d: Duration) -> u64 {
    d.as_micros() as u64
}
