//! Benchmark profiles and utilities for the Ember heat solver.
//!
//! Provides pre-built [`SolverConfig`] profiles for benchmarks and examples:
//!
//! - [`reference_profile`]: the classic 100x100 run, 100 iterations,
//!   snapshot every 10
//! - [`cluster_profile`]: 256x256 domain split across 4 workers, 20 iterations
//! - [`sweep_grid`]: a filled 512x512 local grid for kernel benchmarks

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use ember_core::WorkerId;
use ember_engine::SolverConfig;
use ember_grid::{LocalGrid, Partition};
use ember_test_utils::fields::hot_square;

/// The classic run: 100x100, 100 iterations, snapshot every 10 iterations.
///
/// Initial field is the rank of the owning worker.
pub fn reference_profile(workers: usize) -> SolverConfig {
    SolverConfig {
        workers,
        ..SolverConfig::default()
    }
}

/// 256x256 domain, 4 workers, 20 iterations, snapshots effectively off.
pub fn cluster_profile() -> SolverConfig {
    SolverConfig {
        size: 256,
        workers: 4,
        iterations: 20,
        snapshot_interval: u64::MAX,
        initial: hot_square(256),
        ..SolverConfig::default()
    }
}

/// A single-worker local grid of side `size`, filled with a hot square.
pub fn sweep_grid(size: usize) -> Option<(Partition, LocalGrid)> {
    let partition = Partition::new(size, 1, WorkerId(0)).ok()?;
    let mut grid = LocalGrid::for_partition(&partition);
    hot_square(size).fill(&partition, &mut grid).ok()?;
    Some((partition, grid))
}
