//! Sequential reference solver.
//!
//! Applies the same kernel to the whole domain with a single buffer pair
//! and no exchange. A one-worker cluster run must match it exactly.

use ember_core::{ConfigError, WorkerId};
use ember_grid::{sweep, BufferPair, GlobalGrid, LocalGrid, Partition};

use crate::config::SolverConfig;

/// Solve `config` on one thread and return the final field.
///
/// `config.workers` only matters for [`InitialCondition::WorkerRank`](ember_grid::InitialCondition::WorkerRank),
/// where each row starts at the rank that would own it.
///
/// # Errors
///
/// Returns `Err` if the configuration is invalid or the initial condition
/// is not finite.
pub fn solve_sequential(config: &SolverConfig) -> Result<GlobalGrid, ConfigError> {
    config.validate()?;
    let size = config.size;
    let rows_per_worker = config.rows_per_worker();
    let whole = Partition::new(size, 1, WorkerId(0))?;

    let mut grid = LocalGrid::for_partition(&whole);
    for row in 0..size {
        let owner = WorkerId::try_from(row / rows_per_worker).map_err(|_| {
            ConfigError::WorkerCountOverflow {
                workers: config.workers,
            }
        })?;
        for col in 0..size {
            let v = config.initial.value(owner, size, row, col);
            if !v.is_finite() {
                return Err(ConfigError::NonFiniteInitialValue { row, col });
            }
            grid.set(row + 1, col, v);
        }
    }

    let coefficients = config.params.stencil_coefficients();
    let rows = whole.sweep_rows();
    let mut buffers = BufferPair::new(grid);
    for _ in 0..config.iterations {
        let (current, next) = buffers.split();
        sweep(current, next, rows.clone(), &coefficients);
        buffers.swap();
    }
    Ok(GlobalGrid::from_whole(buffers.current()))
}
