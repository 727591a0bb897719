//! Initial conditions and halo pre-seeding.

use std::fmt;
use std::sync::Arc;

use ember_core::{ConfigError, WorkerId};

use crate::local::LocalGrid;
use crate::partition::Partition;

/// Value generator for `(global_row, col)`.
pub type CellFn = Arc<dyn Fn(usize, usize) -> f64 + Send + Sync>;

/// How every cell of the global domain is initialized.
///
/// The value of a cell is a function of its global position only, except
/// for [`WorkerRank`](InitialCondition::WorkerRank), where it is the rank
/// of the owning worker.
#[derive(Clone, Default)]
pub enum InitialCondition {
    /// Every cell takes the rank of the worker owning its row.
    #[default]
    WorkerRank,
    /// Every cell takes the same value.
    Uniform(f64),
    /// Outer ring of the domain at `boundary`, everything else at `interior`.
    Dirichlet {
        /// Value of interior cells.
        interior: f64,
        /// Value of cells on rows 0 and N-1 and columns 0 and N-1.
        boundary: f64,
    },
    /// Arbitrary function of `(global_row, col)`.
    Custom(CellFn),
}

impl InitialCondition {
    /// Wrap a closure as a custom initial condition.
    pub fn custom(f: impl Fn(usize, usize) -> f64 + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// Value of cell `(row, col)` in a domain of side `size` whose row is
    /// owned by `owner`.
    pub fn value(&self, owner: WorkerId, size: usize, row: usize, col: usize) -> f64 {
        match self {
            Self::WorkerRank => f64::from(owner.0),
            Self::Uniform(v) => *v,
            Self::Dirichlet { interior, boundary } => {
                let last = size.saturating_sub(1);
                if row == 0 || row == last || col == 0 || col == last {
                    *boundary
                } else {
                    *interior
                }
            }
            Self::Custom(f) => f(row, col),
        }
    }

    /// Fill a partition's owned rows and pre-seed both halo rows.
    ///
    /// A halo facing a neighbour receives the values of the neighbour's
    /// adjacent row; exchange overwrites it before it is ever read. A halo
    /// with no neighbour mirrors the adjacent owned row and is never
    /// written again.
    ///
    /// # Errors
    ///
    /// Returns `Err` if any owned cell would be NaN or infinite.
    pub fn fill(&self, partition: &Partition, grid: &mut LocalGrid) -> Result<(), ConfigError> {
        let size = partition.size();
        let rank = partition.rank();
        for global in partition.global_rows() {
            let local = global - partition.row_start() + 1;
            let row = grid.row_mut(local);
            for (col, cell) in row.iter_mut().enumerate() {
                let v = self.value(rank, size, global, col);
                if !v.is_finite() {
                    return Err(ConfigError::NonFiniteInitialValue { row: global, col });
                }
                *cell = v;
            }
        }

        match partition.upper_neighbour() {
            Some(up) => {
                let global = partition.row_start() - 1;
                for (col, cell) in grid.top_halo_mut().iter_mut().enumerate() {
                    *cell = self.value(up, size, global, col);
                }
            }
            None => {
                let mirror = grid.first_owned_row().to_vec();
                grid.top_halo_mut().copy_from_slice(&mirror);
            }
        }
        match partition.lower_neighbour() {
            Some(down) => {
                let global = partition.row_end();
                for (col, cell) in grid.bottom_halo_mut().iter_mut().enumerate() {
                    *cell = self.value(down, size, global, col);
                }
            }
            None => {
                let mirror = grid.last_owned_row().to_vec();
                grid.bottom_halo_mut().copy_from_slice(&mirror);
            }
        }
        Ok(())
    }
}

impl fmt::Debug for InitialCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkerRank => write!(f, "WorkerRank"),
            Self::Uniform(v) => f.debug_tuple("Uniform").field(v).finish(),
            Self::Dirichlet { interior, boundary } => f
                .debug_struct("Dirichlet")
                .field("interior", interior)
                .field("boundary", boundary)
                .finish(),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
