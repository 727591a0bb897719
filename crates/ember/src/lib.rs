//! Ember: a distributed-memory solver for the 2D heat equation.
//!
//! The square domain is split into horizontal strips, one per worker.
//! Workers refresh their halo rows by point-to-point exchange with the
//! strips above and below, apply the explicit five-point stencil, and
//! write periodic snapshots of the rows they own.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Ember sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use ember::prelude::*;
//!
//! // 4x4 plate, edges held at 1, interior at 0, unit steps.
//! let config = SolverConfig {
//!     size: 4,
//!     workers: 2,
//!     params: HeatParams::unit(),
//!     iterations: 1,
//!     initial: InitialCondition::Dirichlet { interior: 0.0, boundary: 1.0 },
//!     ..SolverConfig::default()
//! };
//! let snapshots = MemoryWriter::new();
//! let outcome = run_cluster(&config, |_| snapshots.clone()).unwrap();
//! let grid = outcome.assemble().unwrap();
//! assert_eq!(grid.get(1, 1), 2.0);
//! assert_eq!(grid, solve_sequential(&config).unwrap());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `ember-core` | IDs, parameters, error taxonomy |
//! | [`grid`] | `ember-grid` | Partitioning, local grids, stencil, initial conditions |
//! | [`exchange`] | `ember-exchange` | Halo link trait, channel transport, exchange schedules |
//! | [`snapshot`] | `ember-snapshot` | Snapshot writer trait and writers |
//! | [`engine`] | `ember-engine` | Worker driver, cluster runner, reference solver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, parameters, and errors (`ember-core`).
pub use ember_core as types;

/// Partitioning, local grids, and the stencil kernel (`ember-grid`).
pub use ember_grid as grid;

/// Halo exchange between neighbouring workers (`ember-exchange`).
///
/// Implement [`exchange::HaloLink`] to run workers over another transport.
pub use ember_exchange as exchange;

/// Snapshot persistence (`ember-snapshot`).
pub use ember_snapshot as snapshot;

/// Time-stepping driver and cluster runner (`ember-engine`).
pub use ember_engine as engine;

/// Common imports for typical Ember usage.
///
/// ```rust
/// use ember::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use ember_core::{HeatParams, Iteration, WorkerId};

    // Errors
    pub use ember_core::{ConfigError, ExchangeError, SnapshotError, SolveError, Stage};

    // Grid
    pub use ember_grid::{GlobalGrid, InitialCondition, Partition};

    // Exchange
    pub use ember_exchange::{ExchangeSchedule, HaloLink};

    // Snapshots
    pub use ember_snapshot::{
        FailurePolicy, MemoryWriter, NullWriter, QueuedWriter, SnapshotView, SnapshotWriter,
        TextFileWriter,
    };

    // Engine
    pub use ember_engine::{
        run_cluster, solve_sequential, SolverConfig, Worker, WorkerMetrics, WorkerReport,
    };
}
