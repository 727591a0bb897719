//! Domain decomposition and numerics for the Ember heat solver.
//!
//! - [`Partition`]: which global rows a worker owns and who its neighbours are.
//! - [`LocalGrid`]: flat `(rows_owned + 2) × N` buffer with one halo row
//!   on each vertical edge.
//! - [`BufferPair`]: ping-pong pair of local grids.
//! - [`stencil`]: the explicit five-point update rule.
//! - [`InitialCondition`]: initial values and halo pre-seeding.
//! - [`GlobalGrid`]: assembled whole-domain view for reference runs.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod global;
pub mod initial;
pub mod local;
pub mod partition;
pub mod pingpong;
pub mod stencil;

pub use global::GlobalGrid;
pub use initial::{CellFn, InitialCondition};
pub use local::LocalGrid;
pub use partition::Partition;
pub use pingpong::BufferPair;
pub use stencil::{sweep, update_cell, StencilCoefficients};
