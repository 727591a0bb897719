//! Core types for the Ember heat solver.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: worker
//! and iteration identifiers, the halo travel direction, the physical
//! parameters of a run, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod direction;
pub mod error;
pub mod id;
pub mod params;

pub use direction::Direction;
pub use error::{ConfigError, ExchangeError, SnapshotError, SolveError, Stage};
pub use id::{Iteration, WorkerId};
pub use params::{HeatParams, StencilCoefficients, STABILITY_LIMIT};
