//! Time-stepping driver for Ember heat-diffusion workers.
//!
//! Provides the per-worker [`Worker`] state machine, the in-process
//! [`run_cluster`] launcher that runs one worker per thread, and a
//! sequential [`reference`] solver used to check decompositions.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cluster;
pub mod config;
pub mod metrics;
pub mod reference;
pub mod worker;

pub use cluster::{run_cluster, run_workers, ClusterOutcome};
pub use config::SolverConfig;
pub use metrics::WorkerMetrics;
pub use reference::solve_sequential;
pub use worker::{Worker, WorkerOutcome, WorkerReport, WorkerState};
