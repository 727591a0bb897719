//! Run configuration and validation.
//!
//! [`SolverConfig`] is the single input shared by every worker of a run.
//! [`validate()`](SolverConfig::validate) checks structural invariants at
//! Init; nothing iterates when it fails.

use std::time::Duration;

use ember_core::{ConfigError, HeatParams, WorkerId};
use ember_exchange::ExchangeSchedule;
use ember_grid::{InitialCondition, Partition};
use ember_snapshot::FailurePolicy;

/// Configuration of one heat-diffusion run.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Side length N of the square domain. Default: 100.
    pub size: usize,
    /// Worker count W. Must divide `size`. Default: 1.
    pub workers: usize,
    /// Physical constants.
    pub params: HeatParams,
    /// Number of iterations T. Default: 100.
    pub iterations: u64,
    /// Snapshot every this many iterations. Default: 10.
    pub snapshot_interval: u64,
    /// Initial temperature field. Default: [`InitialCondition::WorkerRank`].
    pub initial: InitialCondition,
    /// Reaction to a failed snapshot write. Default: [`FailurePolicy::Warn`].
    pub snapshot_policy: FailurePolicy,
    /// Send/receive ordering of the halo exchange. Default: send-first.
    pub exchange_schedule: ExchangeSchedule,
    /// Buffered rows per direction per link. `0` = rendezvous. Default: 1.
    pub link_capacity: usize,
    /// Upper bound on any single halo send or receive. `None` waits
    /// forever. Default: 30 s.
    pub exchange_timeout: Option<Duration>,
    /// Scan every sweep's output for NaN or infinity. Default: false.
    pub check_finite: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            size: 100,
            workers: 1,
            params: HeatParams::default(),
            iterations: 100,
            snapshot_interval: 10,
            initial: InitialCondition::default(),
            snapshot_policy: FailurePolicy::default(),
            exchange_schedule: ExchangeSchedule::default(),
            link_capacity: 1,
            exchange_timeout: Some(Duration::from_secs(30)),
            check_finite: false,
        }
    }
}

impl SolverConfig {
    /// Check every invariant that does not depend on a worker's rank.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Rank 0 always exists once the decomposition itself is valid.
        Partition::new(self.size, self.workers, WorkerId(0))?;
        if self.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::ZeroSnapshotInterval);
        }
        self.params.validate()?;
        if self.link_capacity == 0 && self.exchange_schedule == ExchangeSchedule::SendFirst {
            return Err(ConfigError::RendezvousSendFirst);
        }
        Ok(())
    }

    /// Validate, then compute the partition owned by `rank`.
    pub fn partition(&self, rank: WorkerId) -> Result<Partition, ConfigError> {
        self.validate()?;
        Partition::new(self.size, self.workers, rank)
    }

    /// Rows owned by each worker.
    pub fn rows_per_worker(&self) -> usize {
        if self.workers == 0 {
            0
        } else {
            self.size / self.workers
        }
    }
}
