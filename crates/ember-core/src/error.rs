//! Error types for the Ember heat solver.
//!
//! Organized by the stage that raises them: configuration (Init), halo
//! exchange (transport), snapshot persistence, and the per-worker
//! [`SolveError`] that wraps them with worker and iteration context.

use std::error::Error;
use std::fmt;
use std::time::Duration;

use crate::direction::Direction;
use crate::id::{Iteration, WorkerId};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while validating a run configuration.
///
/// Always fatal: no worker starts iterating when one of these is raised.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// Domain side length is zero.
    EmptyDomain,
    /// Worker count is zero.
    NoWorkers,
    /// More workers than rows: some partitions would be empty.
    TooManyWorkers {
        /// Domain side length.
        size: usize,
        /// Requested worker count.
        workers: usize,
    },
    /// Worker count does not fit the `u32` rank space.
    WorkerCountOverflow {
        /// Requested worker count.
        workers: usize,
    },
    /// Domain side length is not a multiple of the worker count.
    UnevenPartition {
        /// Domain side length.
        size: usize,
        /// Requested worker count.
        workers: usize,
    },
    /// Worker rank is outside `0..workers`.
    RankOutOfRange {
        /// The offending rank.
        rank: WorkerId,
        /// Worker count.
        workers: usize,
    },
    /// Iteration count is zero.
    NoIterations,
    /// Snapshot interval is zero.
    ZeroSnapshotInterval,
    /// A physical parameter is NaN, infinite, or out of range.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },
    /// The initial condition produced a non-finite value.
    NonFiniteInitialValue {
        /// Global row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
    },
    /// Send-first exchange over rendezvous links would deadlock.
    RendezvousSendFirst,
    /// A worker's links do not match its partition's neighbours.
    NeighbourMismatch {
        /// The worker being built.
        rank: WorkerId,
        /// Side whose link is missing, extra, or addressed to the wrong peer.
        direction: Direction,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDomain => write!(f, "domain size must be at least 1"),
            Self::NoWorkers => write!(f, "worker count must be at least 1"),
            Self::TooManyWorkers { size, workers } => {
                write!(f, "{workers} workers exceed the {size} rows of the domain")
            }
            Self::WorkerCountOverflow { workers } => {
                write!(f, "{workers} workers exceed the largest rank {}", u32::MAX)
            }
            Self::UnevenPartition { size, workers } => {
                write!(
                    f,
                    "domain size {size} is not divisible by worker count {workers} \
                     ({} rows would be dropped)",
                    size % workers
                )
            }
            Self::RankOutOfRange { rank, workers } => {
                write!(f, "rank {rank} is outside 0..{workers}")
            }
            Self::NoIterations => write!(f, "iteration count must be at least 1"),
            Self::ZeroSnapshotInterval => write!(f, "snapshot interval must be at least 1"),
            Self::InvalidParameter { name, value } => {
                write!(f, "parameter {name} is invalid: {value}")
            }
            Self::NonFiniteInitialValue { row, col } => {
                write!(f, "initial condition is not finite at ({row}, {col})")
            }
            Self::RendezvousSendFirst => {
                write!(f, "send-first exchange needs a link capacity of at least 1")
            }
            Self::NeighbourMismatch { rank, direction } => {
                write!(f, "worker {rank} has a missing, extra or misaddressed {direction} link")
            }
        }
    }
}

impl Error for ConfigError {}

// ── ExchangeError ──────────────────────────────────────────────────

/// Transport failures during halo exchange.
///
/// Fatal to the worker that observes them; never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// The neighbour's end of the link is gone (it exited or failed).
    Disconnected {
        /// The neighbour on the other end.
        peer: WorkerId,
    },
    /// No message arrived, or the send did not complete, in time.
    Timeout {
        /// The neighbour on the other end.
        peer: WorkerId,
        /// The configured bound.
        after: Duration,
    },
    /// A halo payload did not carry exactly one row.
    PayloadSize {
        /// The sending neighbour.
        peer: WorkerId,
        /// Row width the receiver expected.
        expected: usize,
        /// Number of values received.
        actual: usize,
    },
    /// A message arrived from a worker that is not this link's peer.
    UnexpectedSender {
        /// The peer the link is bound to.
        expected: WorkerId,
        /// The sender recorded in the message.
        actual: WorkerId,
    },
    /// A message travelled in the wrong direction for this link.
    UnexpectedDirection {
        /// The sending neighbour.
        peer: WorkerId,
        /// The direction the receiver expected.
        expected: Direction,
        /// The direction recorded in the message.
        actual: Direction,
    },
}

impl ExchangeError {
    /// Whether this failure is a consequence of another worker failing
    /// first (its link closed), rather than a root cause.
    pub fn is_cascade(&self) -> bool {
        matches!(self, Self::Disconnected { .. })
    }
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { peer } => write!(f, "neighbour {peer} disconnected"),
            Self::Timeout { peer, after } => {
                write!(f, "exchange with neighbour {peer} timed out after {after:?}")
            }
            Self::PayloadSize {
                peer,
                expected,
                actual,
            } => write!(
                f,
                "halo row from neighbour {peer} has {actual} values, expected {expected}"
            ),
            Self::UnexpectedSender { expected, actual } => {
                write!(f, "halo row from worker {actual}, expected neighbour {expected}")
            }
            Self::UnexpectedDirection {
                peer,
                expected,
                actual,
            } => write!(
                f,
                "halo row from neighbour {peer} travelled {actual}, expected {expected}"
            ),
        }
    }
}

impl Error for ExchangeError {}

// ── SnapshotError ──────────────────────────────────────────────────

/// Failures at the snapshot persistence boundary.
///
/// Non-fatal under the default failure policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    /// Writing the artifact failed.
    Io {
        /// Destination that could not be written.
        path: String,
        /// Underlying I/O error text.
        reason: String,
    },
    /// The writer refused the snapshot.
    Rejected {
        /// Description of the refusal.
        reason: String,
    },
    /// The background writer thread is gone.
    QueueClosed,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, reason } => write!(f, "failed to write {path}: {reason}"),
            Self::Rejected { reason } => write!(f, "snapshot rejected: {reason}"),
            Self::QueueClosed => write!(f, "snapshot queue closed"),
        }
    }
}

impl Error for SnapshotError {}

// ── Stage / SolveError ─────────────────────────────────────────────

/// The driver stage in which a fatal error occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Configuration, allocation, or thread start-up.
    Init,
    /// Halo exchange with a neighbour.
    HaloExchange,
    /// Interior stencil sweep.
    Sweep,
    /// Snapshot emission (fatal only under the abort policy).
    Snapshot,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "Init"),
            Self::HaloExchange => write!(f, "HaloExchange"),
            Self::Sweep => write!(f, "Sweep"),
            Self::Snapshot => write!(f, "Snapshot"),
        }
    }
}

/// A fatal error that terminated a worker's run.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The configuration was rejected before any iteration ran.
    Init(ConfigError),
    /// A halo exchange failed.
    HaloExchange {
        /// Worker that observed the failure.
        worker: WorkerId,
        /// Iteration being prepared.
        iteration: Iteration,
        /// Transport failure.
        source: ExchangeError,
    },
    /// The sweep produced an invalid state.
    Sweep {
        /// Worker that observed the failure.
        worker: WorkerId,
        /// Iteration being computed.
        iteration: Iteration,
        /// Description of the failure.
        reason: String,
    },
    /// A snapshot write failed under the abort policy.
    Snapshot {
        /// Worker that emitted the snapshot.
        worker: WorkerId,
        /// Iteration of the snapshot.
        iteration: Iteration,
        /// Persistence failure.
        source: SnapshotError,
    },
    /// A worker thread panicked.
    WorkerPanicked {
        /// The worker whose thread panicked.
        worker: WorkerId,
        /// The stage the worker had last entered.
        stage: Stage,
    },
    /// A worker thread could not be started.
    ThreadSpawnFailed {
        /// The worker that could not be started.
        worker: WorkerId,
        /// OS error text.
        reason: String,
    },
}

impl SolveError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Init(_) | Self::ThreadSpawnFailed { .. } => Stage::Init,
            Self::HaloExchange { .. } => Stage::HaloExchange,
            Self::Sweep { .. } => Stage::Sweep,
            Self::WorkerPanicked { stage, .. } => *stage,
            Self::Snapshot { .. } => Stage::Snapshot,
        }
    }

    /// Whether this failure was caused by another worker failing first.
    pub fn is_cascade(&self) -> bool {
        match self {
            Self::HaloExchange { source, .. } => source.is_cascade(),
            _ => false,
        }
    }
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = self.stage();
        match self {
            Self::Init(e) => write!(f, "[{stage}] invalid configuration: {e}"),
            Self::HaloExchange {
                worker,
                iteration,
                source,
            } => write!(f, "[{stage}] worker {worker}, iteration {iteration}: {source}"),
            Self::Sweep {
                worker,
                iteration,
                reason,
            } => write!(f, "[{stage}] worker {worker}, iteration {iteration}: {reason}"),
            Self::Snapshot {
                worker,
                iteration,
                source,
            } => write!(f, "[{stage}] worker {worker}, iteration {iteration}: {source}"),
            Self::WorkerPanicked { worker, .. } => write!(f, "[{stage}] worker {worker} panicked"),
            Self::ThreadSpawnFailed { worker, reason } => {
                write!(f, "[{stage}] could not start worker {worker}: {reason}")
            }
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Init(e) => Some(e),
            Self::HaloExchange { source, .. } => Some(source),
            Self::Snapshot { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for SolveError {
    fn from(e: ConfigError) -> Self {
        Self::Init(e)
    }
}
