//! The per-worker time-stepping driver.
//!
//! A [`Worker`] owns one horizontal strip of the domain and advances it
//! one iteration at a time:
//!
//! ```text
//! Init → (HaloExchange → Sweep → Swap → [Snapshot]) × T → Terminated
//! ```
//!
//! Any fatal error moves the worker to [`WorkerState::Failed`]; it never
//! iterates again and every later [`step`](Worker::step) returns the same
//! error.

use std::ops::Range;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ember_core::{
    ConfigError, Direction, Iteration, SnapshotError, SolveError, Stage, StencilCoefficients,
    WorkerId, STABILITY_LIMIT,
};
use ember_exchange::{HaloExchange, HaloLink, Neighbours};
use ember_grid::{sweep, BufferPair, LocalGrid, Partition};
use ember_snapshot::{FailurePolicy, SnapshotView, SnapshotWriter};

use crate::config::SolverConfig;
use crate::metrics::{micros, WorkerMetrics};

// ── WorkerState ────────────────────────────────────────────────────

/// Lifecycle of a worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Built and initialized; no iteration has run.
    Init,
    /// At least one iteration has run and more may follow.
    Running,
    /// Every iteration ran and the writer was flushed.
    Terminated,
    /// A fatal error stopped the worker.
    Failed,
}

// ── StageTracker ───────────────────────────────────────────────────

/// The stage a worker last entered, readable from the thread that joins
/// it after a panic.
#[derive(Clone, Debug, Default)]
pub(crate) struct StageTracker(Arc<AtomicU8>);

impl StageTracker {
    fn enter(&self, stage: Stage) {
        let code = match stage {
            Stage::Init => 0,
            Stage::HaloExchange => 1,
            Stage::Sweep => 2,
            Stage::Snapshot => 3,
        };
        self.0.store(code, Ordering::Relaxed);
    }

    pub(crate) fn current(&self) -> Stage {
        match self.0.load(Ordering::Relaxed) {
            1 => Stage::HaloExchange,
            2 => Stage::Sweep,
            3 => Stage::Snapshot,
            _ => Stage::Init,
        }
    }
}

// ── Report types ───────────────────────────────────────────────────

/// Summary of a worker's run.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkerReport {
    /// The worker.
    pub worker: WorkerId,
    /// Last completed iteration.
    pub iterations: Iteration,
    /// Cumulative timings and counters.
    pub metrics: WorkerMetrics,
}

/// Everything a terminated worker hands back.
#[derive(Clone, Debug)]
pub struct WorkerOutcome {
    /// Run summary.
    pub report: WorkerReport,
    /// The rows this worker owned.
    pub partition: Partition,
    /// Final values of the owned rows, row-major.
    pub owned: Vec<f64>,
}

// ── Worker ─────────────────────────────────────────────────────────

/// One worker of a distributed run.
///
/// Generic over the transport `L` and the snapshot destination `W`, both
/// owned exclusively by this worker.
pub struct Worker<L, W> {
    partition: Partition,
    neighbours: Neighbours<L>,
    writer: W,
    exchange: HaloExchange,
    buffers: BufferPair,
    coefficients: StencilCoefficients,
    sweep_rows: Range<usize>,
    iteration: Iteration,
    iterations: u64,
    snapshot_interval: u64,
    snapshot_policy: FailurePolicy,
    check_finite: bool,
    state: WorkerState,
    stage: StageTracker,
    failure: Option<SolveError>,
    metrics: WorkerMetrics,
}

impl<L: HaloLink, W: SnapshotWriter> Worker<L, W> {
    /// Validate `config`, allocate the buffers of `rank`'s partition and
    /// fill them with the initial condition.
    ///
    /// # Errors
    ///
    /// [`SolveError::Init`] if the configuration is invalid, if the links
    /// in `neighbours` do not match the partition, or if the initial
    /// condition yields a non-finite value.
    pub fn new(
        config: &SolverConfig,
        rank: WorkerId,
        neighbours: Neighbours<L>,
        writer: W,
    ) -> Result<Self, SolveError> {
        let partition = config.partition(rank)?;
        check_links(&partition, &neighbours)?;

        let mut grid = LocalGrid::for_partition(&partition);
        config.initial.fill(&partition, &mut grid)?;

        let params = config.params;
        if !params.is_stable() {
            tracing::warn!(
                rank = rank.0,
                stability = params.stability_number(),
                limit = STABILITY_LIMIT,
                "time step exceeds the explicit stability limit"
            );
        }
        tracing::debug!(
            rank = rank.0,
            rows = ?partition.global_rows(),
            neighbours = neighbours.count(),
            "worker initialized"
        );

        Ok(Self {
            sweep_rows: partition.sweep_rows(),
            exchange: HaloExchange::new(rank, config.exchange_schedule),
            partition,
            neighbours,
            writer,
            buffers: BufferPair::new(grid),
            coefficients: params.stencil_coefficients(),
            iteration: Iteration::default(),
            iterations: config.iterations,
            snapshot_interval: config.snapshot_interval,
            snapshot_policy: config.snapshot_policy,
            check_finite: config.check_finite,
            state: WorkerState::Init,
            stage: StageTracker::default(),
            failure: None,
            metrics: WorkerMetrics::default(),
        })
    }

    /// This worker's rank.
    pub fn rank(&self) -> WorkerId {
        self.partition.rank()
    }

    /// The rows this worker owns.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Last completed iteration (0 before the first step).
    pub fn iteration(&self) -> Iteration {
        self.iteration
    }

    /// Counters so far.
    pub fn metrics(&self) -> &WorkerMetrics {
        &self.metrics
    }

    /// The buffer holding the latest completed state.
    pub fn current(&self) -> &LocalGrid {
        self.buffers.current()
    }

    /// The snapshot destination.
    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub(crate) fn stage_tracker(&self) -> StageTracker {
        self.stage.clone()
    }

    /// Run one iteration: exchange, sweep, swap, and snapshot when due.
    ///
    /// Returns the iteration just completed, or `None` once every
    /// configured iteration has run.
    ///
    /// # Errors
    ///
    /// Any fatal error, tagged with the failing stage. The worker is then
    /// [`Failed`](WorkerState::Failed) and returns the same error forever.
    pub fn step(&mut self) -> Result<Option<Iteration>, SolveError> {
        if let Some(e) = &self.failure {
            return Err(e.clone());
        }
        if self.iteration.0 >= self.iterations {
            return Ok(None);
        }
        self.state = WorkerState::Running;
        let iteration = self.iteration.next();
        match self.advance(iteration) {
            Ok(()) => {
                self.iteration = iteration;
                self.metrics.iterations += 1;
                tracing::trace!(rank = self.rank().0, iteration = iteration.0, "iteration complete");
                Ok(Some(iteration))
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Run every remaining iteration, flush the writer, and hand back the
    /// final owned rows.
    ///
    /// # Errors
    ///
    /// The first fatal error. The writer is still flushed on a
    /// best-effort basis.
    pub fn run(mut self) -> Result<WorkerOutcome, SolveError> {
        let span = tracing::info_span!("worker", rank = self.rank().0);
        let _entered = span.enter();
        tracing::debug!(iterations = self.iterations, "worker starting");

        if let Err(e) = self.run_to_end() {
            if let Err(flush) = self.writer.finish() {
                tracing::warn!(error = %flush, "snapshot flush after failure failed");
            }
            for (iteration, lost) in self.writer.drain_failures() {
                tracing::warn!(iteration = iteration.0, error = %lost, "snapshot lost after failure");
            }
            return Err(e);
        }

        self.stage.enter(Stage::Snapshot);
        let started = Instant::now();
        let finished = self.writer.finish();
        self.metrics.snapshot_us += micros(started.elapsed());
        if let Err(e) = self.late_failures() {
            return Err(self.fail(e));
        }
        if let Err(source) = finished {
            let iteration = self.iteration;
            if let Err(e) = self.snapshot_failed(iteration, source) {
                return Err(self.fail(e));
            }
        }

        self.state = WorkerState::Terminated;
        tracing::debug!(
            iterations = self.iteration.0,
            snapshots = self.metrics.snapshots_written,
            failed_snapshots = self.metrics.snapshots_failed,
            "worker terminated"
        );
        Ok(WorkerOutcome {
            report: WorkerReport {
                worker: self.partition.rank(),
                iterations: self.iteration,
                metrics: self.metrics,
            },
            owned: self.buffers.into_current().owned_to_vec(),
            partition: self.partition,
        })
    }

    fn run_to_end(&mut self) -> Result<(), SolveError> {
        while self.step()?.is_some() {}
        Ok(())
    }

    fn advance(&mut self, iteration: Iteration) -> Result<(), SolveError> {
        let worker = self.rank();

        self.stage.enter(Stage::HaloExchange);
        let started = Instant::now();
        let stats = self
            .exchange
            .exchange(&self.neighbours, self.buffers.current_mut())
            .map_err(|source| SolveError::HaloExchange {
                worker,
                iteration,
                source,
            })?;
        self.metrics.exchange_us += micros(started.elapsed());
        self.metrics.rows_sent += stats.sent as u64;
        self.metrics.rows_received += stats.received as u64;

        self.stage.enter(Stage::Sweep);
        let started = Instant::now();
        let (current, next) = self.buffers.split();
        sweep(current, next, self.sweep_rows.clone(), &self.coefficients);
        if self.check_finite {
            if let Some((row, col)) = next.first_non_finite() {
                let global = self.partition.global_row(row).unwrap_or(row);
                return Err(SolveError::Sweep {
                    worker,
                    iteration,
                    reason: format!("non-finite value at ({global}, {col})"),
                });
            }
        }
        self.buffers.swap();
        self.metrics.sweep_us += micros(started.elapsed());

        if iteration.is_multiple_of(self.snapshot_interval) {
            self.snapshot(iteration)?;
        }
        Ok(())
    }

    fn snapshot(&mut self, iteration: Iteration) -> Result<(), SolveError> {
        self.stage.enter(Stage::Snapshot);
        let started = Instant::now();
        let current = self.buffers.current();
        let view = SnapshotView::new(self.partition.rank(), iteration, current.cols(), current.owned());
        let written = self.writer.write(&view);
        self.metrics.snapshot_us += micros(started.elapsed());
        match written {
            Ok(()) => self.metrics.snapshots_written += 1,
            Err(source) => self.snapshot_failed(iteration, source)?,
        }
        self.late_failures()
    }

    /// Book snapshots the writer accepted but lost afterwards against the
    /// iteration they belong to.
    fn late_failures(&mut self) -> Result<(), SolveError> {
        for (iteration, source) in self.writer.drain_failures() {
            self.metrics.snapshots_written = self.metrics.snapshots_written.saturating_sub(1);
            self.snapshot_failed(iteration, source)?;
        }
        Ok(())
    }

    fn snapshot_failed(
        &mut self,
        iteration: Iteration,
        source: SnapshotError,
    ) -> Result<(), SolveError> {
        self.metrics.snapshots_failed += 1;
        match self.snapshot_policy {
            FailurePolicy::Warn => {
                tracing::warn!(
                    rank = self.rank().0,
                    iteration = iteration.0,
                    error = %source,
                    "snapshot failed, continuing"
                );
                Ok(())
            }
            FailurePolicy::Abort => Err(SolveError::Snapshot {
                worker: self.rank(),
                iteration,
                source,
            }),
        }
    }

    fn fail(&mut self, e: SolveError) -> SolveError {
        tracing::error!(rank = self.rank().0, error = %e, "worker failed");
        self.state = WorkerState::Failed;
        self.failure = Some(e.clone());
        e
    }
}

/// Each side must have a link exactly when the partition has a neighbour
/// there, addressed to that neighbour.
fn check_links<L: HaloLink>(
    partition: &Partition,
    neighbours: &Neighbours<L>,
) -> Result<(), ConfigError> {
    let expected = partition.neighbours();
    for direction in [Direction::Up, Direction::Down] {
        let peer = expected
            .iter()
            .find(|(d, _)| *d == direction)
            .map(|&(_, peer)| peer);
        let ok = match (peer, neighbours.get(direction)) {
            (None, None) => true,
            (Some(peer), Some(link)) => link.peer() == peer && link.outgoing() == direction,
            _ => false,
        };
        if !ok {
            return Err(ConfigError::NeighbourMismatch {
                rank: partition.rank(),
                direction,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::HeatParams;
    use ember_exchange::{channel_mesh, ChannelLink};
    use ember_grid::InitialCondition;
    use ember_snapshot::{MemoryWriter, NullWriter};

    fn golden_config() -> SolverConfig {
        SolverConfig {
            size: 4,
            workers: 1,
            params: HeatParams::unit(),
            iterations: 1,
            snapshot_interval: 1,
            initial: InitialCondition::Dirichlet {
                interior: 0.0,
                boundary: 1.0,
            },
            ..SolverConfig::default()
        }
    }

    fn lone(config: &SolverConfig) -> Neighbours<ChannelLink> {
        channel_mesh(config.workers, config.link_capacity, config.exchange_timeout).unwrap()
            .remove(0)
    }

    #[test]
    fn new_worker_is_in_init() {
        let cfg = golden_config();
        let w = Worker::new(&cfg, WorkerId(0), lone(&cfg), NullWriter).unwrap();
        assert_eq!(w.state(), WorkerState::Init);
        assert_eq!(w.iteration(), Iteration(0));
        assert_eq!(w.current().shape(), (6, 4));
    }

    #[test]
    fn golden_single_step() {
        let cfg = golden_config();
        let mut w = Worker::new(&cfg, WorkerId(0), lone(&cfg), NullWriter).unwrap();
        assert_eq!(w.step().unwrap(), Some(Iteration(1)));
        assert_eq!(w.state(), WorkerState::Running);
        for i in 2..=3 {
            for j in 1..3 {
                assert_eq!(w.current().get(i, j), 2.0);
            }
        }
        assert_eq!(w.step().unwrap(), None);
    }

    #[test]
    fn run_returns_owned_rows_and_terminates() {
        let cfg = golden_config();
        let memory = MemoryWriter::new();
        let w = Worker::new(&cfg, WorkerId(0), lone(&cfg), memory.clone()).unwrap();
        let outcome = w.run().unwrap();
        assert_eq!(outcome.report.iterations, Iteration(1));
        assert_eq!(outcome.report.metrics.snapshots_written, 1);
        assert_eq!(outcome.owned.len(), 16);
        assert_eq!(
            outcome.owned,
            vec![
                1.0, 1.0, 1.0, 1.0, //
                1.0, 2.0, 2.0, 1.0, //
                1.0, 2.0, 2.0, 1.0, //
                1.0, 1.0, 1.0, 1.0,
            ]
        );
        assert_eq!(
            memory.get(WorkerId(0), Iteration(1)).unwrap().values,
            outcome.owned
        );
    }

    #[test]
    fn snapshots_follow_interval() {
        let cfg = SolverConfig {
            size: 8,
            iterations: 25,
            snapshot_interval: 10,
            ..SolverConfig::default()
        };
        let memory = MemoryWriter::new();
        Worker::new(&cfg, WorkerId(0), lone(&cfg), memory.clone())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(
            memory.iterations_of(WorkerId(0)),
            vec![Iteration(10), Iteration(20)]
        );
    }

    #[test]
    fn invalid_config_fails_at_init() {
        let cfg = SolverConfig {
            iterations: 0,
            ..golden_config()
        };
        let err = Worker::new(&cfg, WorkerId(0), Neighbours::<ChannelLink>::none(), NullWriter)
            .err()
            .unwrap();
        assert_eq!(err, SolveError::Init(ConfigError::NoIterations));
    }

    #[test]
    fn missing_link_rejected() {
        let cfg = SolverConfig {
            size: 4,
            workers: 2,
            ..SolverConfig::default()
        };
        let err = Worker::new(&cfg, WorkerId(0), Neighbours::<ChannelLink>::none(), NullWriter)
            .err()
            .unwrap();
        assert_eq!(
            err,
            SolveError::Init(ConfigError::NeighbourMismatch {
                rank: WorkerId(0),
                direction: Direction::Down,
            })
        );
    }

    #[test]
    fn extra_link_rejected() {
        let cfg = SolverConfig {
            size: 4,
            workers: 2,
            ..SolverConfig::default()
        };
        // Worker 1's upward link handed to worker 0, which has nobody above.
        let mut mesh = channel_mesh(2, 1, None).unwrap();
        let lower = mesh.remove(1);
        let err = Worker::new(&cfg, WorkerId(0), lower, NullWriter).err().unwrap();
        assert_eq!(
            err,
            SolveError::Init(ConfigError::NeighbourMismatch {
                rank: WorkerId(0),
                direction: Direction::Up,
            })
        );
    }

    #[test]
    fn misaddressed_link_rejected() {
        let cfg = SolverConfig {
            size: 6,
            workers: 3,
            ..SolverConfig::default()
        };
        // Worker 2's links handed to worker 1.
        let mut mesh = channel_mesh(3, 1, None).unwrap();
        let wrong = mesh.remove(2);
        let err = Worker::new(&cfg, WorkerId(1), wrong, NullWriter).err().unwrap();
        assert!(matches!(
            err,
            SolveError::Init(ConfigError::NeighbourMismatch { .. })
        ));
    }

    #[test]
    fn non_finite_sweep_detected_when_enabled() {
        let cfg = SolverConfig {
            size: 4,
            iterations: 3,
            params: HeatParams {
                dt: 1e308,
                ..HeatParams::unit()
            },
            initial: InitialCondition::Dirichlet {
                interior: 0.0,
                boundary: 1e10,
            },
            check_finite: true,
            ..SolverConfig::default()
        };
        let mut w = Worker::new(&cfg, WorkerId(0), lone(&cfg), NullWriter).unwrap();
        let err = w.step().unwrap_err();
        assert!(matches!(err, SolveError::Sweep { .. }), "{err}");
        assert_eq!(w.state(), WorkerState::Failed);
        assert_eq!(w.step().unwrap_err(), err);
    }
}
