//! In-process cluster runner.
//!
//! [`run_cluster`] plays the role of a launcher: it validates the
//! configuration, wires every adjacent pair of workers with channel links,
//! runs each worker on its own named thread and collects the results.
//! [`run_workers`] does the same for workers built by the caller, over
//! any transport.

use std::thread::{self, JoinHandle};

use ember_core::{ConfigError, SolveError, WorkerId};
use ember_exchange::{channel_mesh, HaloLink};
use ember_grid::GlobalGrid;
use ember_snapshot::SnapshotWriter;

use crate::config::SolverConfig;
use crate::worker::{StageTracker, Worker, WorkerOutcome, WorkerReport};

type WorkerHandle = JoinHandle<Result<WorkerOutcome, SolveError>>;

/// Results of a run in which every worker terminated normally.
#[derive(Clone, Debug)]
pub struct ClusterOutcome {
    size: usize,
    outcomes: Vec<WorkerOutcome>,
}

impl ClusterOutcome {
    /// Per-worker outcomes, in rank order.
    pub fn outcomes(&self) -> &[WorkerOutcome] {
        &self.outcomes
    }

    /// Per-worker reports, in rank order.
    pub fn reports(&self) -> impl Iterator<Item = &WorkerReport> {
        self.outcomes.iter().map(|o| &o.report)
    }

    /// Stitch every worker's final owned rows into the whole domain.
    ///
    /// Returns `None` only if the outcomes do not tile the domain, which a
    /// successful [`run_cluster`] never produces.
    pub fn assemble(&self) -> Option<GlobalGrid> {
        GlobalGrid::assemble(
            self.size,
            self.outcomes
                .iter()
                .map(|o| (&o.partition, o.owned.as_slice())),
        )
    }
}

/// Run `config.workers` workers to completion, one thread each.
///
/// `writer_factory` is called once per rank, in rank order, on the calling
/// thread.
///
/// # Errors
///
/// - [`SolveError::Init`] if the configuration is invalid; no thread is
///   started.
/// - Otherwise any error of [`run_workers`].
pub fn run_cluster<W, F>(
    config: &SolverConfig,
    mut writer_factory: F,
) -> Result<ClusterOutcome, SolveError>
where
    W: SnapshotWriter + 'static,
    F: FnMut(WorkerId) -> W,
{
    config.validate()?;
    let mesh = channel_mesh(config.workers, config.link_capacity, config.exchange_timeout)?;

    let mut workers = Vec::with_capacity(config.workers);
    for (k, neighbours) in mesh.into_iter().enumerate() {
        let rank = WorkerId::try_from(k).map_err(|_| ConfigError::WorkerCountOverflow {
            workers: config.workers,
        })?;
        workers.push(Worker::new(config, rank, neighbours, writer_factory(rank))?);
    }
    tracing::debug!(workers = config.workers, size = config.size, "starting cluster");
    run_workers(workers)
}

/// Run already-built workers to completion, one named thread each.
///
/// Workers must be given in rank order and tile one domain.
///
/// # Errors
///
/// - [`SolveError::ThreadSpawnFailed`] if a worker thread could not start.
/// - Otherwise the root cause when any worker fails: the first error, in
///   rank order, that is not a disconnection cascade from another
///   worker's failure.
pub fn run_workers<L, W>(workers: Vec<Worker<L, W>>) -> Result<ClusterOutcome, SolveError>
where
    L: HaloLink + 'static,
    W: SnapshotWriter + 'static,
{
    let size = workers.first().map_or(0, |w| w.partition().size());
    let mut handles: Vec<(WorkerId, StageTracker, WorkerHandle)> = Vec::with_capacity(workers.len());
    let mut spawn_failure = None;
    for worker in workers {
        let rank = worker.rank();
        let stage = worker.stage_tracker();
        let spawned = thread::Builder::new()
            .name(format!("ember-worker-{rank}"))
            .spawn(move || worker.run());
        match spawned {
            Ok(handle) => handles.push((rank, stage, handle)),
            Err(e) => {
                // Remaining workers are dropped with their links, so the
                // running ones fail by disconnection and can be joined.
                spawn_failure = Some(SolveError::ThreadSpawnFailed {
                    worker: rank,
                    reason: e.to_string(),
                });
                break;
            }
        }
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    let mut failures = Vec::new();
    for (rank, stage, handle) in handles {
        match handle.join() {
            Ok(Ok(outcome)) => outcomes.push(outcome),
            Ok(Err(e)) => failures.push(e),
            Err(_) => failures.push(SolveError::WorkerPanicked {
                worker: rank,
                stage: stage.current(),
            }),
        }
    }

    if let Some(e) = spawn_failure {
        tracing::error!(error = %e, "cluster start failed");
        return Err(e);
    }
    if let Some(root) = root_cause(failures) {
        tracing::error!(error = %root, "cluster run failed");
        return Err(root);
    }
    tracing::debug!(workers = outcomes.len(), "cluster finished");
    Ok(ClusterOutcome { size, outcomes })
}

/// First non-cascade failure, else the first failure.
fn root_cause(failures: Vec<SolveError>) -> Option<SolveError> {
    let root = failures.iter().position(|e| !e.is_cascade()).unwrap_or(0);
    failures.into_iter().nth(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{ExchangeError, Iteration, SnapshotError, Stage};
    use ember_snapshot::{NullWriter, SnapshotView};

    struct PanickingWriter;

    impl SnapshotWriter for PanickingWriter {
        fn write(&mut self, _snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
            panic!("writer bug");
        }
    }

    #[test]
    fn root_cause_skips_cascades() {
        let cascade = SolveError::HaloExchange {
            worker: WorkerId(0),
            iteration: Iteration(3),
            source: ExchangeError::Disconnected { peer: WorkerId(1) },
        };
        let root = SolveError::WorkerPanicked {
            worker: WorkerId(1),
            stage: Stage::Sweep,
        };
        assert_eq!(
            root_cause(vec![cascade.clone(), root.clone()]),
            Some(root)
        );
        assert_eq!(root_cause(vec![cascade.clone()]), Some(cascade));
        assert_eq!(root_cause(Vec::new()), None);
    }

    #[test]
    fn invalid_config_starts_nothing() {
        let cfg = SolverConfig {
            size: 10,
            workers: 4,
            ..SolverConfig::default()
        };
        let mut calls = 0;
        let err = run_cluster(&cfg, |_| {
            calls += 1;
            NullWriter
        })
        .unwrap_err();
        assert_eq!(err.stage(), Stage::Init);
        assert_eq!(calls, 0);
    }

    #[test]
    fn assembles_full_domain() {
        let cfg = SolverConfig {
            size: 8,
            workers: 4,
            iterations: 5,
            ..SolverConfig::default()
        };
        let outcome = run_cluster(&cfg, |_| NullWriter).unwrap();
        assert_eq!(outcome.outcomes().len(), 4);
        assert!(outcome.reports().all(|r| r.iterations == Iteration(5)));
        let grid = outcome.assemble().unwrap();
        assert_eq!(grid.size(), 8);
    }

    #[test]
    fn panic_names_the_stage_it_happened_in() {
        let cfg = SolverConfig {
            size: 4,
            workers: 1,
            iterations: 3,
            snapshot_interval: 2,
            ..SolverConfig::default()
        };
        let err = run_cluster(&cfg, |_| PanickingWriter).unwrap_err();
        assert_eq!(
            err,
            SolveError::WorkerPanicked {
                worker: WorkerId(0),
                stage: Stage::Snapshot,
            }
        );
    }
}
