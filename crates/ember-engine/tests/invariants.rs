//! Integration test: hand-computed values, fixed boundaries, determinism.

use ember_core::{HeatParams, Iteration, WorkerId};
use ember_engine::{run_cluster, SolverConfig};
use ember_grid::InitialCondition;
use ember_snapshot::{MemoryWriter, OwnedSnapshot};
use ember_test_utils::fields;

fn golden(workers: usize) -> SolverConfig {
    SolverConfig {
        size: 4,
        workers,
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

#[test]
fn golden_value_after_one_step() {
    for workers in [1, 2, 4] {
        let grid = run_cluster(&golden(workers), |_| MemoryWriter::new())
            .unwrap()
            .assemble()
            .unwrap();
        for i in 1..3 {
            for j in 1..3 {
                assert_eq!(grid.get(i, j), 2.0, "{workers} workers, cell ({i}, {j})");
            }
        }
        for k in 0..4 {
            assert_eq!(grid.get(0, k), 1.0);
            assert_eq!(grid.get(3, k), 1.0);
            assert_eq!(grid.get(k, 0), 1.0);
            assert_eq!(grid.get(k, 3), 1.0);
        }
    }
}

/// Reassemble every snapshot of one iteration into `(row, col) -> value`.
fn field_at(snapshots: &[OwnedSnapshot], iteration: Iteration, size: usize, rows: usize) -> Vec<f64> {
    let mut field = vec![f64::NAN; size * size];
    for s in snapshots.iter().filter(|s| s.iteration == iteration) {
        let start = s.worker.index() * rows * size;
        field[start..start + s.values.len()].copy_from_slice(&s.values);
    }
    field
}

#[test]
fn boundary_cells_never_change() {
    let size = 12;
    let workers = 4;
    let cfg = SolverConfig {
        size,
        workers,
        iterations: 25,
        snapshot_interval: 1,
        initial: fields::noise(size, 3),
        ..SolverConfig::default()
    };
    let memory = MemoryWriter::new();
    run_cluster(&cfg, |_| memory.clone()).unwrap();
    let snapshots = memory.snapshots();
    assert_eq!(snapshots.len(), workers * 25);

    for t in 1..=25 {
        let field = field_at(&snapshots, Iteration(t), size, size / workers);
        for row in 0..size {
            for col in 0..size {
                let on_edge = row == 0 || row == size - 1 || col == 0 || col == size - 1;
                if on_edge {
                    let initial = cfg.initial.value(WorkerId(0), size, row, col);
                    assert_eq!(
                        field[row * size + col].to_bits(),
                        initial.to_bits(),
                        "iteration {t}, cell ({row}, {col})"
                    );
                }
            }
        }
    }
}

#[test]
fn identical_runs_are_bit_identical() {
    let cfg = SolverConfig {
        size: 16,
        workers: 4,
        iterations: 30,
        snapshot_interval: 5,
        initial: fields::hot_square(16),
        ..SolverConfig::default()
    };
    let run = || {
        let memory = MemoryWriter::new();
        run_cluster(&cfg, |_| memory.clone()).unwrap();
        let mut snaps = memory.snapshots();
        snaps.sort_by_key(|s| (s.iteration, s.worker));
        snaps
    };
    let first = run();
    let second = run();
    assert_eq!(first.len(), 4 * 6);
    for (a, b) in first.iter().zip(&second) {
        assert_eq!((a.worker, a.iteration), (b.worker, b.iteration));
        let bits_a: Vec<u64> = a.values.iter().map(|v| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.values.iter().map(|v| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);
    }
}

#[test]
fn reports_count_iterations_and_snapshots() {
    let cfg = SolverConfig {
        size: 8,
        workers: 2,
        iterations: 35,
        snapshot_interval: 10,
        ..SolverConfig::default()
    };
    let outcome = run_cluster(&cfg, |_| MemoryWriter::new()).unwrap();
    for report in outcome.reports() {
        assert_eq!(report.iterations, Iteration(35));
        assert_eq!(report.metrics.iterations, 35);
        assert_eq!(report.metrics.snapshots_written, 3);
        assert_eq!(report.metrics.snapshots_failed, 0);
        assert_eq!(report.metrics.rows_sent, 35);
        assert_eq!(report.metrics.rows_received, 35);
    }
}
