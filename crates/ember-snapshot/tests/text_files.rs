//! Snapshot files on disk.

use std::fs;

use ember_core::{Iteration, WorkerId};
use ember_snapshot::text::file_name;
use ember_snapshot::{QueuedWriter, SnapshotView, SnapshotWriter, TextFileWriter};

#[test]
fn one_file_per_worker_and_iteration() {
    let dir = tempfile::tempdir().unwrap();
    let mut w = TextFileWriter::new(dir.path());
    let rows = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    for (worker, iteration) in [(0, 10), (0, 20), (1, 10)] {
        w.write(&SnapshotView::new(
            WorkerId(worker),
            Iteration(iteration),
            3,
            &rows,
        ))
        .unwrap();
    }

    let mut names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "output_0_time10.txt",
            "output_0_time20.txt",
            "output_1_time10.txt"
        ]
    );

    let text = fs::read_to_string(dir.path().join("output_1_time10.txt")).unwrap();
    assert_eq!(text, "1.00 2.00 3.00 \n4.00 5.00 6.00 \n");
}

#[test]
fn create_makes_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("run").join("snapshots");
    let mut w = TextFileWriter::create(&nested).unwrap();
    w.write(&SnapshotView::new(WorkerId(2), Iteration(5), 1, &[0.126]))
        .unwrap();
    let text = fs::read_to_string(nested.join(file_name(WorkerId(2), Iteration(5)))).unwrap();
    assert_eq!(text, "0.13 \n");
}

#[test]
fn queued_text_writer_flushes_on_finish() {
    let dir = tempfile::tempdir().unwrap();
    let mut q = QueuedWriter::spawn(TextFileWriter::new(dir.path()), 1, "ember-snapshot-0").unwrap();
    for it in [10, 20, 30] {
        q.write(&SnapshotView::new(WorkerId(0), Iteration(it), 2, &[0.0, 1.0]))
            .unwrap();
    }
    q.finish().unwrap();
    for it in [10, 20, 30] {
        assert!(dir.path().join(file_name(WorkerId(0), Iteration(it))).exists());
    }
}
