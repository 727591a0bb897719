//! Plain-text snapshot files.
//!
//! One file per `(worker, iteration)`, named
//! `output_{worker}_time{iteration}.txt`. Each owned row is written on its
//! own line, every value with two decimals and followed by one space.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use ember_core::{Iteration, SnapshotError, WorkerId};

use crate::view::SnapshotView;
use crate::writer::SnapshotWriter;

/// File name of the snapshot for `(worker, iteration)`.
pub fn file_name(worker: WorkerId, iteration: Iteration) -> String {
    format!("output_{worker}_time{iteration}.txt")
}

/// Render a snapshot as fixed two-decimal text.
pub fn render(snapshot: &SnapshotView<'_>) -> String {
    // "-123.45 " is a generous per-value estimate.
    let mut out = String::with_capacity(snapshot.values().len() * 8 + snapshot.row_count());
    for row in snapshot.rows() {
        for v in row {
            // Writing into a String cannot fail.
            let _ = write!(out, "{v:.2} ");
        }
        out.push('\n');
    }
    out
}

/// Writes each snapshot to its own text file under a directory.
#[derive(Clone, Debug)]
pub struct TextFileWriter {
    dir: PathBuf,
}

impl TextFileWriter {
    /// Writer targeting `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writer targeting `dir`, creating it if needed.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, SnapshotError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SnapshotError::Io {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { dir })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the snapshot for `(worker, iteration)`.
    pub fn path_for(&self, worker: WorkerId, iteration: Iteration) -> PathBuf {
        self.dir.join(file_name(worker, iteration))
    }
}

impl SnapshotWriter for TextFileWriter {
    fn write(&mut self, snapshot: &SnapshotView<'_>) -> Result<(), SnapshotError> {
        let path = self.path_for(snapshot.worker(), snapshot.iteration());
        fs::write(&path, render(snapshot)).map_err(|e| SnapshotError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_decimals_with_trailing_space() {
        let data = [0.0, 1.005, -2.5, 3.14159];
        let snap = SnapshotView::new(WorkerId(0), Iteration(10), 2, &data);
        let text = render(&snap);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0.00 "));
        assert!(lines[0].ends_with(' '));
        assert_eq!(lines[1], "-2.50 3.14 ");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn file_name_matches_layout() {
        assert_eq!(file_name(WorkerId(3), Iteration(40)), "output_3_time40.txt");
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let mut w = TextFileWriter::new("/nonexistent/ember/snapshots");
        let data = [1.0];
        let err = w
            .write(&SnapshotView::new(WorkerId(0), Iteration(1), 1, &data))
            .unwrap_err();
        match err {
            SnapshotError::Io { path, .. } => assert!(path.ends_with("output_0_time1.txt")),
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
