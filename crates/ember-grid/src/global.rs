//! Assembled view of the whole domain.
//!
//! Never built during a distributed run; used by the sequential reference
//! solver and by tests that compare decompositions.

use crate::local::LocalGrid;
use crate::partition::Partition;

/// Row-major `size × size` grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobalGrid {
    size: usize,
    data: Vec<f64>,
}

impl GlobalGrid {
    /// Zero-filled grid of side `size`.
    pub fn new(size: usize) -> Self {
        Self {
            size,
            data: vec![0.0; size * size],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` if its length is
    /// not `size * size`.
    pub fn from_vec(size: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == size * size).then_some(Self { size, data })
    }

    /// Copy the owned rows of a local grid that spans the whole domain.
    ///
    /// `grid` must own exactly `cols` rows, as a single worker's grid does.
    pub fn from_whole(grid: &LocalGrid) -> Self {
        debug_assert_eq!(grid.rows_owned(), grid.cols());
        Self {
            size: grid.cols(),
            data: grid.owned_to_vec(),
        }
    }

    /// Stitch per-worker owned rows back together.
    ///
    /// Each part is a partition and its owned rows (`rows_owned * size`
    /// values). Returns `None` if the parts do not cover every row exactly
    /// once or a part has the wrong length.
    pub fn assemble<'a>(
        size: usize,
        parts: impl IntoIterator<Item = (&'a Partition, &'a [f64])>,
    ) -> Option<Self> {
        let mut grid = Self::new(size);
        let mut covered = vec![false; size];
        for (partition, owned) in parts {
            if partition.size() != size || owned.len() != partition.rows_owned() * size {
                return None;
            }
            for global in partition.global_rows() {
                if std::mem::replace(&mut covered[global], true) {
                    return None;
                }
            }
            let start = partition.row_start() * size;
            grid.data[start..start + owned.len()].copy_from_slice(owned);
        }
        covered.iter().all(|&c| c).then_some(grid)
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.size + col]
    }

    /// One row.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.size;
        &self.data[start..start + self.size]
    }

    /// The whole buffer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Largest `|a - b| / max(|a|, |b|, 1)` over all cells, or `None` if
    /// the sizes differ.
    pub fn max_relative_diff(&self, other: &GlobalGrid) -> Option<f64> {
        if self.size != other.size {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(&other.data)
                .map(|(a, b)| (a - b).abs() / a.abs().max(b.abs()).max(1.0))
                .fold(0.0, f64::max),
        )
    }
}
