//! A worker's private slice of the domain plus its two halo rows.

use crate::partition::Partition;

/// Flat row-major buffer of shape `(rows_owned + 2) × cols`.
///
/// Indexed as `row * cols + col`. Row 0 is the top halo, rows
/// `1..=rows_owned` hold owned data, row `rows_owned + 1` is the bottom
/// halo. The buffer is allocated once and never resized, so the shape is
/// fixed for the lifetime of the grid.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalGrid {
    rows_owned: usize,
    cols: usize,
    data: Vec<f64>,
}

impl LocalGrid {
    /// Zero-filled grid with `rows_owned` owned rows of width `cols`.
    pub fn new(rows_owned: usize, cols: usize) -> Self {
        Self {
            rows_owned,
            cols,
            data: vec![0.0; (rows_owned + 2) * cols],
        }
    }

    /// Zero-filled grid shaped for a partition.
    pub fn for_partition(partition: &Partition) -> Self {
        Self::new(partition.rows_owned(), partition.size())
    }

    /// Number of owned rows.
    pub fn rows_owned(&self) -> usize {
        self.rows_owned
    }

    /// Owned rows plus the two halos.
    pub fn rows_total(&self) -> usize {
        self.rows_owned + 2
    }

    /// Row width.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows_total, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows_total(), self.cols)
    }

    /// Local index of the bottom halo row.
    pub fn bottom_halo_index(&self) -> usize {
        self.rows_owned + 1
    }

    /// Flat index of `(row, col)`.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows_total() && col < self.cols);
        row * self.cols + col
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.index(row, col)]
    }

    /// Overwrite the value at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let i = self.index(row, col);
        self.data[i] = value;
    }

    /// One full row, halos included.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.cols;
        &self.data[start..start + self.cols]
    }

    /// One full row, mutably.
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        let start = row * self.cols;
        &mut self.data[start..start + self.cols]
    }

    /// Halo row mirroring the upper neighbour's last owned row.
    pub fn top_halo(&self) -> &[f64] {
        self.row(0)
    }

    /// Mutable top halo, written only by halo exchange and Init.
    pub fn top_halo_mut(&mut self) -> &mut [f64] {
        self.row_mut(0)
    }

    /// Halo row mirroring the lower neighbour's first owned row.
    pub fn bottom_halo(&self) -> &[f64] {
        self.row(self.bottom_halo_index())
    }

    /// Mutable bottom halo, written only by halo exchange and Init.
    pub fn bottom_halo_mut(&mut self) -> &mut [f64] {
        let row = self.bottom_halo_index();
        self.row_mut(row)
    }

    /// Local row 1: what the upper neighbour needs.
    pub fn first_owned_row(&self) -> &[f64] {
        self.row(1)
    }

    /// Local row `rows_owned`: what the lower neighbour needs.
    pub fn last_owned_row(&self) -> &[f64] {
        self.row(self.rows_owned)
    }

    /// All owned rows, halos excluded, row-major.
    pub fn owned(&self) -> &[f64] {
        &self.data[self.cols..(self.rows_owned + 1) * self.cols]
    }

    /// The whole buffer, halos included.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// The whole buffer, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copy of the owned rows.
    pub fn owned_to_vec(&self) -> Vec<f64> {
        self.owned().to_vec()
    }

    /// First non-finite value in the owned rows, as `(local_row, col)`.
    pub fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.owned()
            .iter()
            .position(|v| !v.is_finite())
            .map(|i| (i / self.cols + 1, i % self.cols))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_includes_two_halo_rows() {
        let g = LocalGrid::new(3, 5);
        assert_eq!(g.shape(), (5, 5));
        assert_eq!(g.as_slice().len(), 25);
        assert_eq!(g.owned().len(), 15);
    }

    #[test]
    fn row_accessors_address_the_right_rows() {
        let mut g = LocalGrid::new(2, 3);
        for r in 0..g.rows_total() {
            g.row_mut(r).fill(r as f64);
        }
        assert_eq!(g.top_halo(), &[0.0; 3]);
        assert_eq!(g.first_owned_row(), &[1.0; 3]);
        assert_eq!(g.last_owned_row(), &[2.0; 3]);
        assert_eq!(g.bottom_halo(), &[3.0; 3]);
        assert_eq!(g.owned(), &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn halo_writes_do_not_touch_owned_rows() {
        let mut g = LocalGrid::new(1, 4);
        g.top_halo_mut().fill(9.0);
        g.bottom_halo_mut().fill(7.0);
        assert_eq!(g.owned(), &[0.0; 4]);
    }

    #[test]
    fn finds_first_non_finite_owned_value() {
        let mut g = LocalGrid::new(2, 3);
        g.set(0, 1, f64::NAN); // halo is ignored
        assert_eq!(g.first_non_finite(), None);
        g.set(2, 2, f64::INFINITY);
        assert_eq!(g.first_non_finite(), Some((2, 2)));
    }

    #[test]
    fn flat_indexing_is_row_major() {
        let g = LocalGrid::new(2, 4);
        assert_eq!(g.index(0, 0), 0);
        assert_eq!(g.index(1, 0), 4);
        assert_eq!(g.index(3, 3), 15);
    }
}
