//! Row-wise decomposition of the global domain.

use std::ops::Range;

use ember_core::{ConfigError, Direction, WorkerId};
use smallvec::SmallVec;

/// The contiguous block of global rows owned by one worker.
///
/// A domain of side `size` split across `workers` gives every worker
/// exactly `size / workers` rows; worker `k` owns
/// `[k * rows, (k + 1) * rows)`. Partitions of one decomposition are
/// disjoint and cover `[0, size)` exactly once.
///
/// Local row indices used by [`LocalGrid`](crate::LocalGrid) are offset
/// by one: local row 0 is the top halo, local rows `1..=rows_owned` map to
/// global rows `row_start..row_end`, local row `rows_owned + 1` is the
/// bottom halo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Partition {
    rank: WorkerId,
    workers: usize,
    size: usize,
    row_start: usize,
    row_end: usize,
}

impl Partition {
    /// Partition for one rank.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `size` or `workers` is zero, if there are more
    /// workers than rows, if `size` is not a multiple of `workers`, or if
    /// `rank` is outside `0..workers`.
    pub fn new(size: usize, workers: usize, rank: WorkerId) -> Result<Self, ConfigError> {
        check_decomposition(size, workers)?;
        if rank.index() >= workers {
            return Err(ConfigError::RankOutOfRange { rank, workers });
        }
        let rows = size / workers;
        let row_start = rank.index() * rows;
        Ok(Self {
            rank,
            workers,
            size,
            row_start,
            row_end: row_start + rows,
        })
    }

    /// Partitions for every rank, in rank order.
    pub fn decompose(size: usize, workers: usize) -> Result<Vec<Self>, ConfigError> {
        check_decomposition(size, workers)?;
        (0..workers)
            .map(|k| {
                let rank = WorkerId::try_from(k)
                    .map_err(|_| ConfigError::WorkerCountOverflow { workers })?;
                Self::new(size, workers, rank)
            })
            .collect()
    }

    /// Owning worker.
    pub fn rank(&self) -> WorkerId {
        self.rank
    }

    /// Number of workers in the decomposition.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Global domain side length (also the row width).
    pub fn size(&self) -> usize {
        self.size
    }

    /// First owned global row.
    pub fn row_start(&self) -> usize {
        self.row_start
    }

    /// One past the last owned global row.
    pub fn row_end(&self) -> usize {
        self.row_end
    }

    /// Number of owned rows.
    pub fn rows_owned(&self) -> usize {
        self.row_end - self.row_start
    }

    /// Owned global rows.
    pub fn global_rows(&self) -> Range<usize> {
        self.row_start..self.row_end
    }

    /// The worker above, if any.
    pub fn upper_neighbour(&self) -> Option<WorkerId> {
        (self.rank.0 > 0).then(|| WorkerId(self.rank.0 - 1))
    }

    /// The worker below, if any.
    pub fn lower_neighbour(&self) -> Option<WorkerId> {
        (self.rank.index() + 1 < self.workers).then(|| WorkerId(self.rank.0 + 1))
    }

    /// Existing neighbours, tagged with the direction a row travels to
    /// reach them. At most two.
    pub fn neighbours(&self) -> SmallVec<[(Direction, WorkerId); 2]> {
        let mut out = SmallVec::new();
        if let Some(up) = self.upper_neighbour() {
            out.push((Direction::Up, up));
        }
        if let Some(down) = self.lower_neighbour() {
            out.push((Direction::Down, down));
        }
        out
    }

    /// Whether this partition holds global row 0.
    pub fn is_top(&self) -> bool {
        self.row_start == 0
    }

    /// Whether this partition holds global row `size - 1`.
    pub fn is_bottom(&self) -> bool {
        self.row_end == self.size
    }

    /// Local index of a global row, if owned here.
    pub fn local_row(&self, global: usize) -> Option<usize> {
        (self.row_start..self.row_end)
            .contains(&global)
            .then(|| global - self.row_start + 1)
    }

    /// Global index of an owned local row (`1..=rows_owned`).
    pub fn global_row(&self, local: usize) -> Option<usize> {
        (1..=self.rows_owned())
            .contains(&local)
            .then(|| self.row_start + local - 1)
    }

    /// Local rows the stencil updates.
    ///
    /// Global rows 0 and `size - 1` are fixed boundaries and are excluded,
    /// so the top and bottom partitions never read their outward halo.
    /// The range is empty when the partition holds no updatable row.
    pub fn sweep_rows(&self) -> Range<usize> {
        let first = self.row_start.max(1);
        let last = self.row_end.min(self.size.saturating_sub(1));
        if first >= last {
            return 1..1;
        }
        (first - self.row_start + 1)..(last - self.row_start + 1)
    }
}

fn check_decomposition(size: usize, workers: usize) -> Result<(), ConfigError> {
    if size == 0 {
        return Err(ConfigError::EmptyDomain);
    }
    if workers == 0 {
        return Err(ConfigError::NoWorkers);
    }
    if u32::try_from(workers).is_err() {
        return Err(ConfigError::WorkerCountOverflow { workers });
    }
    if workers > size {
        return Err(ConfigError::TooManyWorkers { size, workers });
    }
    if size % workers != 0 {
        return Err(ConfigError::UnevenPartition { size, workers });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn worker_count_beyond_rank_space_rejected() {
        let workers = u32::MAX as usize + 1;
        assert_eq!(
            Partition::new(usize::MAX, workers, WorkerId(0)),
            Err(ConfigError::WorkerCountOverflow { workers })
        );
    }

    #[test]
    fn two_way_split_of_four() {
        let parts = Partition::decompose(4, 2).unwrap();
        assert_eq!(parts[0].global_rows(), 0..2);
        assert_eq!(parts[1].global_rows(), 2..4);
        assert_eq!(parts[0].lower_neighbour(), Some(WorkerId(1)));
        assert_eq!(parts[0].upper_neighbour(), None);
        assert_eq!(parts[1].upper_neighbour(), Some(WorkerId(0)));
        assert_eq!(parts[1].lower_neighbour(), None);
    }

    #[test]
    fn uneven_division_is_rejected() {
        match Partition::decompose(10, 3) {
            Err(ConfigError::UnevenPartition {
                size: 10,
                workers: 3,
            }) => {}
            other => panic!("expected UnevenPartition, got {other:?}"),
        }
    }

    #[test]
    fn zero_inputs_are_rejected() {
        assert_eq!(Partition::decompose(0, 1), Err(ConfigError::EmptyDomain));
        assert_eq!(Partition::decompose(4, 0), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn too_many_workers_is_rejected() {
        assert_eq!(
            Partition::decompose(4, 8),
            Err(ConfigError::TooManyWorkers {
                size: 4,
                workers: 8
            })
        );
    }

    #[test]
    fn rank_out_of_range_is_rejected() {
        match Partition::new(8, 2, WorkerId(2)) {
            Err(ConfigError::RankOutOfRange { .. }) => {}
            other => panic!("expected RankOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn sweep_rows_skip_global_boundary() {
        // Single worker: global rows 1..3 -> local rows 2..4.
        let solo = Partition::new(4, 1, WorkerId(0)).unwrap();
        assert_eq!(solo.sweep_rows(), 2..4);

        let parts = Partition::decompose(4, 2).unwrap();
        // Worker 0 owns global 0..2, updates global row 1 = local row 2.
        assert_eq!(parts[0].sweep_rows(), 2..3);
        // Worker 1 owns global 2..4, updates global row 2 = local row 1.
        assert_eq!(parts[1].sweep_rows(), 1..2);
    }

    #[test]
    fn single_row_partitions_at_the_edges_do_not_sweep() {
        let parts = Partition::decompose(4, 4).unwrap();
        assert!(parts[0].sweep_rows().is_empty());
        assert_eq!(parts[1].sweep_rows(), 1..2);
        assert_eq!(parts[2].sweep_rows(), 1..2);
        assert!(parts[3].sweep_rows().is_empty());
    }

    #[test]
    fn tiny_domains_have_no_interior() {
        let p = Partition::new(2, 1, WorkerId(0)).unwrap();
        assert!(p.sweep_rows().is_empty());
        let p = Partition::new(1, 1, WorkerId(0)).unwrap();
        assert!(p.sweep_rows().is_empty());
    }

    #[test]
    fn local_and_global_rows_round_trip() {
        let p = Partition::new(12, 3, WorkerId(1)).unwrap();
        assert_eq!(p.local_row(4), Some(1));
        assert_eq!(p.local_row(7), Some(4));
        assert_eq!(p.local_row(8), None);
        assert_eq!(p.global_row(1), Some(4));
        assert_eq!(p.global_row(0), None);
        assert_eq!(p.global_row(5), None);
    }

    #[test]
    fn neighbour_directions() {
        let p = Partition::new(9, 3, WorkerId(1)).unwrap();
        let n = p.neighbours();
        assert_eq!(
            n.as_slice(),
            &[(Direction::Up, WorkerId(0)), (Direction::Down, WorkerId(2))]
        );
        let solo = Partition::new(9, 1, WorkerId(0)).unwrap();
        assert!(solo.neighbours().is_empty());
    }

    proptest! {
        #[test]
        fn partitions_cover_domain_exactly_once(
            workers in 1usize..12,
            rows_each in 1usize..12,
        ) {
            let size = workers * rows_each;
            let parts = Partition::decompose(size, workers).unwrap();
            let mut covered = vec![0u32; size];
            for p in &parts {
                prop_assert_eq!(p.rows_owned(), rows_each);
                for r in p.global_rows() {
                    covered[r] += 1;
                }
            }
            prop_assert!(covered.iter().all(|&c| c == 1));
        }

        #[test]
        fn sweep_rows_cover_global_interior_exactly_once(
            workers in 1usize..8,
            rows_each in 1usize..8,
        ) {
            let size = workers * rows_each;
            let parts = Partition::decompose(size, workers).unwrap();
            let mut covered = vec![0u32; size];
            for p in &parts {
                for local in p.sweep_rows() {
                    covered[p.global_row(local).unwrap()] += 1;
                }
            }
            for (row, &c) in covered.iter().enumerate() {
                let interior = row > 0 && row + 1 < size;
                prop_assert_eq!(c, u32::from(interior));
            }
        }
    }
}
