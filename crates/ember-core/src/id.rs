//! Strongly-typed identifiers for workers and iterations.

use std::fmt;
use std::num::TryFromIntError;

/// Identifies one worker (rank) in a solver run.
///
/// Workers are numbered `0..W` from the top of the domain downwards:
/// worker `k` owns the `k`-th contiguous block of rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub u32);

impl WorkerId {
    /// The rank as a `usize`, for indexing.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether this rank is even. Drives the odd/even exchange schedule.
    pub fn is_even(self) -> bool {
        self.0 % 2 == 0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

impl TryFrom<usize> for WorkerId {
    type Error = TryFromIntError;

    /// Rank of the `index`-th worker, if it fits in a `u32`.
    fn try_from(index: usize) -> Result<Self, Self::Error> {
        u32::try_from(index).map(Self)
    }
}

/// One-based time-step counter.
///
/// `Iteration(0)` is the initial state; the first completed step is
/// `Iteration(1)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Iteration(pub u64);

impl Iteration {
    /// The iteration after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Whether a snapshot is due at this iteration for the given interval.
    ///
    /// The initial state (iteration 0) is never snapshotted.
    pub fn is_multiple_of(self, interval: u64) -> bool {
        interval != 0 && self.0 != 0 && self.0 % interval == 0
    }
}

impl fmt::Display for Iteration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Iteration {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
