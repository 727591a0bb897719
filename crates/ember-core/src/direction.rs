//! Direction of travel for halo rows along the worker chain.

use std::fmt;

/// Which way a halo row travels.
///
/// Workers are stacked top to bottom by rank. A row travelling [`Up`](Direction::Up)
/// goes from rank `k` to rank `k - 1`; a row travelling
/// [`Down`](Direction::Down) goes from rank `k` to rank `k + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards lower ranks.
    Up,
    /// Towards higher ranks.
    Down,
}

impl Direction {
    /// The opposite direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}
