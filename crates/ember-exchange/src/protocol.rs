//! Halo refresh before each sweep.
//!
//! A worker with an upper neighbour sends its first owned row up and
//! receives the neighbour's last owned row into its top halo; a worker
//! with a lower neighbour sends its last owned row down and receives the
//! neighbour's first owned row into its bottom halo. A missing
//! neighbour's halo row is never touched.

use ember_core::{ExchangeError, WorkerId};
use ember_grid::LocalGrid;

use crate::link::{HaloLink, Neighbours};

/// Order in which a worker issues its sends and receives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExchangeSchedule {
    /// Every send first, then every receive.
    ///
    /// Deadlock-free when sends complete without waiting for the peer
    /// (link capacity ≥ 1).
    #[default]
    SendFirst,
    /// Even ranks talk to their lower neighbour first (send, then
    /// receive), then their upper one. Odd ranks talk to their upper
    /// neighbour first (receive, then send), then their lower one.
    ///
    /// Deadlock-free even when every send waits for the matching receive.
    OddEven,
}

/// Message counts of one exchange.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExchangeStats {
    /// Rows sent.
    pub sent: usize,
    /// Rows received.
    pub received: usize,
}

/// Per-worker halo exchange driver.
#[derive(Clone, Copy, Debug)]
pub struct HaloExchange {
    rank: WorkerId,
    schedule: ExchangeSchedule,
}

impl HaloExchange {
    /// Exchange driver for `rank`.
    pub fn new(rank: WorkerId, schedule: ExchangeSchedule) -> Self {
        Self { rank, schedule }
    }

    /// The schedule in use.
    pub fn schedule(&self) -> ExchangeSchedule {
        self.schedule
    }

    /// Refresh both facing halo rows of `grid`.
    ///
    /// Performs exactly one send and one receive per existing neighbour.
    /// Stops at the first failure; the grid's halos may then be partly
    /// refreshed, which is irrelevant since the failure is fatal.
    pub fn exchange<L: HaloLink>(
        &self,
        neighbours: &Neighbours<L>,
        grid: &mut LocalGrid,
    ) -> Result<ExchangeStats, ExchangeError> {
        let mut stats = ExchangeStats::default();
        match self.schedule {
            ExchangeSchedule::SendFirst => {
                if let Some(up) = &neighbours.up {
                    up.send_row(grid.first_owned_row())?;
                    stats.sent += 1;
                }
                if let Some(down) = &neighbours.down {
                    down.send_row(grid.last_owned_row())?;
                    stats.sent += 1;
                }
                if let Some(up) = &neighbours.up {
                    up.recv_row(grid.top_halo_mut())?;
                    stats.received += 1;
                }
                if let Some(down) = &neighbours.down {
                    down.recv_row(grid.bottom_halo_mut())?;
                    stats.received += 1;
                }
            }
            ExchangeSchedule::OddEven if self.rank.is_even() => {
                if let Some(down) = &neighbours.down {
                    down.send_row(grid.last_owned_row())?;
                    down.recv_row(grid.bottom_halo_mut())?;
                    stats.sent += 1;
                    stats.received += 1;
                }
                if let Some(up) = &neighbours.up {
                    up.send_row(grid.first_owned_row())?;
                    up.recv_row(grid.top_halo_mut())?;
                    stats.sent += 1;
                    stats.received += 1;
                }
            }
            ExchangeSchedule::OddEven => {
                if let Some(up) = &neighbours.up {
                    up.recv_row(grid.top_halo_mut())?;
                    up.send_row(grid.first_owned_row())?;
                    stats.sent += 1;
                    stats.received += 1;
                }
                if let Some(down) = &neighbours.down {
                    down.recv_row(grid.bottom_halo_mut())?;
                    down.send_row(grid.last_owned_row())?;
                    stats.sent += 1;
                    stats.received += 1;
                }
            }
        }
        tracing::trace!(
            rank = self.rank.0,
            sent = stats.sent,
            received = stats.received,
            "halo exchange complete"
        );
        Ok(stats)
    }
}
