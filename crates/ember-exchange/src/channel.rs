//! In-process transport over crossbeam channels.
//!
//! Every adjacent pair of workers shares two dedicated channels, one per
//! direction of travel. Workers never share memory: each row is copied
//! into the message that crosses the channel.

use std::time::Duration;

use crossbeam_channel::{
    bounded, Receiver, RecvTimeoutError, SendTimeoutError, Sender,
};
use ember_core::{ConfigError, Direction, ExchangeError, WorkerId};

use crate::link::{accept_message, HaloLink, HaloMessage, Neighbours};

/// [`HaloLink`] backed by a pair of bounded crossbeam channels.
///
/// Capacity 0 gives rendezvous semantics (a send completes only when the
/// peer receives), which requires [`ExchangeSchedule::OddEven`](crate::ExchangeSchedule::OddEven).
/// Capacity 1 or more lets sends complete without waiting for the peer.
#[derive(Debug)]
pub struct ChannelLink {
    me: WorkerId,
    peer: WorkerId,
    outgoing: Direction,
    tx: Sender<HaloMessage>,
    rx: Receiver<HaloMessage>,
    timeout: Option<Duration>,
}

impl ChannelLink {
    /// Both ends of one link between `upper` and `upper + 1`.
    ///
    /// Returns `(upper_side, lower_side)`: the link held by the upper
    /// worker (sending down) and the one held by the lower worker
    /// (sending up).
    pub fn pair(upper: WorkerId, capacity: usize, timeout: Option<Duration>) -> (Self, Self) {
        let lower = WorkerId(upper.0 + 1);
        let (down_tx, down_rx) = bounded(capacity);
        let (up_tx, up_rx) = bounded(capacity);
        let upper_side = Self {
            me: upper,
            peer: lower,
            outgoing: Direction::Down,
            tx: down_tx,
            rx: up_rx,
            timeout,
        };
        let lower_side = Self {
            me: lower,
            peer: upper,
            outgoing: Direction::Up,
            tx: up_tx,
            rx: down_rx,
            timeout,
        };
        (upper_side, lower_side)
    }

    /// The worker holding this end.
    pub fn owner(&self) -> WorkerId {
        self.me
    }

    fn timeout_error(&self, after: Duration) -> ExchangeError {
        ExchangeError::Timeout {
            peer: self.peer,
            after,
        }
    }
}

impl HaloLink for ChannelLink {
    fn peer(&self) -> WorkerId {
        self.peer
    }

    fn outgoing(&self) -> Direction {
        self.outgoing
    }

    fn send_row(&self, row: &[f64]) -> Result<(), ExchangeError> {
        let msg = HaloMessage {
            from: self.me,
            direction: self.outgoing,
            row: row.to_vec(),
        };
        let disconnected = ExchangeError::Disconnected { peer: self.peer };
        match self.timeout {
            Some(after) => self.tx.send_timeout(msg, after).map_err(|e| match e {
                SendTimeoutError::Timeout(_) => self.timeout_error(after),
                SendTimeoutError::Disconnected(_) => disconnected,
            }),
            None => self.tx.send(msg).map_err(|_| disconnected),
        }
    }

    fn recv_row(&self, into: &mut [f64]) -> Result<(), ExchangeError> {
        let disconnected = ExchangeError::Disconnected { peer: self.peer };
        let msg = match self.timeout {
            Some(after) => self.rx.recv_timeout(after).map_err(|e| match e {
                RecvTimeoutError::Timeout => self.timeout_error(after),
                RecvTimeoutError::Disconnected => disconnected,
            })?,
            None => self.rx.recv().map_err(|_| disconnected)?,
        };
        accept_message(msg, self.peer, self.outgoing.opposite(), into)
    }
}

/// Links for every worker of a `workers`-long chain, indexed by rank.
///
/// # Errors
///
/// Returns `Err` if `workers` ranks do not fit in a [`WorkerId`].
pub fn channel_mesh(
    workers: usize,
    capacity: usize,
    timeout: Option<Duration>,
) -> Result<Vec<Neighbours<ChannelLink>>, ConfigError> {
    let mut mesh: Vec<Neighbours<ChannelLink>> = (0..workers).map(|_| Neighbours::none()).collect();
    for k in 1..workers {
        let upper = WorkerId::try_from(k - 1)
            .map_err(|_| ConfigError::WorkerCountOverflow { workers })?;
        let (upper_side, lower_side) = ChannelLink::pair(upper, capacity, timeout);
        mesh[k - 1].down = Some(upper_side);
        mesh[k].up = Some(lower_side);
    }
    Ok(mesh)
}
