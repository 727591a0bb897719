//! The transport seam between two neighbouring workers.

use ember_core::{Direction, ExchangeError, WorkerId};

/// One halo row in flight.
///
/// The only header is addressing: who sent it and which way it travels.
/// The payload is exactly one row of the global domain.
#[derive(Clone, Debug, PartialEq)]
pub struct HaloMessage {
    /// Sending worker.
    pub from: WorkerId,
    /// Direction of travel.
    pub direction: Direction,
    /// Row values, one per column.
    pub row: Vec<f64>,
}

/// A bidirectional point-to-point link to one neighbour.
///
/// Implementations must keep the two directions separate, so a row sent
/// by this side is never delivered back to it.
pub trait HaloLink: Send {
    /// The worker on the other end.
    fn peer(&self) -> WorkerId;

    /// Direction rows travel when sent on this link.
    fn outgoing(&self) -> Direction;

    /// Send one row to the peer.
    fn send_row(&self, row: &[f64]) -> Result<(), ExchangeError>;

    /// Receive one row from the peer into `into`.
    ///
    /// Fails if the payload length differs from `into.len()`.
    fn recv_row(&self, into: &mut [f64]) -> Result<(), ExchangeError>;
}

/// Validate an incoming message against what the receiving link expects
/// and copy its payload into `into`.
pub fn accept_message(
    msg: HaloMessage,
    peer: WorkerId,
    expected: Direction,
    into: &mut [f64],
) -> Result<(), ExchangeError> {
    if msg.from != peer {
        return Err(ExchangeError::UnexpectedSender {
            expected: peer,
            actual: msg.from,
        });
    }
    if msg.direction != expected {
        return Err(ExchangeError::UnexpectedDirection {
            peer,
            expected,
            actual: msg.direction,
        });
    }
    if msg.row.len() != into.len() {
        return Err(ExchangeError::PayloadSize {
            peer,
            expected: into.len(),
            actual: msg.row.len(),
        });
    }
    into.copy_from_slice(&msg.row);
    Ok(())
}

/// The links of one worker: at most one upward and one downward.
#[derive(Debug)]
pub struct Neighbours<L> {
    /// Link to the worker above (rank - 1).
    pub up: Option<L>,
    /// Link to the worker below (rank + 1).
    pub down: Option<L>,
}

impl<L> Neighbours<L> {
    /// No neighbours: a single-worker run.
    pub fn none() -> Self {
        Self {
            up: None,
            down: None,
        }
    }

    /// Number of existing links.
    pub fn count(&self) -> usize {
        usize::from(self.up.is_some()) + usize::from(self.down.is_some())
    }

    /// The link a row travelling `direction` leaves on.
    pub fn get(&self, direction: Direction) -> Option<&L> {
        match direction {
            Direction::Up => self.up.as_ref(),
            Direction::Down => self.down.as_ref(),
        }
    }
}

impl<L> Default for Neighbours<L> {
    fn default() -> Self {
        Self::none()
    }
}
