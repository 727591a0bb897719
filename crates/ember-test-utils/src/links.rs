//! Halo link fixtures.
//!
//! - [`FailingLink`]: wraps a real link and fails deterministically after
//!   N successful sends.
//! - [`ScriptedLink`]: replays pre-recorded incoming messages and records
//!   every outgoing row, for single-threaded protocol tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ember_core::{Direction, ExchangeError, WorkerId};
use ember_exchange::{accept_message, HaloLink, HaloMessage, Neighbours};

/// Wraps a link and fails every send after `succeed_count` successes.
///
/// The injected error defaults to a zero-length timeout, which is never
/// classified as a cascade.
pub struct FailingLink<L> {
    inner: L,
    succeed_count: usize,
    error: ExchangeError,
    sends: AtomicUsize,
}

impl<L: HaloLink> FailingLink<L> {
    /// Fail after `succeed_count` sends.
    pub fn new(inner: L, succeed_count: usize) -> Self {
        let error = ExchangeError::Timeout {
            peer: inner.peer(),
            after: Duration::ZERO,
        };
        Self {
            inner,
            succeed_count,
            error,
            sends: AtomicUsize::new(0),
        }
    }

    /// Never fail.
    pub fn healthy(inner: L) -> Self {
        Self::new(inner, usize::MAX)
    }

    /// Inject `error` instead of the default timeout.
    pub fn with_error(mut self, error: ExchangeError) -> Self {
        self.error = error;
        self
    }

    /// How many times `send_row()` has been called.
    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::Relaxed)
    }
}

impl<L: HaloLink> HaloLink for FailingLink<L> {
    fn peer(&self) -> WorkerId {
        self.inner.peer()
    }

    fn outgoing(&self) -> Direction {
        self.inner.outgoing()
    }

    fn send_row(&self, row: &[f64]) -> Result<(), ExchangeError> {
        let n = self.sends.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(self.error.clone());
        }
        self.inner.send_row(row)
    }

    fn recv_row(&self, into: &mut [f64]) -> Result<(), ExchangeError> {
        self.inner.recv_row(into)
    }
}

/// Wrap every link of `neighbours`; the links of `failing` fail after
/// `succeed_count` sends, every other link is healthy.
pub fn inject_failure<L: HaloLink>(
    mesh: Vec<Neighbours<L>>,
    failing: WorkerId,
    succeed_count: usize,
) -> Vec<Neighbours<FailingLink<L>>> {
    mesh.into_iter()
        .enumerate()
        .map(|(k, n)| {
            let budget = if k == failing.index() {
                succeed_count
            } else {
                usize::MAX
            };
            Neighbours {
                up: n.up.map(|l| FailingLink::new(l, budget)),
                down: n.down.map(|l| FailingLink::new(l, budget)),
            }
        })
        .collect()
}

#[derive(Default)]
struct Script {
    incoming: VecDeque<HaloMessage>,
    sent: Vec<Vec<f64>>,
}

/// Single-threaded link that replays a script.
///
/// Clones share the same script, so a test can keep one handle while the
/// code under test owns another. An exhausted script reads as a
/// disconnected peer.
#[derive(Clone)]
pub struct ScriptedLink {
    peer: WorkerId,
    outgoing: Direction,
    script: Arc<Mutex<Script>>,
}

impl ScriptedLink {
    /// Link to `peer`, sending in direction `outgoing`.
    pub fn new(peer: WorkerId, outgoing: Direction) -> Self {
        Self {
            peer,
            outgoing,
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    /// Queue a well-formed row from the peer.
    pub fn push_row(&self, row: Vec<f64>) {
        let msg = HaloMessage {
            from: self.peer,
            direction: self.outgoing.opposite(),
            row,
        };
        self.push_message(msg);
    }

    /// Queue an arbitrary message, possibly malformed.
    pub fn push_message(&self, msg: HaloMessage) {
        self.script.lock().unwrap().incoming.push_back(msg);
    }

    /// Every row sent so far.
    pub fn sent(&self) -> Vec<Vec<f64>> {
        self.script.lock().unwrap().sent.clone()
    }

    /// Queued messages not yet received.
    pub fn pending(&self) -> usize {
        self.script.lock().unwrap().incoming.len()
    }
}

impl HaloLink for ScriptedLink {
    fn peer(&self) -> WorkerId {
        self.peer
    }

    fn outgoing(&self) -> Direction {
        self.outgoing
    }

    fn send_row(&self, row: &[f64]) -> Result<(), ExchangeError> {
        self.script.lock().unwrap().sent.push(row.to_vec());
        Ok(())
    }

    fn recv_row(&self, into: &mut [f64]) -> Result<(), ExchangeError> {
        let msg = self.script.lock().unwrap().incoming.pop_front();
        match msg {
            Some(msg) => accept_message(msg, self.peer, self.outgoing.opposite(), into),
            None => Err(ExchangeError::Disconnected { peer: self.peer }),
        }
    }
}
