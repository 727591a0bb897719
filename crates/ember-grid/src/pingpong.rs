//! Double-buffered ping-pong grid pair.
//!
//! [`BufferPair`] holds two [`LocalGrid`]s of identical shape that
//! alternate between "current" (read this iteration) and "next" (written
//! this iteration). The lifecycle per iteration is:
//! 1. halo exchange writes the halo rows of `current_mut()`
//! 2. `split()` lends `current` immutably and `next` mutably to the sweep
//! 3. `swap()` makes `next` the new `current`, without copying

use std::mem;

use crate::local::LocalGrid;

/// Two equally shaped grids that swap roles every iteration.
///
/// Both buffers start from the same contents, so every cell the sweep
/// never writes (edge columns, fixed boundary rows, outward halos) holds
/// the same value in both and stays fixed across swaps.
#[derive(Clone, Debug)]
pub struct BufferPair {
    current: LocalGrid,
    next: LocalGrid,
    swaps: u64,
}

impl BufferPair {
    /// Pair whose buffers both start as copies of `initial`.
    pub fn new(initial: LocalGrid) -> Self {
        Self {
            next: initial.clone(),
            current: initial,
            swaps: 0,
        }
    }

    /// The buffer holding the latest completed state.
    pub fn current(&self) -> &LocalGrid {
        &self.current
    }

    /// Mutable access to `current`, for halo refresh.
    pub fn current_mut(&mut self) -> &mut LocalGrid {
        &mut self.current
    }

    /// Borrow `current` for reading and `next` for writing.
    pub fn split(&mut self) -> (&LocalGrid, &mut LocalGrid) {
        (&self.current, &mut self.next)
    }

    /// Exchange the roles of the two buffers.
    pub fn swap(&mut self) {
        mem::swap(&mut self.current, &mut self.next);
        self.swaps += 1;
    }

    /// Number of completed swaps.
    pub fn swaps(&self) -> u64 {
        self.swaps
    }

    /// Consume the pair, keeping the latest state.
    pub fn into_current(self) -> LocalGrid {
        self.current
    }
}
