//! Halo exchange between vertically adjacent Ember workers.
//!
//! - [`HaloLink`]: transport trait for one neighbour link.
//! - [`ChannelLink`] / [`channel_mesh`]: crossbeam-channel transport for
//!   workers running as threads of one process.
//! - [`HaloExchange`]: refreshes a [`LocalGrid`](ember_grid::LocalGrid)'s
//!   halo rows under a deadlock-free [`ExchangeSchedule`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod channel;
pub mod link;
pub mod protocol;

pub use channel::{channel_mesh, ChannelLink};
pub use link::{accept_message, HaloLink, HaloMessage, Neighbours};
pub use protocol::{ExchangeSchedule, ExchangeStats, HaloExchange};
