//! Snapshot persistence for Ember workers.
//!
//! Every `snapshot_interval` iterations a worker hands a read-only
//! [`SnapshotView`] of its owned rows to its [`SnapshotWriter`]. Writers
//! never see halo rows and never share state across workers, except where
//! a writer explicitly opts in ([`MemoryWriter`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod memory;
pub mod queued;
pub mod text;
pub mod view;
pub mod writer;

pub use memory::MemoryWriter;
pub use queued::QueuedWriter;
pub use text::TextFileWriter;
pub use view::{OwnedSnapshot, SnapshotView};
pub use writer::{FailurePolicy, NullWriter, SnapshotWriter};
