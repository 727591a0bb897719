//! Test utilities and fault-injecting fixtures for Ember development.
//!
//! - [`links`]: [`FailingLink`] and [`ScriptedLink`] transports.
//! - [`writers`]: [`FailingWriter`] snapshot destination.
//! - [`fields`]: deterministic initial conditions that do not depend on
//!   the decomposition.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fields;
pub mod links;
pub mod writers;

pub use links::{inject_failure, FailingLink, ScriptedLink};
pub use writers::FailingWriter;
