//! # Sequential asynchronous initialization.
//!
//! This module contains the initialization state machine:
//! - [`Sequencer`] - drives a resolved order one module at a time with
//!   per-module timeout and aggregated progress reporting
//! - [`InitHandle`] - the completion interface a module reports through
//! - [`InitFailure`] - the failure payload of an unsuccessful completion

mod handle;
#[allow(clippy::module_inception)]
mod sequencer;

pub use handle::{InitFailure, InitHandle};
pub use sequencer::Sequencer;
