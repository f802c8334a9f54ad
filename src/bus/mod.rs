//! # Publish/subscribe notifications: ids, signals, and the bus.
//!
//! This module groups the notification **data model** and the **bus** used
//! by modules to communicate without direct references.
//!
//! ## Contents
//! - [`SignalId`], [`allocate`], [`name_of`] - process-wide id allocation
//! - [`Signal`], [`KeyEvent`] - notification payloads
//! - [`EventBus`], [`BusListener`] - per-scope bus with coalescing and
//!   mutation-during-dispatch safety
//! - [`RegistrationSet`] - one listener across several buses, released in
//!   one call
//! - [`SubscriptionScope`] - subscriptions active only while a module is
//!   shown
//!
//! ## Quick reference
//! - **Publishers**: the sequencer (loading/ready notices), the runtime
//!   (key pass-through), and every module (its own signals).
//! - **Consumers**: host listeners on the platform bus, modules on each
//!   other's private buses.

#[allow(clippy::module_inception)]
mod bus;
mod ids;
#[cfg(feature = "logging")]
mod log;
mod registration;
mod scope;
mod signal;

pub use bus::{BusListener, EventBus};
pub use ids::{allocate, name_of, SignalId};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use registration::RegistrationSet;
pub use scope::{HideMode, ShowMode, SubscriptionScope};
pub use signal::{KeyEvent, Signal};
