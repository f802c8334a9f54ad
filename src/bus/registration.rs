//! # Bulk listener registration across buses.
//!
//! [`RegistrationSet`] registers one listener for ids on several independent
//! buses and releases every registration in a single call (scope-style
//! cleanup). Modules use it to wire themselves to the platform bus plus the
//! private buses of the modules they collaborate with, and to detach from
//! all of them at teardown.

use std::sync::Arc;

use crate::bus::bus::{BusListener, EventBus};
use crate::bus::ids::SignalId;

/// One listener attached to ids across several buses, detachable in one
/// call (and on drop).
pub struct RegistrationSet {
    listener: Arc<dyn BusListener>,
    entries: Vec<(EventBus, SignalId)>,
}

impl RegistrationSet {
    /// Creates an empty set owning `listener`.
    pub fn new(listener: Arc<dyn BusListener>) -> Self {
        Self {
            listener,
            entries: Vec::new(),
        }
    }

    /// Registers the listener for `id` on `bus` and remembers the
    /// attachment.
    pub fn attach(&mut self, bus: &EventBus, id: SignalId) {
        bus.register(self.listener.clone(), id);
        self.entries.push((bus.clone(), id));
    }

    /// Number of live attachments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unregisters every attachment made through this set.
    pub fn release(&mut self) {
        for (bus, id) in self.entries.drain(..) {
            bus.unregister(self.listener.as_ref(), id);
        }
    }
}

impl Drop for RegistrationSet {
    fn drop(&mut self) {
        self.release();
    }
}
