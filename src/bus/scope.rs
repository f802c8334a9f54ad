//! # Lifecycle-scoped subscriptions.
//!
//! Visual/state modules only want their bus subscriptions live while they
//! are shown. A [`SubscriptionScope`] keeps the module's private list of
//! `(bus, id)` subscriptions separate from whether they are currently
//! registered on the bus:
//!
//! - [`subscribe`](SubscriptionScope::subscribe) appends to the list and
//!   registers immediately only while the scope is shown;
//! - [`show`](SubscriptionScope::show) registers everything, unless the
//!   show is merely an overlay being removed (registrations were kept);
//! - [`hide`](SubscriptionScope::hide) unregisters everything, unless the
//!   module is merely being covered by an overlay;
//! - the list entry itself is removed only by an explicit
//!   [`unsubscribe`](SubscriptionScope::unsubscribe).
//!
//! Duplicate subscribe, or unsubscribe without a prior subscribe, is a
//! fatal programming error: callers are expected to track their own
//! subscription state.

use std::sync::Arc;

use crate::bus::bus::{BusListener, EventBus};
use crate::bus::ids::SignalId;

/// How a module is being shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowMode {
    /// The module is actually appearing; pending subscriptions activate.
    Full,
    /// An overlay is being removed; registrations were never dropped and
    /// are left untouched.
    Uncover,
}

/// How a module is being hidden.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HideMode {
    /// The module is actually disappearing; subscriptions deactivate.
    Full,
    /// An overlay is covering the module; registrations stay active.
    Cover,
}

/// Subscription list of one visibility-scoped module.
pub struct SubscriptionScope {
    listener: Arc<dyn BusListener>,
    entries: Vec<(EventBus, SignalId)>,
    shown: bool,
}

impl SubscriptionScope {
    /// Creates a hidden scope for `listener`.
    pub fn new(listener: Arc<dyn BusListener>) -> Self {
        Self {
            listener,
            entries: Vec::new(),
            shown: false,
        }
    }

    /// Returns true while the scope is shown (subscriptions active).
    pub fn is_shown(&self) -> bool {
        self.shown
    }

    /// Number of subscriptions in the list (active or not).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no subscription was declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declares interest in `id` on `bus`.
    ///
    /// Registers immediately if the scope is shown; otherwise registration
    /// is deferred until [`show`](Self::show).
    ///
    /// # Panics
    /// Panics if the (bus, id) pair is already subscribed.
    pub fn subscribe(&mut self, bus: &EventBus, id: SignalId) {
        if self.position(bus, id).is_some() {
            panic!(
                "duplicate subscription to '{id}' on bus '{}' (callers must track their own subscriptions)",
                bus.name()
            );
        }
        if self.shown {
            bus.register(self.listener.clone(), id);
        }
        self.entries.push((bus.clone(), id));
    }

    /// Removes `id` on `bus` from the list, unregistering if active.
    ///
    /// # Panics
    /// Panics if the (bus, id) pair was never subscribed.
    pub fn unsubscribe(&mut self, bus: &EventBus, id: SignalId) {
        let Some(pos) = self.position(bus, id) else {
            panic!(
                "unsubscribe from '{id}' on bus '{}' without a prior subscribe",
                bus.name()
            );
        };
        let (bus, id) = self.entries.remove(pos);
        if self.shown {
            bus.unregister(self.listener.as_ref(), id);
        }
    }

    /// Activates the subscription list.
    ///
    /// [`ShowMode::Uncover`] is a no-op: the registrations survived the
    /// overlay. Showing an already-shown scope is a no-op as well.
    pub fn show(&mut self, mode: ShowMode) {
        if mode == ShowMode::Uncover || self.shown {
            return;
        }
        for (bus, id) in &self.entries {
            bus.register(self.listener.clone(), *id);
        }
        self.shown = true;
    }

    /// Deactivates the subscription list without forgetting it.
    ///
    /// [`HideMode::Cover`] is a no-op: an overlay on top does not detach
    /// the module.
    pub fn hide(&mut self, mode: HideMode) {
        if mode == HideMode::Cover || !self.shown {
            return;
        }
        for (bus, id) in &self.entries {
            bus.unregister(self.listener.as_ref(), *id);
        }
        self.shown = false;
    }

    fn position(&self, bus: &EventBus, id: SignalId) -> Option<usize> {
        self.entries
            .iter()
            .position(|(b, i)| *i == id && b.same(bus))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ids::allocate;
    use crate::bus::signal::Signal;
    use async_trait::async_trait;

    struct Sink;

    #[async_trait]
    impl BusListener for Sink {
        async fn on_signal(&self, _bus: &EventBus, _signal: &Signal) {}
    }

    fn scope() -> SubscriptionScope {
        SubscriptionScope::new(Arc::new(Sink))
    }

    #[tokio::test]
    async fn test_subscribe_while_hidden_defers_registration() {
        let bus = EventBus::new("screen");
        let id = allocate("ON_SCOPE_DEFER");
        let mut scope = scope();

        scope.subscribe(&bus, id);
        assert_eq!(bus.listener_count(id), 0, "hidden scope must not register");

        scope.show(ShowMode::Full);
        assert_eq!(bus.listener_count(id), 1);

        scope.hide(HideMode::Full);
        assert_eq!(bus.listener_count(id), 0);
        assert_eq!(scope.len(), 1, "hide keeps the subscription list");
    }

    #[tokio::test]
    async fn test_subscribe_while_shown_registers_immediately() {
        let bus = EventBus::new("screen");
        let id = allocate("ON_SCOPE_LIVE");
        let mut scope = scope();

        scope.show(ShowMode::Full);
        scope.subscribe(&bus, id);
        assert_eq!(bus.listener_count(id), 1);

        scope.unsubscribe(&bus, id);
        assert_eq!(bus.listener_count(id), 0);
        assert!(scope.is_empty());
    }

    #[tokio::test]
    async fn test_overlay_cover_and_uncover_keep_registrations() {
        let bus = EventBus::new("screen");
        let id = allocate("ON_SCOPE_OVERLAY");
        let mut scope = scope();
        scope.subscribe(&bus, id);
        scope.show(ShowMode::Full);

        scope.hide(HideMode::Cover);
        assert_eq!(bus.listener_count(id), 1, "cover must not unregister");

        scope.show(ShowMode::Uncover);
        assert_eq!(bus.listener_count(id), 1, "uncover must not double-register");
    }

    #[tokio::test]
    #[should_panic(expected = "duplicate subscription")]
    async fn test_duplicate_subscribe_panics() {
        let bus = EventBus::new("screen");
        let id = allocate("ON_SCOPE_DUP");
        let mut scope = scope();
        scope.subscribe(&bus, id);
        scope.subscribe(&bus, id);
    }

    #[tokio::test]
    #[should_panic(expected = "without a prior subscribe")]
    async fn test_unsubscribe_without_subscribe_panics() {
        let bus = EventBus::new("screen");
        let id = allocate("ON_SCOPE_MISSING");
        let mut scope = scope();
        scope.unsubscribe(&bus, id);
    }

    #[tokio::test]
    async fn test_same_id_on_two_buses_is_not_a_duplicate() {
        let bus_a = EventBus::new("a");
        let bus_b = EventBus::new("b");
        let id = allocate("ON_SCOPE_TWO_BUSES");
        let mut scope = scope();
        scope.subscribe(&bus_a, id);
        scope.subscribe(&bus_b, id);
        scope.show(ShowMode::Full);
        assert_eq!(bus_a.listener_count(id), 1);
        assert_eq!(bus_b.listener_count(id), 1);
    }
}
