//! # Declared module dependencies.
//!
//! A [`DependencySet`] is built once at module construction time and is
//! immutable thereafter. It is consumed by the
//! [`Registry`](crate::Registry)'s recursive declaration step and by the
//! [resolver](crate::resolve).
//!
//! ## Rules
//! - Four collections, one per category (plus Specials by type).
//! - Declaration walks the set in the order: Specials, Components,
//!   Schedulers, States.
//! - A set must never include the owning module's own identity; the registry
//!   rejects self-dependency at declaration time.

use crate::modules::identity::ModuleId;

/// Categorized set of module identities a module requires to be initialized
/// before itself.
///
/// ## Example
/// ```
/// use modhost::{DependencySet, ModuleId};
///
/// struct Licensing;
///
/// let deps = DependencySet::new()
///     .with_special::<Licensing>()
///     .with_component("network")
///     .with_component("epg")
///     .with_scheduler("recordings");
///
/// assert_eq!(deps.len(), 4);
/// assert!(deps.contains(&ModuleId::component("epg")));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DependencySet {
    specials: Vec<ModuleId>,
    components: Vec<ModuleId>,
    schedulers: Vec<ModuleId>,
    states: Vec<ModuleId>,
}

impl DependencySet {
    /// Creates an empty set (a module with no dependencies).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a required Component.
    pub fn with_component(mut self, name: impl Into<std::sync::Arc<str>>) -> Self {
        self.components.push(ModuleId::component(name));
        self
    }

    /// Adds a required Scheduler.
    pub fn with_scheduler(mut self, name: impl Into<std::sync::Arc<str>>) -> Self {
        self.schedulers.push(ModuleId::scheduler(name));
        self
    }

    /// Adds a required State.
    pub fn with_state(mut self, name: impl Into<std::sync::Arc<str>>) -> Self {
        self.states.push(ModuleId::state(name));
        self
    }

    /// Adds a required Special, keyed by `T`.
    pub fn with_special<T: 'static>(mut self) -> Self {
        self.specials.push(ModuleId::special::<T>());
        self
    }

    /// Iterates every required identity in declaration order:
    /// Specials, Components, Schedulers, States.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleId> {
        self.specials
            .iter()
            .chain(self.components.iter())
            .chain(self.schedulers.iter())
            .chain(self.states.iter())
    }

    /// Returns true if `id` is required by this set.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.iter().any(|d| d == id)
    }

    /// Total number of required identities across all categories.
    pub fn len(&self) -> usize {
        self.specials.len() + self.components.len() + self.schedulers.len() + self.states.len()
    }

    /// Returns true if the module requires nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Widget;

    #[test]
    fn test_iteration_order_is_specials_components_schedulers_states() {
        let deps = DependencySet::new()
            .with_state("menu")
            .with_component("epg")
            .with_special::<Widget>()
            .with_scheduler("jobs");

        let kinds: Vec<_> = deps.iter().map(|d| d.kind()).collect();
        use crate::ModuleKind::*;
        assert_eq!(kinds, vec![Special, Component, Scheduler, State]);
    }

    #[test]
    fn test_contains_and_len() {
        let deps = DependencySet::new().with_component("a").with_component("b");
        assert_eq!(deps.len(), 2);
        assert!(deps.contains(&ModuleId::component("a")));
        assert!(!deps.contains(&ModuleId::scheduler("a")));
        assert!(!DependencySet::new().contains(&ModuleId::component("a")));
    }
}
