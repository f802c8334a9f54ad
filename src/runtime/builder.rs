//! # Runtime construction.
//!
//! [`RuntimeBuilder`] assembles the explicitly constructed runtime context:
//! configuration, factories, and preference stores. `build()` wires the
//! platform bus (spawning its dispatcher) and must therefore run inside a
//! Tokio runtime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::bus::EventBus;
use crate::config::Config;
use crate::modules::ModuleKind;
use crate::prefs::{MemoryPrefs, PrefsRef};
use crate::registry::{FactoryRef, FactoryTable, ModuleFactory, Registry};
use crate::runtime::runtime::Runtime;

/// Builder for constructing a [`Runtime`].
pub struct RuntimeBuilder {
    cfg: Config,
    factory: Option<FactoryRef>,
    fallback: Option<FactoryRef>,
    global_prefs: Option<PrefsRef>,
    category_prefs: HashMap<ModuleKind, PrefsRef>,
}

fn memory() -> PrefsRef {
    Arc::new(MemoryPrefs::new())
}

impl RuntimeBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            factory: None,
            fallback: None,
            global_prefs: None,
            category_prefs: HashMap::new(),
        }
    }

    /// Sets the default module factory.
    ///
    /// Without one, only pre-registered instances and the fallback factory
    /// can satisfy declarations.
    pub fn with_factory(mut self, factory: impl ModuleFactory) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Sets the fallback factory, tried when the default factory has no
    /// mapping for an identity.
    pub fn with_fallback_factory(mut self, factory: impl ModuleFactory) -> Self {
        self.fallback = Some(Arc::new(factory));
        self
    }

    /// Replaces the global preference store (default: in-memory).
    pub fn with_global_prefs(mut self, prefs: PrefsRef) -> Self {
        self.global_prefs = Some(prefs);
        self
    }

    /// Replaces the preference store of one module category
    /// (default: in-memory).
    pub fn with_prefs(mut self, kind: ModuleKind, prefs: PrefsRef) -> Self {
        self.category_prefs.insert(kind, prefs);
        self
    }

    /// Builds the runtime context.
    ///
    /// Spawns the platform bus dispatcher; must be called from within a
    /// Tokio runtime.
    pub fn build(self) -> Arc<Runtime> {
        let token = CancellationToken::new();
        let platform = EventBus::scoped(self.cfg.platform_bus_name.clone(), token.child_token());

        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(FactoryTable::new()));
        let registry = Registry::new(factory, self.fallback);

        let mut category_prefs = self.category_prefs;
        for kind in [
            ModuleKind::Component,
            ModuleKind::Scheduler,
            ModuleKind::State,
            ModuleKind::Special,
        ] {
            category_prefs.entry(kind).or_insert_with(memory);
        }

        Arc::new(Runtime::new_internal(
            self.cfg,
            registry,
            platform,
            self.global_prefs.unwrap_or_else(memory),
            category_prefs,
            token,
        ))
    }
}
