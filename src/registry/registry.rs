//! # Module registry: the live collection plus declare-and-wire.
//!
//! [`Registry::declare`] is the single entry point for bringing a module to
//! life: it either returns the existing instance (idempotent) or constructs
//! a new one and recursively declares everything in its dependency set
//! before adding it to the live collection.
//!
//! ## Construction sources, in consulting order
//! 1. pre-registered concrete instances ([`Registry::register_instance`])
//! 2. the default factory
//! 3. the optional fallback factory
//!
//! ## Rules
//! - Declaration order is preserved: dependencies enter the collection
//!   before their dependents, and the resolver uses that order as the
//!   stable tie-break.
//! - A module is added only **after** all its dependencies are declared.
//! - Self-dependency and declared cycles are detected via the in-flight
//!   declaration stack and panic with the cycle path.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::DeclareError;
use crate::modules::{ModuleId, ModuleRef};
use crate::registry::factory::FactoryRef;
use crate::runtime::Runtime;

#[derive(Default)]
struct RegistryState {
    /// Live modules in declaration order.
    modules: Vec<ModuleRef>,
    /// Identity → position in `modules`.
    by_id: HashMap<ModuleId, usize>,
    /// Pre-registered concrete instances, consulted before the factories.
    overrides: HashMap<ModuleId, ModuleRef>,
    /// In-flight declaration stack (cycle detection).
    declaring: Vec<ModuleId>,
}

/// The live collection of instantiated modules plus lazy declare-and-wire.
pub struct Registry {
    factory: FactoryRef,
    fallback: Option<FactoryRef>,
    state: Mutex<RegistryState>,
}

impl Registry {
    /// Creates an empty registry constructing through `factory`, with an
    /// optional `fallback` consulted when the factory has no mapping.
    pub fn new(factory: FactoryRef, fallback: Option<FactoryRef>) -> Self {
        Self {
            factory,
            fallback,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Pre-registers a concrete instance for its own identity.
    ///
    /// Consulted before the factories, letting a deployment swap the
    /// implementation behind an identity without changing declaration call
    /// sites. The instance only joins the live collection once declared.
    pub fn register_instance(&self, module: ModuleRef) {
        let id = module.identity();
        self.state().overrides.insert(id, module);
    }

    /// Returns the already-declared module for `id`, if any.
    pub fn get(&self, id: &ModuleId) -> Option<ModuleRef> {
        let st = self.state();
        st.by_id.get(id).map(|&i| st.modules[i].clone())
    }

    /// Returns true if `id` has been declared.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.state().by_id.contains_key(id)
    }

    /// Number of declared modules.
    pub fn len(&self) -> usize {
        self.state().modules.len()
    }

    /// Returns true if nothing has been declared.
    pub fn is_empty(&self) -> bool {
        self.state().modules.is_empty()
    }

    /// Snapshot of the live collection, in declaration order.
    pub fn modules(&self) -> Vec<ModuleRef> {
        self.state().modules.clone()
    }

    /// Declares `id`: returns the existing instance unchanged, or
    /// constructs one and recursively declares its dependency set
    /// (Specials, Components, Schedulers, States, in that order).
    ///
    /// Fails with [`DeclareError::ModuleNotFound`] when no construction
    /// source has a mapping for a requested identity; the failure aborts
    /// the declaration of the module that required it.
    ///
    /// # Panics
    /// Panics when the declared dependency sets loop back into an identity
    /// whose declaration is still in flight (self-dependency included).
    pub fn declare(&self, id: &ModuleId, runtime: &Runtime) -> Result<ModuleRef, DeclareError> {
        {
            let mut st = self.state();
            if let Some(&pos) = st.by_id.get(id) {
                return Ok(st.modules[pos].clone());
            }
            if st.declaring.contains(id) {
                let path: Vec<String> = st
                    .declaring
                    .iter()
                    .chain(std::iter::once(id))
                    .map(|m| m.to_string())
                    .collect();
                panic!("cyclic module declaration: {}", path.join(" -> "));
            }
            st.declaring.push(id.clone());
        }

        let result = self.construct_and_wire(id, runtime);

        let mut st = self.state();
        st.declaring.pop();
        if let Ok(module) = &result {
            let pos = st.modules.len();
            st.modules.push(module.clone());
            st.by_id.insert(id.clone(), pos);
        }
        result
    }

    /// Constructs the module for `id` and declares its dependencies.
    fn construct_and_wire(
        &self,
        id: &ModuleId,
        runtime: &Runtime,
    ) -> Result<ModuleRef, DeclareError> {
        let module = self
            .instantiate(id, runtime)
            .ok_or_else(|| DeclareError::ModuleNotFound { id: id.clone() })?;

        let identity = module.identity();
        if identity != *id {
            panic!("factory produced module '{identity}' when asked for '{id}'");
        }
        if module.dependencies().contains(id) {
            panic!("module '{id}' declares itself as a dependency");
        }

        for dep in module.dependencies().iter() {
            self.declare(dep, runtime)?;
        }
        Ok(module)
    }

    fn instantiate(&self, id: &ModuleId, runtime: &Runtime) -> Option<ModuleRef> {
        if let Some(instance) = self.state().overrides.get(id).cloned() {
            return Some(instance);
        }
        // Lock released above: factories may themselves declare.
        self.factory
            .create(id, runtime)
            .or_else(|| self.fallback.as_ref()?.create(id, runtime))
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
