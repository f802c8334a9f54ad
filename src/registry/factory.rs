//! # Pluggable module construction.
//!
//! Modules are constructed by a [`ModuleFactory`]; the standard
//! implementation is [`FactoryTable`], an explicit table mapping a
//! [`ModuleId`] to a constructor closure registered at process start. The
//! "declare by identity or by type" duality needs no runtime type
//! introspection: a `Special` identity is just another table key.
//!
//! A deployment can swap the implementation behind an identity without
//! changing declaration call sites by pre-registering a concrete instance
//! on the [`Registry`](crate::Registry), or by configuring a fallback
//! factory consulted when the default has no mapping.

use std::collections::HashMap;
use std::sync::Arc;

use crate::modules::{ModuleId, ModuleRef};
use crate::runtime::Runtime;

/// Shared reference to a module factory.
pub type FactoryRef = Arc<dyn ModuleFactory>;

/// # Constructs modules by identity.
///
/// The runtime context is passed in so constructors can clone out what
/// their module needs (platform bus handle, preference stores) without any
/// global access point.
pub trait ModuleFactory: Send + Sync + 'static {
    /// Constructs the module for `id`, or `None` if this factory has no
    /// mapping for it.
    fn create(&self, id: &ModuleId, runtime: &Runtime) -> Option<ModuleRef>;
}

type Ctor = Box<dyn Fn(&Runtime) -> ModuleRef + Send + Sync>;

/// Explicit identity → constructor table.
///
/// ## Example
/// ```no_run
/// use modhost::{DependencySet, FactoryTable, InitHandle, ModuleFn, ModuleId};
///
/// let mut table = FactoryTable::new();
/// table.register(ModuleId::component("network"), |_rt| {
///     ModuleFn::arc(
///         ModuleId::component("network"),
///         DependencySet::new(),
///         |ctx: InitHandle| async move { ctx.ok() },
///     )
/// });
/// ```
#[derive(Default)]
pub struct FactoryTable {
    ctors: HashMap<ModuleId, Ctor>,
}

impl FactoryTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the constructor for `id`, replacing any previous one.
    pub fn register<F>(&mut self, id: ModuleId, ctor: F)
    where
        F: Fn(&Runtime) -> ModuleRef + Send + Sync + 'static,
    {
        self.ctors.insert(id, Box::new(ctor));
    }

    /// Builder-style [`register`](Self::register).
    pub fn with<F>(mut self, id: ModuleId, ctor: F) -> Self
    where
        F: Fn(&Runtime) -> ModuleRef + Send + Sync + 'static,
    {
        self.register(id, ctor);
        self
    }

    /// Returns true if a constructor is registered for `id`.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.ctors.contains_key(id)
    }

    /// Number of registered constructors.
    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    /// Returns true if no constructor is registered.
    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }
}

impl ModuleFactory for FactoryTable {
    fn create(&self, id: &ModuleId, runtime: &Runtime) -> Option<ModuleRef> {
        self.ctors.get(id).map(|ctor| ctor(runtime))
    }
}
