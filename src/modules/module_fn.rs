//! # Function-backed module (`ModuleFn`).
//!
//! [`ModuleFn`] wraps a closure `F: Fn(InitHandle) -> Fut`, producing a
//! fresh initialization future per run. This avoids shared mutable state:
//! if state must be shared with worker tasks, move an explicit `Arc<...>`
//! into the closure.
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use modhost::{DependencySet, InitHandle, ModuleFn, ModuleId, ModuleRef};
//!
//! let m: ModuleRef = ModuleFn::arc(
//!     ModuleId::component("network"),
//!     DependencySet::new(),
//!     |ctx: InitHandle| async move {
//!         ctx.progress(0.5);
//!         ctx.ok();
//!     },
//! );
//! assert_eq!(m.identity(), ModuleId::component("network"));
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::EventBus;
use crate::modules::deps::DependencySet;
use crate::modules::identity::ModuleId;
use crate::modules::module::Module;
use crate::sequencer::InitHandle;

/// Function-backed module implementation.
///
/// Wraps a closure that *creates* a new initialization future per run, plus
/// the identity and dependency set the closure is registered under. Used by
/// tests and by simple modules that do not warrant a dedicated type.
pub struct ModuleFn<F> {
    id: ModuleId,
    deps: DependencySet,
    priority: bool,
    bus: EventBus,
    f: F,
}

impl<F> ModuleFn<F> {
    /// Creates a new function-backed module.
    ///
    /// The module's private bus is created here and named after the
    /// identity; must be called from within a Tokio runtime.
    ///
    /// Prefer [`ModuleFn::arc`] when you immediately need a
    /// [`ModuleRef`](crate::ModuleRef).
    pub fn new(id: ModuleId, deps: DependencySet, f: F) -> Self {
        let bus = EventBus::new(id.to_string());
        Self {
            id,
            deps,
            priority: false,
            bus,
            f,
        }
    }

    /// Creates the module and returns it as a shared handle.
    pub fn arc(id: ModuleId, deps: DependencySet, f: F) -> Arc<Self> {
        Arc::new(Self::new(id, deps, f))
    }

    /// Marks the module as priority (pulled forward in the resolved order).
    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }
}

#[async_trait]
impl<F, Fut> Module for ModuleFn<F>
where
    F: Fn(InitHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn identity(&self) -> ModuleId {
        self.id.clone()
    }

    fn dependencies(&self) -> &DependencySet {
        &self.deps
    }

    fn priority(&self) -> bool {
        self.priority
    }

    fn bus(&self) -> &EventBus {
        &self.bus
    }

    async fn init(&self, ctx: InitHandle) {
        (self.f)(ctx).await;
    }
}
