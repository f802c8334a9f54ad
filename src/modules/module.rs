//! # Module contract.
//!
//! This module defines the [`Module`] trait: the contract every feature
//! module implements towards the runtime. The common handle type is
//! [`ModuleRef`], an `Arc<dyn Module>` suitable for sharing across the
//! runtime.
//!
//! A module:
//! - exposes an immutable typed [`identity`](Module::identity);
//! - declares its [`dependencies`](Module::dependencies) once, at
//!   construction time;
//! - exposes a private [`EventBus`](crate::EventBus) for its own
//!   notifications;
//! - initializes asynchronously through [`init`](Module::init), reporting
//!   progress and completion through the provided [`InitHandle`].
//!
//! ## Completion discipline
//! A module must report completion **exactly once** per initialization run.
//! Work may be handed to worker threads; results are marshaled back through
//! the (cloneable, `Send`) handle rather than by touching core state.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::EventBus;
use crate::modules::deps::DependencySet;
use crate::modules::identity::ModuleId;
use crate::sequencer::InitHandle;

/// Shared reference to a module (`Arc<dyn Module>`).
pub type ModuleRef = Arc<dyn Module>;

/// # Contract implemented by every feature module.
///
/// The runtime only ever sees modules through this trait: it declares them
/// by identity, orders them by their dependency sets, and initializes them
/// one at a time.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use modhost::{DependencySet, EventBus, InitHandle, Module, ModuleId};
///
/// struct Epg {
///     deps: DependencySet,
///     bus: EventBus,
/// }
///
/// impl Epg {
///     fn new() -> Self {
///         Self {
///             deps: DependencySet::new().with_component("network"),
///             bus: EventBus::new("epg"),
///         }
///     }
/// }
///
/// #[async_trait]
/// impl Module for Epg {
///     fn identity(&self) -> ModuleId {
///         ModuleId::component("epg")
///     }
///
///     fn dependencies(&self) -> &DependencySet {
///         &self.deps
///     }
///
///     fn bus(&self) -> &EventBus {
///         &self.bus
///     }
///
///     async fn init(&self, ctx: InitHandle) {
///         // load data, report fractional progress...
///         ctx.progress(0.5);
///         // ...then complete exactly once.
///         ctx.ok();
///     }
/// }
/// ```
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Returns the module's immutable identity.
    fn identity(&self) -> ModuleId;

    /// Returns the dependency set declared at construction time.
    fn dependencies(&self) -> &DependencySet;

    /// Whether this module is pulled forward in the resolved order.
    ///
    /// A priority module is placed immediately after its own resolved
    /// dependencies instead of at the tail of the current resolution pass.
    fn priority(&self) -> bool {
        false
    }

    /// Returns the module's private notification bus.
    fn bus(&self) -> &EventBus;

    /// Initializes the module.
    ///
    /// The returned future may complete before or after the module reports
    /// completion; the sequencer only advances on
    /// [`InitHandle::done`] (or its shorthands). Long-running work should be
    /// spawned and must report back through `ctx`, which is cloneable and
    /// `Send`.
    async fn init(&self, ctx: InitHandle);
}

impl fmt::Debug for dyn Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("identity", &self.identity())
            .finish()
    }
}
