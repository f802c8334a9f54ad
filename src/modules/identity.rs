//! # Typed module identity.
//!
//! Every module is addressed by a [`ModuleId`]: a (category, name) pair for
//! the enumerable categories (Component / Scheduler / State), or a
//! [`ModuleId::Special`] keyed by the concrete Rust type for one-off,
//! product-specific modules that have no enumerated name.
//!
//! Identity is immutable once a module instance exists and is the lookup key
//! in the [`Registry`](crate::Registry).

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

/// Category of a module identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ModuleKind {
    /// Functional building block (players, parsers, network adapters, ...).
    Component,
    /// Background scheduling unit (recordings, reminders, refresh jobs, ...).
    Scheduler,
    /// Screen/state unit participating in the visibility stack.
    State,
    /// Product-specific one-off module, keyed by its concrete type.
    Special,
}

/// Identity of a module: the registry lookup key.
///
/// The three enumerable categories carry an interned name; `Special`
/// identities are keyed by [`TypeId`] so a deployment can declare a one-off
/// module by type without any runtime type introspection.
///
/// ## Example
/// ```
/// use modhost::ModuleId;
///
/// struct CrashUploader;
///
/// let epg = ModuleId::component("epg");
/// let special = ModuleId::special::<CrashUploader>();
/// assert_ne!(epg, ModuleId::scheduler("epg"));
/// assert_eq!(special, ModuleId::special::<CrashUploader>());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ModuleId {
    /// Component identity, e.g. `component:player`.
    Component(Arc<str>),
    /// Scheduler identity, e.g. `scheduler:recordings`.
    Scheduler(Arc<str>),
    /// State identity, e.g. `state:main-menu`.
    State(Arc<str>),
    /// Special identity, keyed by concrete type.
    Special {
        /// Type key; two `Special` identities are equal iff their types are.
        type_id: TypeId,
        /// Captured type name, for display only.
        type_name: &'static str,
    },
}

impl ModuleId {
    /// Creates a Component identity.
    pub fn component(name: impl Into<Arc<str>>) -> Self {
        ModuleId::Component(name.into())
    }

    /// Creates a Scheduler identity.
    pub fn scheduler(name: impl Into<Arc<str>>) -> Self {
        ModuleId::Scheduler(name.into())
    }

    /// Creates a State identity.
    pub fn state(name: impl Into<Arc<str>>) -> Self {
        ModuleId::State(name.into())
    }

    /// Creates a Special identity keyed by `T`.
    pub fn special<T: 'static>() -> Self {
        ModuleId::Special {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the identity's category.
    pub fn kind(&self) -> ModuleKind {
        match self {
            ModuleId::Component(_) => ModuleKind::Component,
            ModuleId::Scheduler(_) => ModuleKind::Scheduler,
            ModuleId::State(_) => ModuleKind::State,
            ModuleId::Special { .. } => ModuleKind::Special,
        }
    }

    /// Returns the human-readable name part.
    ///
    /// For `Special` identities this is the captured type name (full path).
    pub fn name(&self) -> &str {
        match self {
            ModuleId::Component(n) | ModuleId::Scheduler(n) | ModuleId::State(n) => n,
            ModuleId::Special { type_name, .. } => type_name,
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleId::Component(n) => write!(f, "component:{n}"),
            ModuleId::Scheduler(n) => write!(f, "scheduler:{n}"),
            ModuleId::State(n) => write!(f, "state:{n}"),
            ModuleId::Special { type_name, .. } => {
                // Short type name reads better than the full path on a log line.
                let short = type_name.rsplit("::").next().unwrap_or(type_name);
                write!(f, "special:{short}")
            }
        }
    }
}
