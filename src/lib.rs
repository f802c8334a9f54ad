//! # modhost
//!
//! **modhost** is an application composition runtime for set-top-box
//! platforms: independently developed functional units ("modules") declare
//! typed dependencies on one another; the runtime topologically orders
//! them, asynchronously initializes them one at a time with per-module
//! timeout and progress reporting, and wires an inter-module
//! publish/subscribe event bus the modules use to communicate without
//! direct references.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//!     │    Module     │   │    Module     │   │    Module     │
//!     │ (identity +   │   │ (identity +   │   │ (identity +   │
//!     │ DependencySet)│   │ DependencySet)│   │ DependencySet)│
//!     └──────┬────────┘   └──────┬────────┘   └──────┬────────┘
//!            ▼                   ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Runtime (explicit context object)                                │
//! │  - Registry (declare-and-wire, factories, override instances)     │
//! │  - resolve() (dependency order + priority insertion)              │
//! │  - Sequencer (one-at-a-time async init, timeout, progress)        │
//! │  - platform EventBus + per-category Preferences                   │
//! └──────────────┬───────────────────────────────┬────────────────────┘
//!                ▼                               ▼
//!     ┌─────────────────────┐        ┌─────────────────────────┐
//!     │ platform EventBus   │        │ per-module EventBus(es)  │
//!     │ ON_LOADING_PROGRESS │        │ module-defined signals   │
//!     │ ON_READY / ON_KEY_* │        └─────────────────────────┘
//!     └─────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! Runtime::builder(cfg).with_factory(table).build()
//!   ├─► declare(identity)            (recursively declares dependencies)
//!   ├─► run().await
//!   │     ├─► resolve()              (every module after its dependencies)
//!   │     └─► for each module:
//!   │           arm timeout ─► module.init(InitHandle)
//!   │             ├─ progress(f) ─► ON_LOADING_PROGRESS (total = (i+f)/n)
//!   │             ├─ done(Ok)    ─► advance to the next module
//!   │             ├─ done(Err)   ─► stop, Err(InitFailed)
//!   │             └─ timeout     ─► stop, Err(TimedOut)
//!   │     └─► after the last module: ON_READY, Ok(())
//!   └─► shutdown()
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Modules**       | Typed identity, declared dependencies, async init.        | [`Module`], [`ModuleFn`], [`ModuleId`]      |
//! | **Registry**      | Idempotent declare-and-wire with pluggable factories.     | [`Registry`], [`FactoryTable`]              |
//! | **Resolution**    | Dependency order with priority insertion.                 | [`resolve`], [`ResolvedOrder`]              |
//! | **Sequencing**    | One-at-a-time init, timeout, aggregated progress.         | [`Sequencer`], [`InitHandle`]               |
//! | **Notifications** | Coalescing, reentrancy-safe publish/subscribe.            | [`EventBus`], [`BusListener`], [`Signal`]   |
//! | **Visibility**    | Subscriptions active only while a module is shown.        | [`SubscriptionScope`], [`RegistrationSet`]  |
//! | **Preferences**   | `has`/`get`/`put` seam per category plus global.          | [`Preferences`], [`MemoryPrefs`]            |
//! | **Errors**        | Checked declare/run failures; loud panics for corruption. | [`DeclareError`], [`RunError`]              |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] bus listener
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use modhost::{Config, DependencySet, FactoryTable, InitHandle, ModuleFn, ModuleId, Runtime};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut table = FactoryTable::new();
//!     table.register(ModuleId::component("network"), |_rt| {
//!         ModuleFn::arc(
//!             ModuleId::component("network"),
//!             DependencySet::new(),
//!             |ctx: InitHandle| async move { ctx.ok() },
//!         )
//!     });
//!     table.register(ModuleId::component("epg"), |_rt| {
//!         ModuleFn::arc(
//!             ModuleId::component("epg"),
//!             DependencySet::new().with_component("network"),
//!             |ctx: InitHandle| async move {
//!                 ctx.progress(0.5);
//!                 ctx.ok();
//!             },
//!         )
//!     });
//!
//!     let rt = Runtime::builder(Config::default()).with_factory(table).build();
//!
//!     // Declaring "epg" pulls "network" in through its dependency set.
//!     rt.declare(&ModuleId::component("epg"))?;
//!
//!     // network initializes before epg; ON_READY goes out at the end.
//!     rt.run().await?;
//!
//!     rt.shutdown();
//!     Ok(())
//! }
//! ```

mod bus;
mod config;
mod error;
mod modules;
mod prefs;
mod registry;
mod runtime;
mod sequencer;

// ---- Public re-exports ----

pub use bus::{
    allocate, name_of, BusListener, EventBus, HideMode, KeyEvent, RegistrationSet, ShowMode,
    Signal, SignalId, SubscriptionScope,
};
pub use config::Config;
pub use error::{DeclareError, RunError};
pub use modules::{DependencySet, Module, ModuleFn, ModuleId, ModuleKind, ModuleRef};
pub use prefs::{MemoryPrefs, Preferences, PrefsRef};
pub use registry::{resolve, FactoryRef, FactoryTable, ModuleFactory, Registry, ResolvedOrder};
pub use runtime::{signals, Runtime, RuntimeBuilder};
pub use sequencer::{InitFailure, InitHandle, Sequencer};

// Optional: expose the simple built-in logging listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use bus::LogWriter;
