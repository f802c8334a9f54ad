//! # Runtime context.
//!
//! [`Runtime`] is the explicitly constructed context object that replaces
//! any process-wide access point: it owns the registry, the platform bus,
//! the preference stores, and the teardown token, and it is passed by
//! reference to factories and module constructors at declaration time.
//!
//! ## Lifecycle
//! ```text
//! Runtime::builder(cfg) ... .build()      (init-on-startup)
//!   ├─► declare(identity) ...             (host and bulk declaration source)
//!   ├─► run().await                       (resolve fresh + sequence)
//!   │     └─► Ok: ready published; host may allow interaction
//!   └─► shutdown()                        (teardown-on-shutdown)
//! ```
//!
//! Until `run` returns `Ok`, the host must treat the system as not ready.

use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::bus::{EventBus, KeyEvent, Signal};
use crate::config::Config;
use crate::error::{DeclareError, RunError};
use crate::modules::{ModuleId, ModuleKind, ModuleRef};
use crate::prefs::PrefsRef;
use crate::registry::{resolve, Registry};
use crate::runtime::builder::RuntimeBuilder;
use crate::runtime::signals;
use crate::sequencer::Sequencer;

/// Explicitly constructed runtime context.
///
/// See the [module docs](self) for the lifecycle; see
/// [`RuntimeBuilder`] for construction.
pub struct Runtime {
    cfg: Config,
    registry: Registry,
    platform: EventBus,
    global_prefs: PrefsRef,
    category_prefs: HashMap<ModuleKind, PrefsRef>,
    token: CancellationToken,
}

impl Runtime {
    /// Starts building a runtime with the given configuration.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        registry: Registry,
        platform: EventBus,
        global_prefs: PrefsRef,
        category_prefs: HashMap<ModuleKind, PrefsRef>,
        token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            registry,
            platform,
            global_prefs,
            category_prefs,
            token,
        }
    }

    /// The runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The module registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The platform-wide notification bus.
    pub fn platform_bus(&self) -> &EventBus {
        &self.platform
    }

    /// Declares `id` (and, recursively, its dependency set) into the
    /// registry. Idempotent.
    pub fn declare(&self, id: &ModuleId) -> Result<ModuleRef, DeclareError> {
        self.registry.declare(id, self)
    }

    /// Declares every identity in `ids`, stopping at the first failure.
    pub fn declare_all(
        &self,
        ids: impl IntoIterator<Item = ModuleId>,
    ) -> Result<(), DeclareError> {
        for id in ids {
            self.declare(&id)?;
        }
        Ok(())
    }

    /// Creates a bus scoped to this runtime: its dispatcher stops at
    /// [`shutdown`](Self::shutdown). Modules create their private buses
    /// through this.
    pub fn create_bus(&self, name: impl Into<Arc<str>>) -> EventBus {
        EventBus::scoped(name, self.token.child_token())
    }

    /// The global preference store.
    pub fn global_prefs(&self) -> &PrefsRef {
        &self.global_prefs
    }

    /// The preference store of one module category.
    pub fn prefs(&self, kind: ModuleKind) -> &PrefsRef {
        &self.category_prefs[&kind]
    }

    /// Resolves a fresh initialization order over everything declared so
    /// far and drives it to completion.
    ///
    /// Declaring more modules afterwards and calling `run` again resolves
    /// a new order; declaring *during* a run is not supported.
    ///
    /// # Panics
    /// Panics when the declared dependency graph is unresolvable or a
    /// module completes twice (unrecoverable programming errors).
    pub async fn run(&self) -> Result<(), RunError> {
        let modules = self.registry.modules();
        let order = resolve(&modules);
        Sequencer::new(order, self.cfg.init_timeout_opt(), self.platform.clone())
            .run()
            .await
    }

    /// Routes a key press onto the platform bus.
    ///
    /// Which screen consumes it is the embedding application's business.
    pub fn key_pressed(&self, key: KeyEvent) {
        self.platform
            .trigger(Signal::new(signals::key_pressed()).with_key(key));
    }

    /// Routes a key release onto the platform bus.
    pub fn key_released(&self, key: KeyEvent) {
        self.platform
            .trigger(Signal::new(signals::key_released()).with_key(key));
    }

    /// Tears the runtime down: stops the platform bus dispatcher and every
    /// bus created through [`create_bus`](Self::create_bus).
    pub fn shutdown(&self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusListener, SignalId};
    use crate::modules::{DependencySet, ModuleFn};
    use crate::registry::FactoryTable;
    use crate::sequencer::InitHandle;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    /// Factory table for components that record their init order.
    fn recording_table(names: &[&'static str], log: Arc<Mutex<Vec<String>>>) -> FactoryTable {
        let mut table = FactoryTable::new();
        for &name in names {
            let log = log.clone();
            table.register(ModuleId::component(name), move |_rt| {
                let log = log.clone();
                ModuleFn::arc(
                    ModuleId::component(name),
                    DependencySet::new(),
                    move |ctx: InitHandle| {
                        let log = log.clone();
                        async move {
                            log.lock().unwrap().push(ctx.module().to_string());
                            ctx.ok();
                        }
                    },
                )
            });
        }
        table
    }

    fn noop_table(entries: &[(&'static str, DependencySet)]) -> FactoryTable {
        let mut table = FactoryTable::new();
        for (name, deps) in entries {
            let name = *name;
            let deps = deps.clone();
            table.register(ModuleId::component(name), move |_rt| {
                ModuleFn::arc(
                    ModuleId::component(name),
                    deps.clone(),
                    |ctx: InitHandle| async move { ctx.ok() },
                )
            });
        }
        table
    }

    #[tokio::test]
    async fn test_declare_is_idempotent() {
        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[("epg", DependencySet::new())]))
            .build();
        let id = ModuleId::component("epg");
        let first = rt.declare(&id).unwrap();
        let second = rt.declare(&id).unwrap();
        assert!(Arc::ptr_eq(&first, &second), "declare must return the same instance");
        assert_eq!(rt.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_declare_recursively_declares_dependencies_first() {
        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[
                ("network", DependencySet::new()),
                ("epg", DependencySet::new().with_component("network")),
            ]))
            .build();
        rt.declare(&ModuleId::component("epg")).unwrap();

        assert!(rt.registry().contains(&ModuleId::component("network")));
        let order: Vec<ModuleId> = rt.registry().modules().iter().map(|m| m.identity()).collect();
        assert_eq!(
            order,
            vec![ModuleId::component("network"), ModuleId::component("epg")],
            "dependencies must enter the collection before dependents"
        );
    }

    #[tokio::test]
    async fn test_unknown_identity_fails_with_module_not_found() {
        let rt = Runtime::builder(Config::default()).build();
        let err = rt.declare(&ModuleId::component("ghost")).unwrap_err();
        assert_eq!(err.as_label(), "module_not_found");
        assert!(rt.registry().is_empty());
    }

    #[tokio::test]
    async fn test_missing_dependency_aborts_the_requesting_declaration() {
        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[(
                "epg",
                DependencySet::new().with_component("never-mapped"),
            )]))
            .build();
        let err = rt.declare(&ModuleId::component("epg")).unwrap_err();
        assert!(matches!(err, DeclareError::ModuleNotFound { .. }));
        assert!(
            !rt.registry().contains(&ModuleId::component("epg")),
            "a module whose dependencies cannot be declared must not join the collection"
        );
    }

    #[tokio::test]
    async fn test_pre_registered_instance_wins_over_factory() {
        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[("player", DependencySet::new())]))
            .build();
        let replacement: ModuleRef = ModuleFn::arc(
            ModuleId::component("player"),
            DependencySet::new(),
            |ctx: InitHandle| async move { ctx.ok() },
        );
        rt.registry().register_instance(replacement.clone());

        let declared = rt.declare(&ModuleId::component("player")).unwrap();
        assert!(Arc::ptr_eq(&declared, &replacement));
    }

    #[tokio::test]
    async fn test_fallback_factory_is_tried_after_the_default() {
        let rt = Runtime::builder(Config::default())
            .with_factory(FactoryTable::new())
            .with_fallback_factory(noop_table(&[("extras", DependencySet::new())]))
            .build();
        rt.declare(&ModuleId::component("extras")).unwrap();
        assert!(rt.registry().contains(&ModuleId::component("extras")));
    }

    #[tokio::test]
    #[should_panic(expected = "cyclic module declaration")]
    async fn test_declared_cycle_panics_with_the_path() {
        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[
                ("d", DependencySet::new().with_component("e")),
                ("e", DependencySet::new().with_component("d")),
            ]))
            .build();
        let _ = rt.declare(&ModuleId::component("d"));
    }

    #[tokio::test]
    #[should_panic(expected = "declares itself")]
    async fn test_self_dependency_panics() {
        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[(
                "narcissus",
                DependencySet::new().with_component("narcissus"),
            )]))
            .build();
        let _ = rt.declare(&ModuleId::component("narcissus"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_initializes_in_declaration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rt = Runtime::builder(Config::default())
            .with_factory(recording_table(&["a", "b", "c"], log.clone()))
            .build();
        rt.declare_all([
            ModuleId::component("a"),
            ModuleId::component("b"),
            ModuleId::component("c"),
        ])
        .unwrap();

        rt.run().await.expect("run must succeed");
        assert_eq!(
            *log.lock().unwrap(),
            vec!["component:a", "component:b", "component:c"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_resolves_a_fresh_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let rt = Runtime::builder(Config::default())
            .with_factory(recording_table(&["a", "b"], log.clone()))
            .build();

        rt.declare(&ModuleId::component("a")).unwrap();
        rt.run().await.unwrap();
        rt.declare(&ModuleId::component("b")).unwrap();
        rt.run().await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["component:a", "component:a", "component:b"],
            "the second run must re-resolve over the grown collection"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_events_pass_through_the_platform_bus() {
        struct Recorder {
            tx: mpsc::UnboundedSender<Signal>,
        }

        #[async_trait]
        impl BusListener for Recorder {
            async fn on_signal(&self, _bus: &EventBus, signal: &Signal) {
                let _ = self.tx.send(signal.clone());
            }
        }

        let rt = Runtime::builder(Config::default()).build();
        let (tx, mut rx) = mpsc::unbounded_channel();
        rt.platform_bus()
            .register(Arc::new(Recorder { tx }), SignalId::ANY);

        let key = KeyEvent {
            key: 27,
            raw_code: 1043,
            consumed: false,
        };
        rt.key_pressed(key);
        sleep(Duration::from_millis(10)).await;
        rt.key_released(key);
        sleep(Duration::from_millis(10)).await;

        let first = rx.try_recv().expect("press must be delivered");
        assert_eq!(first.id, signals::key_pressed());
        assert_eq!(first.key, Some(key));
        let second = rx.try_recv().expect("release must be delivered");
        assert_eq!(second.id, signals::key_released());
    }

    #[tokio::test(start_paused = true)]
    async fn test_modules_communicate_through_private_buses() {
        struct Recorder {
            tx: mpsc::UnboundedSender<Signal>,
        }

        #[async_trait]
        impl BusListener for Recorder {
            async fn on_signal(&self, _bus: &EventBus, signal: &Signal) {
                let _ = self.tx.send(signal.clone());
            }
        }

        let rt = Runtime::builder(Config::default())
            .with_factory(noop_table(&[("player", DependencySet::new())]))
            .build();
        let player = rt.declare(&ModuleId::component("player")).unwrap();
        rt.run().await.unwrap();

        // Another module would look the player up and subscribe on its
        // private bus; no direct references change hands.
        let id = crate::bus::allocate("ON_PLAYBACK_STARTED");
        let (tx, mut rx) = mpsc::unbounded_channel();
        player.bus().register(Arc::new(Recorder { tx }), id);

        player.bus().trigger(Signal::new(id).with_data(1080u32));
        sleep(Duration::from_millis(10)).await;
        let got = rx.try_recv().expect("signal must reach the subscriber");
        assert_eq!(got.payload::<u32>(), Some(&1080));
    }

    #[tokio::test]
    async fn test_category_and_global_prefs_are_independent() {
        let rt = Runtime::builder(Config::default()).build();
        rt.global_prefs().put("locale", "en_GB");
        rt.prefs(ModuleKind::Component).put("locale", "sv_SE");

        assert_eq!(rt.global_prefs().get("locale").as_deref(), Some("en_GB"));
        assert_eq!(
            rt.prefs(ModuleKind::Component).get("locale").as_deref(),
            Some("sv_SE")
        );
        assert!(!rt.prefs(ModuleKind::State).has("locale"));
    }
}
