//! # Sequencer: one-at-a-time asynchronous module initialization.
//!
//! Drives a [`ResolvedOrder`] from front to back. For the module at the
//! cursor it arms the configured timeout, spawns the module's initializer,
//! and then awaits structured results on the run channel instead of
//! threading callback objects through the call stack.
//!
//! ## Flow
//! ```text
//! run()
//!   for each module, in resolved order:
//!     ├─► arm deadline (config timeout; module may suspend/resume)
//!     ├─► spawn module.init(InitHandle)
//!     └─► loop on the run channel:
//!           Progress(f)  ─► publish loading signal, total = (i + f) / n
//!           Done(Ok)     ─► disarm, advance cursor
//!           Done(Err)    ─► publish init-failed notice, stop run
//!           deadline hit ─► publish init-failed notice, stop run
//!   after the last module: publish ready
//! ```
//!
//! ## Rules
//! - Modules initialize **strictly sequentially**; later modules may assume
//!   earlier ones are fully initialized.
//! - A module completes **exactly once**; a duplicate completion for an
//!   already-finished index is a fatal programming error (panic).
//! - Timeout is the only cancellation primitive: a timed-out module stops
//!   being waited on, but its in-flight work is not interrupted.
//! - Progress and suspend/resume signals from stale indices are ignored.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::bus::{EventBus, Signal};
use crate::error::RunError;
use crate::registry::ResolvedOrder;
use crate::runtime::signals;
use crate::sequencer::handle::{InitHandle, InitSignal};

/// Deadline placeholder while the timeout is disabled; never polled.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365);

/// Mutable state of one initialization run.
struct Cursor {
    /// Index of the module currently initializing.
    index: usize,
    /// Index of the last module that completed, for detecting duplicate
    /// completion signals.
    last_done: Option<usize>,
    /// When the current module started (diagnostics).
    started_at: Instant,
    /// Absolute deadline for the current module, if a timeout is configured.
    deadline: Option<Instant>,
    /// False while the module has cooperatively suspended its timeout.
    armed: bool,
}

impl Cursor {
    fn rearm(&mut self, timeout: Option<Duration>) {
        self.deadline = timeout.map(|t| Instant::now() + t);
        self.armed = true;
    }
}

/// Drives one-at-a-time asynchronous module initialization with timeout and
/// progress aggregation.
///
/// Constructed per run by [`Runtime::run`](crate::Runtime::run); usable
/// standalone when the host resolves an order itself.
pub struct Sequencer {
    order: ResolvedOrder,
    timeout: Option<Duration>,
    bus: EventBus,
}

impl Sequencer {
    /// Creates a sequencer over `order`.
    ///
    /// `timeout` is the per-module limit (`None` = wait forever); host
    /// notifications go out on `bus`.
    pub fn new(order: ResolvedOrder, timeout: Option<Duration>, bus: EventBus) -> Self {
        Self {
            order,
            timeout,
            bus,
        }
    }

    /// Runs the whole order to completion.
    ///
    /// Returns `Ok(())` after the last module completed and the ready
    /// notification went out. Stops at the first failure or timeout,
    /// reporting the module and reason; nothing further is initialized.
    ///
    /// # Panics
    /// Panics if a module reports completion twice for the same run index.
    pub async fn run(self) -> Result<(), RunError> {
        let total = self.order.len();
        if total == 0 {
            self.publish_ready();
            return Ok(());
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, InitSignal)>();
        let mut cursor = Cursor {
            index: 0,
            last_done: None,
            started_at: Instant::now(),
            deadline: None,
            armed: false,
        };

        while cursor.index < total {
            let module = self.order.as_slice()[cursor.index].clone();
            let identity = module.identity();
            let feature: Arc<str> = Arc::from(identity.to_string());

            cursor.started_at = Instant::now();
            cursor.rearm(self.timeout);
            self.publish_progress(&feature, cursor.index, 0.0, total);

            let handle = InitHandle::new(cursor.index, feature.clone(), tx.clone());
            tokio::spawn(async move { module.init(handle).await });

            loop {
                let sleep_at = cursor
                    .deadline
                    .unwrap_or_else(|| Instant::now() + FAR_FUTURE);
                tokio::select! {
                    biased;
                    msg = rx.recv() => {
                        // The sequencer owns `tx`; the channel cannot close.
                        let Some((idx, signal)) = msg else { break };
                        match signal {
                            InitSignal::Progress(f) if idx == cursor.index => {
                                self.publish_progress(&feature, idx, f.clamp(0.0, 1.0), total);
                            }
                            InitSignal::SuspendTimeout if idx == cursor.index => {
                                cursor.armed = false;
                            }
                            InitSignal::ResumeTimeout if idx == cursor.index => {
                                cursor.rearm(self.timeout);
                            }
                            InitSignal::Done(result) => {
                                if cursor.last_done.is_some_and(|done| idx <= done) {
                                    self.panic_duplicate_completion(idx);
                                }
                                cursor.armed = false;
                                match result {
                                    Ok(()) => {
                                        cursor.last_done = Some(idx);
                                        self.publish_progress(&feature, idx, 1.0, total);
                                        break;
                                    }
                                    Err(failure) => {
                                        self.publish_init_failed(&feature, failure.reason.clone());
                                        return Err(RunError::InitFailed {
                                            module: identity,
                                            reason: failure.reason,
                                        });
                                    }
                                }
                            }
                            // Stale progress or suspend/resume from an
                            // already-completed module.
                            _ => {}
                        }
                    }
                    _ = sleep_until(sleep_at), if cursor.armed && cursor.deadline.is_some() => {
                        let timeout = self.timeout.unwrap_or_default();
                        let reason = format!(
                            "timed out after {:?} (elapsed {:?})",
                            timeout,
                            cursor.started_at.elapsed(),
                        );
                        self.publish_init_failed(&feature, reason);
                        return Err(RunError::TimedOut {
                            module: identity,
                            timeout,
                        });
                    }
                }
            }

            cursor.index += 1;
        }

        // Catch a duplicate completion that raced the end of the run.
        while let Ok((idx, signal)) = rx.try_recv() {
            if matches!(signal, InitSignal::Done(_)) {
                self.panic_duplicate_completion(idx);
            }
        }

        self.publish_ready();
        Ok(())
    }

    fn publish_progress(&self, feature: &Arc<str>, index: usize, fraction: f32, total: usize) {
        let total_progress = (index as f32 + fraction) / total as f32;
        self.bus.trigger(
            Signal::new(signals::loading_progress())
                .with_total_progress(total_progress)
                .with_feature_progress(fraction)
                .with_feature(feature.clone()),
        );
    }

    fn publish_init_failed(&self, feature: &Arc<str>, reason: impl Into<Arc<str>>) {
        self.bus.trigger(
            Signal::new(signals::init_failed())
                .with_feature(feature.clone())
                .with_reason(reason),
        );
    }

    fn publish_ready(&self) {
        self.bus.trigger(Signal::new(signals::ready()));
    }

    fn panic_duplicate_completion(&self, index: usize) -> ! {
        let module = self.order.as_slice()[index].identity();
        panic!("module '{module}' reported initialization completion twice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{BusListener, SignalId};
    use crate::modules::{DependencySet, ModuleFn, ModuleId, ModuleRef};
    use crate::registry::resolve;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::sleep;

    struct Recorder {
        tx: mpsc::UnboundedSender<Signal>,
    }

    impl Recorder {
        fn arc() -> (Arc<Self>, mpsc::UnboundedReceiver<Signal>) {
            let (tx, rx) = mpsc::unbounded_channel();
            (Arc::new(Self { tx }), rx)
        }
    }

    #[async_trait]
    impl BusListener for Recorder {
        async fn on_signal(&self, _bus: &EventBus, signal: &Signal) {
            let _ = self.tx.send(signal.clone());
        }
    }

    fn quick(name: &'static str) -> ModuleRef {
        ModuleFn::arc(
            ModuleId::component(name),
            DependencySet::new(),
            |ctx: InitHandle| async move {
                ctx.progress(0.5);
                ctx.ok();
            },
        )
    }

    fn sequencer(modules: Vec<ModuleRef>, timeout: Option<Duration>, bus: &EventBus) -> Sequencer {
        Sequencer::new(resolve(&modules), timeout, bus.clone())
    }

    async fn drain(rx: &mut mpsc::UnboundedReceiver<Signal>) -> Vec<Signal> {
        // Bus deliveries are asynchronous; give the dispatcher a beat.
        sleep(Duration::from_millis(50)).await;
        let mut got = Vec::new();
        while let Ok(s) = rx.try_recv() {
            got.push(s);
        }
        got
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_is_monotonic_and_ends_at_one() {
        let bus = EventBus::new("platform");
        let (rec, mut rx) = Recorder::arc();
        bus.register(rec, SignalId::ANY);

        let seq = sequencer(vec![quick("a"), quick("b"), quick("c")], None, &bus);
        seq.run().await.expect("run must succeed");

        let signals_seen = drain(&mut rx).await;
        let totals: Vec<f32> = signals_seen
            .iter()
            .filter(|s| s.id == signals::loading_progress())
            .filter_map(|s| s.total_progress)
            .collect();
        assert!(!totals.is_empty());
        assert!(
            totals.windows(2).all(|w| w[0] <= w[1]),
            "progress must be non-decreasing: {totals:?}"
        );
        assert_eq!(*totals.last().unwrap(), 1.0, "progress must end at 1.0");
        assert!(
            signals_seen.iter().any(|s| s.id == signals::ready()),
            "ready must be published after the last module"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_the_run_before_later_modules() {
        let bus = EventBus::new("platform");
        let stuck: ModuleRef = ModuleFn::arc(
            ModuleId::component("stuck"),
            DependencySet::new(),
            |_ctx: InitHandle| async move {
                // Never completes.
            },
        );
        let touched = Arc::new(AtomicBool::new(false));
        let touched_flag = touched.clone();
        let later: ModuleRef = ModuleFn::arc(
            ModuleId::component("later"),
            DependencySet::new(),
            move |ctx: InitHandle| {
                let touched = touched_flag.clone();
                async move {
                    touched.store(true, Ordering::SeqCst);
                    ctx.ok();
                }
            },
        );

        let seq = sequencer(
            vec![stuck, later],
            Some(Duration::from_millis(100)),
            &bus,
        );
        let err = seq.run().await.expect_err("run must time out");
        match err {
            RunError::TimedOut { module, timeout } => {
                assert_eq!(module, ModuleId::component("stuck"));
                assert_eq!(timeout, Duration::from_millis(100));
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
        assert!(
            !touched.load(Ordering::SeqCst),
            "modules after the timed-out one must never initialize"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_halts_the_run_and_reports_the_module() {
        let bus = EventBus::new("platform");
        let failing: ModuleRef = ModuleFn::arc(
            ModuleId::component("guide"),
            DependencySet::new(),
            |ctx: InitHandle| async move {
                ctx.fail("guide download failed");
            },
        );
        let touched = Arc::new(AtomicBool::new(false));
        let touched_flag = touched.clone();
        let later: ModuleRef = ModuleFn::arc(
            ModuleId::component("later"),
            DependencySet::new(),
            move |ctx: InitHandle| {
                let touched = touched_flag.clone();
                async move {
                    touched.store(true, Ordering::SeqCst);
                    ctx.ok();
                }
            },
        );

        let seq = sequencer(vec![failing, later], None, &bus);
        let err = seq.run().await.expect_err("run must fail");
        match err {
            RunError::InitFailed { module, reason } => {
                assert_eq!(module, ModuleId::component("guide"));
                assert_eq!(&*reason, "guide download failed");
            }
            other => panic!("expected InitFailed, got {other:?}"),
        }
        assert!(!touched.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    #[should_panic(expected = "completion twice")]
    async fn test_double_completion_panics() {
        let bus = EventBus::new("platform");
        let twice: ModuleRef = ModuleFn::arc(
            ModuleId::component("twice"),
            DependencySet::new(),
            |ctx: InitHandle| async move {
                ctx.ok();
                ctx.ok();
            },
        );
        let seq = sequencer(vec![twice], None, &bus);
        let _ = seq.run().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspended_timeout_does_not_fire() {
        let bus = EventBus::new("platform");
        let waiting: ModuleRef = ModuleFn::arc(
            ModuleId::component("drm"),
            DependencySet::new(),
            |ctx: InitHandle| async move {
                ctx.suspend_timeout();
                sleep(Duration::from_millis(300)).await;
                ctx.resume_timeout();
                ctx.ok();
            },
        );
        let seq = sequencer(vec![waiting], Some(Duration::from_millis(100)), &bus);
        seq.run()
            .await
            .expect("suspended module must not time out");
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_rearms_a_full_timeout() {
        let bus = EventBus::new("platform");
        let waiting: ModuleRef = ModuleFn::arc(
            ModuleId::component("drm"),
            DependencySet::new(),
            |ctx: InitHandle| async move {
                ctx.suspend_timeout();
                sleep(Duration::from_millis(300)).await;
                ctx.resume_timeout();
                // Slower than the timeout: must be caught again.
                sleep(Duration::from_millis(150)).await;
                ctx.ok();
            },
        );
        let seq = sequencer(vec![waiting], Some(Duration::from_millis(100)), &bus);
        let err = seq.run().await.expect_err("resumed timeout must fire");
        assert!(matches!(err, RunError::TimedOut { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_order_is_ready_immediately() {
        let bus = EventBus::new("platform");
        let (rec, mut rx) = Recorder::arc();
        bus.register(rec, SignalId::ANY);

        let seq = Sequencer::new(resolve(&[]), None, bus.clone());
        seq.run().await.expect("empty run must succeed");

        let signals_seen = drain(&mut rx).await;
        assert!(signals_seen.iter().any(|s| s.id == signals::ready()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_publishes_init_failed_notice() {
        let bus = EventBus::new("platform");
        let (rec, mut rx) = Recorder::arc();
        bus.register(rec, SignalId::ANY);

        let failing: ModuleRef = ModuleFn::arc(
            ModuleId::component("guide"),
            DependencySet::new(),
            |ctx: InitHandle| async move {
                ctx.fail("boom");
            },
        );
        let seq = sequencer(vec![failing], None, &bus);
        let _ = seq.run().await;

        let signals_seen = drain(&mut rx).await;
        let notice = signals_seen
            .iter()
            .find(|s| s.id == signals::init_failed())
            .expect("init-failed notice must be published");
        assert_eq!(notice.feature.as_deref(), Some("component:guide"));
        assert_eq!(notice.reason.as_deref(), Some("boom"));
    }
}
