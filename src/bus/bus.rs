//! # Per-scope publish/subscribe bus.
//!
//! An [`EventBus`] is used both as the platform-wide notification channel
//! and as each module's private channel. Listeners are notified in
//! registration order; membership changes made by a listener during its own
//! notification are deferred until the walk finishes.
//!
//! ## Architecture
//! ```text
//! trigger(signal[, delay])          (any thread; never calls listeners)
//!      │ enqueue command
//!      ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │ dispatcher task (the bus's owning run loop)                 │
//! │   pending queue: at most ONE entry per id (coalescing)      │
//! │   on due: snapshot listeners ─► walk ─► apply deferred ops  │
//! └─────────────────────────────────────────────────────────────┘
//!      │                               │
//!      ▼                               ▼
//!  id listeners (insertion order)   wildcard listeners (id 0)
//! ```
//!
//! ## Rules
//! - **Never synchronous**: `trigger` enqueues for the dispatcher; a caller
//!   thread never runs listeners.
//! - **Coalescing**: a second trigger for an id still pending replaces the
//!   pending entry (payload and delay); only the newest survives.
//! - **Snapshot dispatch**: the listener list walked for a signal is frozen
//!   before the walk; `register`/`unregister` during the walk are queued and
//!   applied after it (the re-entrancy flag guards this). Outside a walk
//!   they take effect immediately.
//! - **Single owner loop**: one dispatcher task per bus; listeners for one
//!   bus never run concurrently with each other.
//! - Listener panics are not caught: invariant violations inside listeners
//!   terminate the process loudly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::bus::ids::SignalId;
use crate::bus::signal::Signal;

/// # Bus listener.
///
/// Implementors receive every signal for ids they are registered under, on
/// the bus's dispatcher task. The bus handle is passed back in so a listener
/// can re-register, unregister itself, or trigger follow-up signals from
/// within a notification.
#[async_trait]
pub trait BusListener: Send + Sync + 'static {
    /// Handles one signal.
    async fn on_signal(&self, bus: &EventBus, signal: &Signal);
}

/// Commands marshaled from trigger callers to the dispatcher task.
enum Command {
    Trigger { signal: Signal, delay: Duration },
}

/// One not-yet-delivered signal.
struct Pending {
    due: Instant,
    signal: Signal,
}

#[derive(Default)]
struct BusState {
    /// Per-id listener lists; insertion order is notification order.
    listeners: HashMap<SignalId, Vec<Arc<dyn BusListener>>>,
    /// Wildcard listeners (registered under [`SignalId::ANY`]), notified
    /// after the id-specific list.
    any: Vec<Arc<dyn BusListener>>,
    /// Re-entrancy flag: true while a listener walk is in progress.
    dispatching: bool,
    /// Registrations queued during a walk.
    deferred_add: Vec<(SignalId, Arc<dyn BusListener>)>,
    /// Unregistrations queued during a walk (listener by address key).
    deferred_remove: Vec<(SignalId, usize)>,
}

struct BusInner {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<Command>,
    state: Mutex<BusState>,
}

/// Per-scope publish/subscribe bus.
///
/// Cheap to clone (handles share one dispatcher); clones compare equal under
/// [`EventBus::same`]. Dropping every handle stops the dispatcher after the
/// already-queued commands drain.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates a bus whose dispatcher runs until every handle is dropped.
    ///
    /// Must be called from within a Tokio runtime (the dispatcher task is
    /// spawned here).
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self::scoped(name, CancellationToken::new())
    }

    /// Creates a bus whose dispatcher additionally stops when `token` is
    /// cancelled (runtime teardown).
    pub fn scoped(name: impl Into<Arc<str>>, token: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let inner = Arc::new(BusInner {
            name: name.into(),
            tx,
            state: Mutex::new(BusState::default()),
        });
        tokio::spawn(pump(Arc::downgrade(&inner), rx, token));
        Self { inner }
    }

    /// Returns the bus label (diagnostics only).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns true if `other` is a handle to the same bus.
    pub fn same(&self, other: &EventBus) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Registers `listener` for `id`.
    ///
    /// [`SignalId::ANY`] registers a wildcard listener notified for every
    /// signal, after the id-specific list. Registering during a dispatch
    /// walk is applied after the walk; the current signal does not reach the
    /// new registration.
    pub fn register(&self, listener: Arc<dyn BusListener>, id: SignalId) {
        let mut st = self.state();
        if st.dispatching {
            st.deferred_add.push((id, listener));
        } else {
            apply_add(&mut st, id, listener);
        }
    }

    /// Unregisters `listener` from `id`.
    ///
    /// [`SignalId::ANY`] detaches the listener from every id (and from the
    /// wildcard list). Unregistering during a dispatch walk is applied after
    /// the walk: the listener is still notified for the signal currently
    /// being walked, never for later ones. Outside a walk the removal is
    /// immediate.
    pub fn unregister(&self, listener: &dyn BusListener, id: SignalId) {
        let key = listener_key(listener);
        let mut st = self.state();
        if st.dispatching {
            st.deferred_remove.push((id, key));
        } else {
            apply_remove(&mut st, id, key);
        }
    }

    /// Triggers `signal` for immediate delivery.
    ///
    /// Never calls listeners from the caller: the signal is enqueued for the
    /// dispatcher task. If a trigger for the same id is still pending, this
    /// one replaces it.
    pub fn trigger(&self, signal: Signal) {
        self.send(signal, Duration::ZERO);
    }

    /// Triggers `signal` for delivery after `delay`.
    ///
    /// Subject to the same coalescing rule as [`trigger`](Self::trigger):
    /// the newest pending trigger for an id wins, payload and delay alike.
    pub fn trigger_delayed(&self, signal: Signal, delay: Duration) {
        self.send(signal, delay);
    }

    /// Number of listeners currently registered for `id`
    /// ([`SignalId::ANY`] counts the wildcard list).
    pub fn listener_count(&self, id: SignalId) -> usize {
        let st = self.state();
        if id == SignalId::ANY {
            st.any.len()
        } else {
            st.listeners.get(&id).map_or(0, Vec::len)
        }
    }

    fn send(&self, signal: Signal, delay: Duration) {
        // Dispatcher gone (teardown): drop the signal, like any publish
        // after shutdown.
        let _ = self.inner.tx.send(Command::Trigger { signal, delay });
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stable address key for listener identity (the `Arc`'s data pointer).
fn listener_key(listener: &dyn BusListener) -> usize {
    listener as *const dyn BusListener as *const () as usize
}

fn apply_add(st: &mut BusState, id: SignalId, listener: Arc<dyn BusListener>) {
    if id == SignalId::ANY {
        st.any.push(listener);
    } else {
        st.listeners.entry(id).or_default().push(listener);
    }
}

fn apply_remove(st: &mut BusState, id: SignalId, key: usize) {
    if id == SignalId::ANY {
        for list in st.listeners.values_mut() {
            list.retain(|l| listener_key(l.as_ref()) != key);
        }
        st.any.retain(|l| listener_key(l.as_ref()) != key);
    } else if let Some(list) = st.listeners.get_mut(&id) {
        list.retain(|l| listener_key(l.as_ref()) != key);
    }
}

/// The bus's owning run loop: queues, coalesces, and delivers signals.
///
/// Holds only a weak handle so the loop winds down when the last bus handle
/// is dropped (the sender side of `rx` lives in `BusInner`).
async fn pump(
    bus: Weak<BusInner>,
    mut rx: mpsc::UnboundedReceiver<Command>,
    token: CancellationToken,
) {
    // At most one entry per id; deadline order decides delivery.
    let mut queue: Vec<Pending> = Vec::new();

    loop {
        let next_due = queue.iter().map(|p| p.due).min();
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            cmd = rx.recv() => match cmd {
                Some(Command::Trigger { signal, delay }) => {
                    let due = Instant::now() + delay;
                    match queue.iter_mut().find(|p| p.signal.id == signal.id) {
                        // Coalesce: newest trigger for an id wins.
                        Some(p) => {
                            p.signal = signal;
                            p.due = due;
                        }
                        None => queue.push(Pending { due, signal }),
                    }
                }
                None => break,
            },
            _ = sleep_until(next_due.unwrap_or_else(Instant::now)), if next_due.is_some() => {
                let now = Instant::now();
                while let Some(pos) = queue.iter().position(|p| p.due <= now) {
                    let pending = queue.remove(pos);
                    let Some(inner) = bus.upgrade() else { return };
                    let handle = EventBus { inner };
                    deliver(&handle, &pending.signal).await;
                }
            }
        }
    }
}

/// Walks a frozen snapshot of the id's listeners (then the wildcard list),
/// then applies the membership changes queued during the walk.
async fn deliver(bus: &EventBus, signal: &Signal) {
    let snapshot: Vec<Arc<dyn BusListener>> = {
        let mut st = bus.state();
        st.dispatching = true;
        let mut listeners: Vec<_> = st
            .listeners
            .get(&signal.id)
            .map(|l| l.to_vec())
            .unwrap_or_default();
        listeners.extend(st.any.iter().cloned());
        listeners
    };

    for listener in &snapshot {
        listener.on_signal(bus, signal).await;
    }

    let mut st = bus.state();
    st.dispatching = false;
    let adds = std::mem::take(&mut st.deferred_add);
    let removes = std::mem::take(&mut st.deferred_remove);
    for (id, listener) in adds {
        apply_add(&mut st, id, listener);
    }
    for (id, key) in removes {
        apply_remove(&mut st, id, key);
    }
}
