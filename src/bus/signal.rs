//! # Bus notifications.
//!
//! A [`Signal`] is the payload delivered to listeners: the allocated id,
//! ordering metadata, and optional typed fields set depending on what the
//! signal describes (loading progress figures, a key event, a reason
//! string), plus an opaque payload slot for module-defined data.
//!
//! ## Ordering guarantees
//! Each signal carries a globally unique sequence number (`seq`) assigned at
//! construction; it increases monotonically across all buses and can be used
//! to restore global order in logs.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::SystemTime;

use crate::bus::ids::SignalId;

/// Global sequence counter for signal ordering.
static SIGNAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Raw key event passed through the platform bus.
///
/// Which screen consumes the key is decided by the embedding application's
/// screen stack; the core only routes the pair of pressed/released signals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Resolved logical key code.
    pub key: u32,
    /// Raw platform scan code.
    pub raw_code: u32,
    /// Whether an earlier handler already consumed the key.
    pub consumed: bool,
}

/// Notification delivered through an [`EventBus`](crate::EventBus).
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the signal
#[derive(Clone)]
pub struct Signal {
    /// Message id this signal is delivered under.
    pub id: SignalId,
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Aggregated initialization progress in `[0, 1]`.
    pub total_progress: Option<f32>,
    /// Progress of the currently initializing module in `[0, 1]`.
    pub feature_progress: Option<f32>,
    /// Name of the module/feature the signal concerns.
    pub feature: Option<Arc<str>>,
    /// Human-readable reason (failures, diagnostics).
    pub reason: Option<Arc<str>>,
    /// Key event carried by the key pass-through signals.
    pub key: Option<KeyEvent>,
    /// Opaque module-defined payload.
    pub data: Option<Arc<dyn Any + Send + Sync>>,
}

impl Signal {
    /// Creates a new signal for `id` with the current timestamp and the next
    /// global sequence number.
    pub fn new(id: SignalId) -> Self {
        Self {
            id,
            seq: SIGNAL_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            total_progress: None,
            feature_progress: None,
            feature: None,
            reason: None,
            key: None,
            data: None,
        }
    }

    /// Attaches the aggregated initialization progress.
    #[inline]
    pub fn with_total_progress(mut self, fraction: f32) -> Self {
        self.total_progress = Some(fraction);
        self
    }

    /// Attaches the current module's own progress.
    #[inline]
    pub fn with_feature_progress(mut self, fraction: f32) -> Self {
        self.feature_progress = Some(fraction);
        self
    }

    /// Attaches a feature/module name.
    #[inline]
    pub fn with_feature(mut self, feature: impl Into<Arc<str>>) -> Self {
        self.feature = Some(feature.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a key event.
    #[inline]
    pub fn with_key(mut self, key: KeyEvent) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches an opaque payload.
    ///
    /// Listeners downcast with [`Signal::payload`].
    #[inline]
    pub fn with_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.data = Some(Arc::new(data));
        self
    }

    /// Downcasts the opaque payload to `T`, if present and of that type.
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|d| d.downcast_ref::<T>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ids::allocate;

    #[test]
    fn test_seq_is_monotonic() {
        let id = allocate("ON_SEQ_TEST");
        let a = Signal::new(id);
        let b = Signal::new(id);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_payload_downcast() {
        let id = allocate("ON_PAYLOAD_TEST");
        let s = Signal::new(id).with_data(42u32);
        assert_eq!(s.payload::<u32>(), Some(&42));
        assert_eq!(s.payload::<String>(), None);
    }
}
