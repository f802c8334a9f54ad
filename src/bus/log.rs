//! # Simple logging listener for debugging and demos.
//!
//! [`LogWriter`] prints signals to stdout in a human-readable format.
//! Register it on the platform bus (usually under
//! [`SignalId::ANY`](crate::SignalId::ANY)) to watch an initialization run.
//!
//! ## Output format
//! ```text
//! [loading] feature=component:epg total=0.42 feature_progress=0.60
//! [init-failed] feature=component:epg reason="guide download failed"
//! [ready]
//! [key] signal=ON_KEY_PRESSED key=27 raw=1043 consumed=false
//! [signal] id=ON_CHANNEL_CHANGED seq=812
//! ```

use async_trait::async_trait;

use crate::bus::bus::{BusListener, EventBus};
use crate::bus::signal::Signal;
use crate::runtime::signals;

/// Simple stdout logging listener.
///
/// Enabled via the `logging` feature. Prints human-readable signal
/// descriptions for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom
/// [`BusListener`] for structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl BusListener for LogWriter {
    async fn on_signal(&self, _bus: &EventBus, s: &Signal) {
        if s.id == signals::loading_progress() {
            println!(
                "[loading] feature={} total={:.2} feature_progress={:.2}",
                s.feature.as_deref().unwrap_or("?"),
                s.total_progress.unwrap_or(0.0),
                s.feature_progress.unwrap_or(0.0),
            );
        } else if s.id == signals::ready() {
            println!("[ready]");
        } else if s.id == signals::init_failed() {
            println!(
                "[init-failed] feature={} reason={:?}",
                s.feature.as_deref().unwrap_or("?"),
                s.reason.as_deref().unwrap_or(""),
            );
        } else if s.id == signals::key_pressed() || s.id == signals::key_released() {
            if let Some(k) = s.key {
                println!(
                    "[key] signal={} key={} raw={} consumed={}",
                    s.id, k.key, k.raw_code, k.consumed
                );
            }
        } else {
            println!("[signal] id={} seq={}", s.id, s.seq);
        }
    }
}
