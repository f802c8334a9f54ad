//! # Well-known platform signals.
//!
//! The signals the core itself publishes on the platform bus. Each id is
//! allocated from the process-wide table on first use and cached, so every
//! caller (the sequencer, the host, a logging listener) sees the same id.
//!
//! | accessor             | name                | payload fields                              |
//! |----------------------|---------------------|---------------------------------------------|
//! | [`loading_progress`] | `ON_LOADING_PROGRESS` | `total_progress`, `feature_progress`, `feature` |
//! | [`ready`]            | `ON_READY`          | none                                        |
//! | [`init_failed`]      | `ON_INIT_FAILED`    | `feature`, `reason`                         |
//! | [`key_pressed`]      | `ON_KEY_PRESSED`    | `key`                                       |
//! | [`key_released`]     | `ON_KEY_RELEASED`   | `key`                                       |

use std::sync::OnceLock;

use crate::bus::{allocate, SignalId};

fn cached(cell: &OnceLock<SignalId>, name: &'static str) -> SignalId {
    *cell.get_or_init(|| allocate(name))
}

/// Aggregated initialization progress, republished on every module progress
/// report.
pub fn loading_progress() -> SignalId {
    static ID: OnceLock<SignalId> = OnceLock::new();
    cached(&ID, "ON_LOADING_PROGRESS")
}

/// The system finished initializing; interaction may be allowed.
pub fn ready() -> SignalId {
    static ID: OnceLock<SignalId> = OnceLock::new();
    cached(&ID, "ON_READY")
}

/// An initialization run stopped on a module failure or timeout.
pub fn init_failed() -> SignalId {
    static ID: OnceLock<SignalId> = OnceLock::new();
    cached(&ID, "ON_INIT_FAILED")
}

/// Key press pass-through.
pub fn key_pressed() -> SignalId {
    static ID: OnceLock<SignalId> = OnceLock::new();
    cached(&ID, "ON_KEY_PRESSED")
}

/// Key release pass-through.
pub fn key_released() -> SignalId {
    static ID: OnceLock<SignalId> = OnceLock::new();
    cached(&ID, "ON_KEY_RELEASED")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::name_of;

    #[test]
    fn test_well_known_ids_are_stable_and_named() {
        assert_eq!(loading_progress(), loading_progress());
        assert_eq!(ready(), ready());
        assert_ne!(loading_progress(), ready());
        assert_eq!(name_of(ready()).as_deref(), Some("ON_READY"));
        assert_eq!(
            name_of(key_pressed()).as_deref(),
            Some("ON_KEY_PRESSED")
        );
    }
}
