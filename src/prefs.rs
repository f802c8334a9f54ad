//! # Preference store seam.
//!
//! Modules read and write configuration through the [`Preferences`] trait;
//! the runtime holds one store per module category plus a global one. The
//! storage format (file, OS-provided store, remote document) is the
//! embedding application's business — the core only requires
//! `has`/`get`/`put` semantics, which is also all a bulk declaration source
//! needs to seed values before initialization begins.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared reference to a preference store.
pub type PrefsRef = Arc<dyn Preferences>;

/// # Key/value preference store.
///
/// Implementations must be callable from any thread; the in-memory
/// [`MemoryPrefs`] is the default.
pub trait Preferences: Send + Sync + 'static {
    /// Returns true if `key` has a value.
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str);
}

/// In-memory preference store.
///
/// Used as the default for every category; suitable for tests and for
/// deployments that seed all values through a bulk declaration source.
#[derive(Default)]
pub struct MemoryPrefs {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPrefs {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Preferences for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }
}
