//! # Process-wide signal id allocation.
//!
//! Signal ids are small integers allocated against a global, append-only
//! table mapping human-readable names to ids. The table is shared by every
//! [`EventBus`](crate::EventBus) instance in the process, so an id allocated
//! once can be triggered on any bus.
//!
//! ## Rules
//! - Ids are 1-based and monotonically increasing.
//! - Id 0 ([`SignalId::ANY`]) is reserved to mean "any message": registering
//!   for it makes a wildcard listener, unregistering with it detaches a
//!   listener from every id.
//! - The table never shrinks and names are never re-keyed; repeated
//!   `allocate` calls with the same name allocate fresh ids. Well-known ids
//!   are expected to be allocated once and cached (see
//!   [`signals`](crate::signals)).

use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// Identifier of a bus message, allocated by [`allocate`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SignalId(u32);

impl SignalId {
    /// Reserved id meaning "any message".
    pub const ANY: SignalId = SignalId(0);

    /// Returns the raw integer value.
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == SignalId::ANY {
            return write!(f, "any");
        }
        match name_of(*self) {
            Some(name) => write!(f, "{name}"),
            None => write!(f, "signal#{}", self.0),
        }
    }
}

fn table() -> &'static Mutex<Vec<Arc<str>>> {
    static TABLE: OnceLock<Mutex<Vec<Arc<str>>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(Vec::new()))
}

/// Allocates a fresh signal id for `name`.
///
/// Ids are process-wide, 1-based, and monotonically increasing; the
/// name→id table is append-only and shared across all bus instances.
pub fn allocate(name: impl Into<Arc<str>>) -> SignalId {
    let mut names = table().lock().unwrap_or_else(PoisonError::into_inner);
    names.push(name.into());
    SignalId(names.len() as u32)
}

/// Returns the name `id` was allocated under, if any.
///
/// [`SignalId::ANY`] has no name.
pub fn name_of(id: SignalId) -> Option<Arc<str>> {
    if id == SignalId::ANY {
        return None;
    }
    let names = table().lock().unwrap_or_else(PoisonError::into_inner);
    names.get(id.0 as usize - 1).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_returns_distinct_fresh_ids() {
        let x = allocate("ON_X");
        let y = allocate("ON_Y");
        assert_ne!(x, y);
        assert_ne!(x, SignalId::ANY);
        assert_ne!(y, SignalId::ANY);
        // Monotonic: later allocation has the larger raw id.
        assert!(y.raw() > x.raw());
    }

    #[test]
    fn test_name_of_is_the_inverse_of_allocate() {
        let x = allocate("ON_ROUNDTRIP_X");
        let y = allocate("ON_ROUNDTRIP_Y");
        assert_eq!(name_of(x).as_deref(), Some("ON_ROUNDTRIP_X"));
        assert_eq!(name_of(y).as_deref(), Some("ON_ROUNDTRIP_Y"));
        assert_eq!(name_of(SignalId::ANY), None);
    }

    #[test]
    fn test_display_uses_allocated_name() {
        let id = allocate("ON_DISPLAYED");
        assert_eq!(id.to_string(), "ON_DISPLAYED");
        assert_eq!(SignalId::ANY.to_string(), "any");
    }
}
