//! # Dependency resolution.
//!
//! [`resolve`] computes a [`ResolvedOrder`] over the registry's live
//! collection: a linear sequence in which every module appears after all
//! modules it depends on.
//!
//! ## Algorithm
//! Repeated-pass placement. Each pass examines every not-yet-placed module
//! in declaration order; a module is placeable once every identity in every
//! category of its dependency set is already placed (entries placed earlier
//! in the same pass count). Placeable modules are appended in declaration
//! order, except that a priority module is inserted immediately after the
//! highest-indexed placed module it depends on — as early as its
//! constraints allow — rather than at the tail of the pass. A full pass
//! that places nothing is fatal: the graph has a cycle or references an
//! identity that was never declared.
//!
//! O(n²) in module count, which is fine: module counts are tens, not
//! thousands, and resolution happens once per run.

use crate::modules::{ModuleId, ModuleRef};

/// Dependency-respecting linear initialization order.
///
/// Invariant: for the module at position `i`, every identity in its
/// dependency set occupies a position `< i`.
pub struct ResolvedOrder {
    modules: Vec<ModuleRef>,
}

impl ResolvedOrder {
    /// Number of modules in the order.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true for the empty order.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The ordered modules.
    pub fn as_slice(&self) -> &[ModuleRef] {
        &self.modules
    }

    /// Iterates the modules in initialization order.
    pub fn iter(&self) -> impl Iterator<Item = &ModuleRef> {
        self.modules.iter()
    }
}

/// Computes the initialization order for `modules` (in declaration order).
///
/// # Panics
/// Panics when a full pass places nothing: the declared dependency sets
/// form a cycle, or reference an identity missing from the collection.
/// This is an unrecoverable programming error in the module graph.
pub fn resolve(modules: &[ModuleRef]) -> ResolvedOrder {
    let mut placed: Vec<ModuleRef> = Vec::with_capacity(modules.len());
    let mut placed_ids: Vec<ModuleId> = Vec::with_capacity(modules.len());
    let mut remaining: Vec<ModuleRef> = modules.to_vec();

    while !remaining.is_empty() {
        let placed_before = placed.len();
        let mut unplaced: Vec<ModuleRef> = Vec::new();

        for module in remaining {
            let placeable = module
                .dependencies()
                .iter()
                .all(|dep| placed_ids.contains(dep));
            if !placeable {
                unplaced.push(module);
                continue;
            }

            if module.priority() {
                // As early as dependency constraints allow: right after the
                // highest-indexed placed dependency, or at the front.
                let at = module
                    .dependencies()
                    .iter()
                    .filter_map(|dep| placed_ids.iter().position(|p| p == dep))
                    .max()
                    .map_or(0, |pos| pos + 1);
                placed_ids.insert(at, module.identity());
                placed.insert(at, module);
            } else {
                placed_ids.push(module.identity());
                placed.push(module);
            }
        }

        if placed.len() == placed_before {
            // Zero placements this pass: no amount of further passes will
            // make progress.
            let stuck: Vec<String> = unplaced.iter().map(|m| m.identity().to_string()).collect();
            panic!(
                "module dependency graph is unresolvable (cycle or missing dependency): {}",
                stuck.join(", ")
            );
        }
        remaining = unplaced;
    }

    ResolvedOrder { modules: placed }
}
