//! # Module abstractions: identity, dependencies, and the module contract.
//!
//! This module provides the types every feature module is built from:
//! - [`ModuleId`], [`ModuleKind`] - typed identity (registry lookup key)
//! - [`DependencySet`] - the categorized dependencies declared at construction
//! - [`Module`], [`ModuleRef`] - the contract and its shared handle
//! - [`ModuleFn`] - function-backed module implementation

mod deps;
mod identity;
mod module;
mod module_fn;

pub use deps::DependencySet;
pub use identity::{ModuleId, ModuleKind};
pub use module::{Module, ModuleRef};
pub use module_fn::ModuleFn;
