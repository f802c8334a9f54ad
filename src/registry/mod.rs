//! # Module registry and dependency resolution.
//!
//! This module contains the declare-and-wire machinery:
//! - [`Registry`] - the live collection and recursive declaration
//! - [`ModuleFactory`], [`FactoryTable`], [`FactoryRef`] - pluggable
//!   construction by identity
//! - [`resolve`], [`ResolvedOrder`] - the dependency-respecting
//!   initialization order

mod factory;
#[allow(clippy::module_inception)]
mod registry;
mod resolver;

pub use factory::{FactoryRef, FactoryTable, ModuleFactory};
pub use registry::Registry;
pub use resolver::{resolve, ResolvedOrder};
