//! Error types used by the module host runtime.
//!
//! This module defines the two checked error enums:
//!
//! - [`DeclareError`] — failures while declaring modules into the registry.
//! - [`RunError`] — failures reported by an initialization run.
//!
//! Both provide helper methods (`as_label`, `as_message`) for logs.
//!
//! Unrecoverable lifecycle corruption — a dependency cycle, a module
//! completing twice, subscription misuse — is **not** represented here: those
//! are programming errors and panic, terminating the process loudly rather
//! than continuing with corrupted lifecycle state.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::modules::ModuleId;

/// # Errors produced while declaring modules.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DeclareError {
    /// No factory (override, default, or fallback) knows how to construct
    /// the requested identity. Aborts the declaration of the module that
    /// required it.
    #[error("no factory mapping for module '{id}'")]
    ModuleNotFound {
        /// The identity nobody could construct.
        id: ModuleId,
    },
}

impl DeclareError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use modhost::{DeclareError, ModuleId};
    ///
    /// let err = DeclareError::ModuleNotFound { id: ModuleId::component("epg") };
    /// assert_eq!(err.as_label(), "module_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DeclareError::ModuleNotFound { .. } => "module_not_found",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DeclareError::ModuleNotFound { id } => format!("no factory mapping for '{id}'"),
        }
    }
}

/// # Errors produced by an initialization run.
///
/// Both variants are recoverable at the host level: the sequencer stops and
/// reports which module failed and why; the host decides whether to retry
/// the whole run, degrade, or present an error.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RunError {
    /// A module's completion callback reported a failure.
    #[error("module '{module}' failed to initialize: {reason}")]
    InitFailed {
        /// The module that reported failure.
        module: ModuleId,
        /// The failure reason it reported.
        reason: Arc<str>,
    },

    /// A module's initialization timeout elapsed without completion.
    ///
    /// Nothing actively interrupts the module's in-flight work; it simply
    /// stops being waited on.
    #[error("module '{module}' timed out after {timeout:?}")]
    TimedOut {
        /// The module that never completed.
        module: ModuleId,
        /// The timeout that elapsed.
        timeout: Duration,
    },
}

impl RunError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    /// use modhost::{ModuleId, RunError};
    ///
    /// let err = RunError::TimedOut {
    ///     module: ModuleId::component("epg"),
    ///     timeout: Duration::from_secs(30),
    /// };
    /// assert_eq!(err.as_label(), "init_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RunError::InitFailed { .. } => "init_failed",
            RunError::TimedOut { .. } => "init_timeout",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RunError::InitFailed { module, reason } => {
                format!("'{module}' failed: {reason}")
            }
            RunError::TimedOut { module, timeout } => {
                format!("'{module}' timed out after {timeout:?}")
            }
        }
    }

    /// The module the run stopped on.
    pub fn module(&self) -> &ModuleId {
        match self {
            RunError::InitFailed { module, .. } | RunError::TimedOut { module, .. } => module,
        }
    }
}
