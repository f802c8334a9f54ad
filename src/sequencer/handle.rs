//! # Initialization completion interface.
//!
//! Each module's initializer receives an [`InitHandle`]: the cloneable,
//! `Send` channel through which the module reports fractional progress and
//! its one completion, and through which it may cooperatively suspend its
//! own timeout while waiting on a legitimate long-running external
//! operation.
//!
//! Worker threads hold handle clones and report results without touching
//! core state; every call is a non-blocking channel send marshaled onto the
//! sequencer's loop.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

/// Failure a module reports through [`InitHandle::done`].
#[derive(Clone, Debug, Error)]
#[error("{reason}")]
pub struct InitFailure {
    /// Human-readable failure reason.
    pub reason: Arc<str>,
}

impl InitFailure {
    /// Creates a failure with the given reason.
    pub fn new(reason: impl Into<Arc<str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Message a module sends back to the sequencer.
pub(crate) enum InitSignal {
    /// Fractional progress of the current module, in `[0, 1]`.
    Progress(f32),
    /// The module's one completion report.
    Done(Result<(), InitFailure>),
    /// Cooperative timeout opt-out.
    SuspendTimeout,
    /// Re-arms a fresh, full timeout.
    ResumeTimeout,
}

/// Completion interface handed to a module's initializer.
///
/// Cloneable and `Send`: move clones into worker tasks freely. All
/// operations are tagged with the module's run index, so late signals from
/// an already-completed module can never be mistaken for the current one.
#[derive(Clone)]
pub struct InitHandle {
    index: usize,
    module: Arc<str>,
    tx: mpsc::UnboundedSender<(usize, InitSignal)>,
}

impl InitHandle {
    pub(crate) fn new(
        index: usize,
        module: Arc<str>,
        tx: mpsc::UnboundedSender<(usize, InitSignal)>,
    ) -> Self {
        Self { index, module, tx }
    }

    /// Name of the module this handle belongs to.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Reports fractional progress in `[0, 1]`.
    ///
    /// Recomputes and republishes the aggregated loading progress; does not
    /// advance the sequencer.
    pub fn progress(&self, fraction: f32) {
        self.send(InitSignal::Progress(fraction));
    }

    /// Reports the module's completion.
    ///
    /// Must be called **exactly once** per run; a second completion for the
    /// same run index is a fatal programming error. A failure result stops
    /// the whole run.
    pub fn done(&self, result: Result<(), InitFailure>) {
        self.send(InitSignal::Done(result));
    }

    /// Shorthand for a successful [`done`](Self::done).
    pub fn ok(&self) {
        self.done(Ok(()));
    }

    /// Shorthand for a failed [`done`](Self::done).
    pub fn fail(&self, reason: impl Into<Arc<str>>) {
        self.done(Err(InitFailure::new(reason)));
    }

    /// Cooperatively suspends this module's initialization timeout.
    ///
    /// An explicit opt-out for legitimate long-running external work; the
    /// module must later call [`resume_timeout`](Self::resume_timeout)
    /// (or complete).
    pub fn suspend_timeout(&self) {
        self.send(InitSignal::SuspendTimeout);
    }

    /// Resumes the timeout suspended by
    /// [`suspend_timeout`](Self::suspend_timeout), re-armed from scratch.
    pub fn resume_timeout(&self) {
        self.send(InitSignal::ResumeTimeout);
    }

    fn send(&self, signal: InitSignal) {
        // The run may already be over (failure elsewhere, timeout); late
        // signals are dropped here exactly like a trigger after teardown.
        let _ = self.tx.send((self.index, signal));
    }
}
