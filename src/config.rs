//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the module host runtime.
//!
//! ## Sentinel values
//! - `init_timeout = 0s` → no per-module timeout (treated as `None` by
//!   [`Config::init_timeout_opt`]).

use std::sync::Arc;
use std::time::Duration;

/// Global configuration for the module host runtime.
///
/// ## Field semantics
/// - `init_timeout`: per-module initialization timeout (`0s` = no timeout);
///   a module may cooperatively suspend it through its
///   [`InitHandle`](crate::InitHandle)
/// - `platform_bus_name`: diagnostic label of the platform-wide bus
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors over
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time one module may take to report initialization
    /// completion before the run is aborted with a timeout.
    ///
    /// - `Duration::ZERO` = no timeout
    /// - `> 0` = applied per module, re-armed from scratch on
    ///   `resume_timeout`
    pub init_timeout: Duration,

    /// Label of the platform-wide notification bus (diagnostics only).
    pub platform_bus_name: Arc<str>,
}

impl Config {
    /// Returns the per-module timeout as an `Option`.
    ///
    /// - `None` → no timeout
    /// - `Some(d)` → timeout applied per module
    #[inline]
    pub fn init_timeout_opt(&self) -> Option<Duration> {
        if self.init_timeout == Duration::ZERO {
            None
        } else {
            Some(self.init_timeout)
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `init_timeout = 30s` (generous for set-top-box boot phases)
    /// - `platform_bus_name = "platform"`
    fn default() -> Self {
        Self {
            init_timeout: Duration::from_secs(30),
            platform_bus_name: Arc::from("platform"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_timeout_means_none() {
        let mut cfg = Config::default();
        cfg.init_timeout = Duration::ZERO;
        assert_eq!(cfg.init_timeout_opt(), None);

        cfg.init_timeout = Duration::from_secs(5);
        assert_eq!(cfg.init_timeout_opt(), Some(Duration::from_secs(5)));
    }
}
