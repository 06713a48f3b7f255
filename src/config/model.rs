// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::PoolOptions;
use crate::types::FailurePolicy;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_SHELL: &str = "sh";

/// Top-level configuration file.
///
/// ```toml
/// [engine]
/// workers = 8
/// tasklist = "tasklists/tasklist0.txt"
/// failure_policy = "abort"
/// poll_interval_ms = 250
/// shell = "bash"
/// ```
///
/// Every key is optional here; whatever is still missing after the CLI
/// flags are applied is reported by validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: RawEngineConfig,
}

/// `[engine]` section, also the shape CLI flags are mapped into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEngineConfig {
    /// Number of workers in the pool.
    pub workers: Option<usize>,

    /// Path of the task-list file.
    pub tasklist: Option<PathBuf>,

    /// `"continue"` (default) or `"abort"`.
    pub failure_policy: Option<FailurePolicy>,

    /// How often waiting workers re-check the barrier, and how often the
    /// coordinator checks for completion.
    pub poll_interval_ms: Option<u64>,

    /// Shell used to run task command lines.
    pub shell: Option<String>,
}

impl RawEngineConfig {
    /// Layer `overrides` on top of `self`; set fields in `overrides` win.
    pub fn merge(self, overrides: RawEngineConfig) -> Self {
        Self {
            workers: overrides.workers.or(self.workers),
            tasklist: overrides.tasklist.or(self.tasklist),
            failure_policy: overrides.failure_policy.or(self.failure_policy),
            poll_interval_ms: overrides.poll_interval_ms.or(self.poll_interval_ms),
            shell: overrides.shell.or(self.shell),
        }
    }
}

/// Validated engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub workers: usize,
    pub tasklist: PathBuf,
    pub failure_policy: FailurePolicy,
    pub poll_interval: Duration,
    pub shell: String,
}

impl EngineConfig {
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            workers: self.workers,
            failure_policy: self.failure_policy,
            poll_interval: self.poll_interval,
        }
    }
}
