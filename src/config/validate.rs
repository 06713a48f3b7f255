// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{EngineConfig, RawEngineConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_SHELL};
use crate::errors::{NodeflowError, Result};
use crate::fs::{FileSystem, RealFileSystem};

impl TryFrom<RawEngineConfig> for EngineConfig {
    type Error = NodeflowError;

    fn try_from(raw: RawEngineConfig) -> std::result::Result<Self, Self::Error> {
        validate_config(raw, &RealFileSystem)
    }
}

/// Turn a merged raw config into an [`EngineConfig`], checking the task list
/// against `fs`.
pub fn validate_config(raw: RawEngineConfig, fs: &dyn FileSystem) -> Result<EngineConfig> {
    let workers = validate_workers(raw.workers)?;
    let poll_interval = validate_poll_interval(raw.poll_interval_ms)?;
    let shell = validate_shell(raw.shell)?;

    let tasklist = raw.tasklist.ok_or_else(|| {
        NodeflowError::ConfigError("a task list file is required (-t/--tasklist)".to_string())
    })?;
    if tasklist.as_os_str().is_empty() {
        return Err(NodeflowError::ConfigError(
            "task list path must not be empty".to_string(),
        ));
    }
    if !fs.is_file(&tasklist) {
        return Err(NodeflowError::ConfigError(format!(
            "task list {} does not exist or is not a file",
            tasklist.display()
        )));
    }

    Ok(EngineConfig {
        workers,
        tasklist,
        failure_policy: raw.failure_policy.unwrap_or_default(),
        poll_interval,
        shell,
    })
}

fn validate_workers(workers: Option<usize>) -> Result<usize> {
    match workers {
        None => Err(NodeflowError::ConfigError(
            "number of workers is required (-n/--workers)".to_string(),
        )),
        Some(0) => Err(NodeflowError::ConfigError(
            "number of workers must be greater than 0".to_string(),
        )),
        Some(n) => Ok(n),
    }
}

fn validate_poll_interval(ms: Option<u64>) -> Result<Duration> {
    match ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS) {
        0 => Err(NodeflowError::ConfigError(
            "poll_interval_ms must be >= 1 (got 0)".to_string(),
        )),
        ms => Ok(Duration::from_millis(ms)),
    }
}

fn validate_shell(shell: Option<String>) -> Result<String> {
    let shell = shell.unwrap_or_else(|| DEFAULT_SHELL.to_string());
    if shell.trim().is_empty() {
        return Err(NodeflowError::ConfigError("shell must not be empty".to_string()));
    }
    Ok(shell)
}
