// src/config/loader.rs

use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{EngineConfig, RawConfigFile, RawEngineConfig};
use crate::config::validate::validate_config;
use crate::errors::{NodeflowError, Result};
use crate::fs::FileSystem;

/// Load a configuration file and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; semantic checks happen in
/// [`validate_config`] once CLI flags have been layered on top.
pub fn load_from_path(fs: &dyn FileSystem, path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs.read_to_string(path).map_err(|e| {
        NodeflowError::ConfigError(format!("cannot read config file {}: {e:#}", path.display()))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Build the effective configuration for one invocation:
///
/// - built-in defaults,
/// - then `[engine]` from `--config` (if given),
/// - then explicit CLI flags,
///
/// and validate the result.
pub fn resolve(args: &CliArgs, fs: &dyn FileSystem) -> Result<EngineConfig> {
    let from_file = match &args.config {
        Some(path) => load_from_path(fs, path)?.engine,
        None => RawEngineConfig::default(),
    };

    let merged = from_file.merge(args.to_raw_config());
    validate_config(merged, fs)
}
