// src/config/mod.rs

//! Configuration loading and validation for nodeflow.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load an optional config file and layer CLI flags on top (`loader.rs`).
//! - Validate pool size, poll interval, shell and task list (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, resolve};
pub use model::{EngineConfig, RawConfigFile, RawEngineConfig};
pub use validate::validate_config;
