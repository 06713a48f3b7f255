// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] defines the `TaskExecutor` trait workers call into; tests
//!   replace it with a fake that never spawns processes.
//! - [`process`] is the production implementation, running the task's
//!   command line through a shell with `tokio::process::Command`.

pub mod backend;
pub mod process;

pub use backend::{ExecStatus, TaskExecutor};
pub use process::ProcessExecutor;
