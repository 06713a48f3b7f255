// src/exec/backend.rs

//! Pluggable executor abstraction.

use std::future::Future;
use std::pin::Pin;

use crate::engine::AbortSignal;
use crate::errors::Result;
use crate::task::{TaskDescriptor, TaskRef};

/// How a task program ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecStatus {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,
}

impl ExecStatus {
    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs one decoded task to completion.
///
/// Implementations return `Err` only when the program could not be run at
/// all (`TaskSpawn`) or was interrupted (`Cancelled`); a program that ran and
/// failed is an `Ok(ExecStatus)` with a non-zero code.
pub trait TaskExecutor: Send + Sync + 'static {
    fn execute<'a>(
        &'a self,
        task: &'a TaskRef,
        descriptor: &'a TaskDescriptor,
        abort: &'a AbortSignal,
    ) -> Pin<Box<dyn Future<Output = Result<ExecStatus>> + Send + 'a>>;
}
