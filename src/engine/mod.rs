// src/engine/mod.rs

//! Execution engine for one task list on one node.
//!
//! - [`queue`] holds the shared FIFO of task references.
//! - [`barrier`] is the start-order gate (one slot per worker).
//! - [`worker`] runs the per-worker state machine.
//! - [`coordinator`] owns the pool lifecycle and builds the [`RunSummary`].
//! - [`signal`] is the pool-wide abort flag.

use crate::errors::{DecodeError, NodeflowError};
use crate::task::{OrderIndex, TaskRef};

/// Index of a worker in the pool, `0..workers`.
pub type WorkerId = usize;

/// Broad category of a task failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Order index, unreadable file, or missing descriptor field.
    Decode,
    /// Non-zero exit, signal death, or the program could not be started.
    Execution,
    /// The task was interrupted by the abort signal.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Underlying decode reason for `FailureKind::Decode`.
    pub decode: Option<DecodeError>,
}

impl From<&NodeflowError> for TaskFailure {
    fn from(err: &NodeflowError) -> Self {
        let (kind, decode) = match err {
            NodeflowError::TaskDecode { source, .. } => (FailureKind::Decode, Some(source.clone())),
            NodeflowError::Cancelled => (FailureKind::Cancelled, None),
            _ => (FailureKind::Execution, None),
        };
        Self {
            kind,
            message: err.to_string(),
            decode,
        }
    }
}

impl TaskFailure {
    pub fn is_order_index_error(&self) -> bool {
        matches!(
            self.decode,
            Some(DecodeError::NoOrderIndex(_) | DecodeError::OrderIndexOutOfRange(_))
        )
    }
}

/// Result of one task, as reported to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(TaskFailure),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Events sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The worker passed the barrier and is about to decode and run the task.
    TaskAdmitted {
        worker: WorkerId,
        task: TaskRef,
        order: OrderIndex,
    },
    /// The task reached a terminal outcome.
    TaskFinished {
        worker: WorkerId,
        task: TaskRef,
        outcome: TaskOutcome,
    },
    /// The worker will not take further tasks.
    Retired { worker: WorkerId },
}

/// Convenience for building decode errors tied to a task path.
pub(crate) fn decode_error(task: &TaskRef, source: DecodeError) -> NodeflowError {
    NodeflowError::TaskDecode {
        path: task.path().to_path_buf(),
        source,
    }
}

pub mod barrier;
pub mod coordinator;
pub mod queue;
pub mod signal;
pub mod summary;
pub mod worker;

pub use barrier::{OrderingBarrier, SlotState};
pub use coordinator::{Coordinator, PoolOptions};
pub use queue::TaskQueue;
pub use signal::AbortSignal;
pub use summary::{Admission, RunSummary, TaskRecord};
pub use worker::{Worker, WorkerState};
pub use crate::types::FailurePolicy;
