// src/engine/summary.rs

use tracing::{error, info, warn};

use super::{FailureKind, TaskFailure, TaskOutcome, WorkerEvent, WorkerId};
use crate::task::{OrderIndex, TaskRef};

/// One pass through the barrier, in the order the coordinator saw them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub worker: WorkerId,
    pub order: OrderIndex,
    pub task: TaskRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub worker: WorkerId,
    pub task: TaskRef,
    pub outcome: TaskOutcome,
}

/// Everything the coordinator learned about one run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Number of references loaded into the queue.
    pub total: usize,
    pub admissions: Vec<Admission>,
    pub records: Vec<TaskRecord>,
    /// References never dequeued (only non-empty after an abort).
    pub unprocessed: Vec<TaskRef>,
    pub retired_workers: usize,
    pub aborted: bool,
}

impl RunSummary {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn record(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::TaskAdmitted {
                worker,
                task,
                order,
            } => self.admissions.push(Admission {
                worker,
                order,
                task,
            }),
            WorkerEvent::TaskFinished {
                worker,
                task,
                outcome,
            } => self.records.push(TaskRecord {
                worker,
                task,
                outcome,
            }),
            WorkerEvent::Retired { .. } => self.retired_workers += 1,
        }
    }

    /// Order indices in admission order.
    pub fn admission_order(&self) -> Vec<u64> {
        self.admissions.iter().map(|a| a.order.get()).collect()
    }

    pub fn succeeded(&self) -> usize {
        self.records.iter().filter(|r| r.outcome.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&TaskRef, &TaskFailure)> {
        self.records.iter().filter_map(|r| match &r.outcome {
            TaskOutcome::Failed(f) => Some((&r.task, f)),
            TaskOutcome::Success => None,
        })
    }

    pub fn failed(&self) -> usize {
        self.failures()
            .filter(|(_, f)| f.kind != FailureKind::Cancelled)
            .count()
    }

    pub fn cancelled(&self) -> usize {
        self.failures()
            .filter(|(_, f)| f.kind == FailureKind::Cancelled)
            .count()
    }

    pub fn outcome_of(&self, task: &TaskRef) -> Option<&TaskOutcome> {
        self.records
            .iter()
            .find(|r| &r.task == task)
            .map(|r| &r.outcome)
    }

    pub fn is_success(&self) -> bool {
        !self.aborted && self.failures().next().is_none()
    }

    /// Process exit code for this run: 0 on success, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }

    pub fn log(&self) {
        for (task, failure) in self.failures() {
            error!(task = %task, kind = ?failure.kind, "{}", failure.message);
        }
        if !self.unprocessed.is_empty() {
            warn!(
                count = self.unprocessed.len(),
                "tasks left unprocessed after abort"
            );
        }
        info!(
            total = self.total,
            succeeded = self.succeeded(),
            failed = self.failed(),
            cancelled = self.cancelled(),
            unprocessed = self.unprocessed.len(),
            aborted = self.aborted,
            "finished node workflow"
        );
    }
}
