// src/engine/worker.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

use super::barrier::OrderingBarrier;
use super::queue::TaskQueue;
use super::signal::AbortSignal;
use super::{decode_error, FailureKind, TaskFailure, TaskOutcome, WorkerEvent, WorkerId};
use crate::errors::{DecodeError, NodeflowError, Result};
use crate::exec::TaskExecutor;
use crate::fs::FileSystem;
use crate::task::{OrderIndex, TaskDescriptor, TaskRef};
use crate::types::FailurePolicy;

/// Where a worker is in its per-task cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Claimed(OrderIndex),
    Admitted,
    Running,
    Done,
    Retired,
}

impl WorkerState {
    /// Legal transitions. Any in-flight state may fall back to `Idle` when
    /// the task fails.
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        matches!(
            (self, next),
            (Idle, Claimed(_))
                | (Idle, Retired)
                | (Claimed(_), Admitted)
                | (Admitted, Running)
                | (Running, Done)
                | (Done, Idle)
                | (Claimed(_), Idle)
                | (Admitted, Idle)
                | (Running, Idle)
        )
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "idle"),
            WorkerState::Claimed(idx) => write!(f, "claimed({idx})"),
            WorkerState::Admitted => write!(f, "admitted"),
            WorkerState::Running => write!(f, "running"),
            WorkerState::Done => write!(f, "done"),
            WorkerState::Retired => write!(f, "retired"),
        }
    }
}

/// State shared by every worker of one pool.
#[derive(Debug)]
pub struct WorkerContext<E> {
    pub queue: Arc<TaskQueue>,
    pub barrier: Arc<OrderingBarrier>,
    pub fs: Arc<dyn FileSystem>,
    pub executor: Arc<E>,
    pub abort: AbortSignal,
    pub policy: FailurePolicy,
    pub poll_interval: Duration,
}

/// Retires the slot if the worker goes away without doing it (e.g. a panic),
/// so the coordinator never waits on a dead worker.
struct RetireGuard {
    barrier: Arc<OrderingBarrier>,
    worker: WorkerId,
    armed: bool,
}

impl RetireGuard {
    fn retire(mut self) {
        self.armed = false;
        self.barrier.retire(self.worker);
    }
}

impl Drop for RetireGuard {
    fn drop(&mut self) {
        if self.armed {
            warn!(worker = self.worker, "worker exited abnormally; retiring its slot");
            self.barrier.retire(self.worker);
        }
    }
}

pub struct Worker<E> {
    id: WorkerId,
    state: WorkerState,
    ctx: Arc<WorkerContext<E>>,
    events: mpsc::Sender<WorkerEvent>,
}

impl<E: TaskExecutor> Worker<E> {
    pub fn new(id: WorkerId, ctx: Arc<WorkerContext<E>>, events: mpsc::Sender<WorkerEvent>) -> Self {
        Self {
            id,
            state: WorkerState::Idle,
            ctx,
            events,
        }
    }

    /// Drain the queue until it is empty or the pool is aborted, then retire.
    pub async fn run(mut self) {
        let guard = RetireGuard {
            barrier: Arc::clone(&self.ctx.barrier),
            worker: self.id,
            armed: true,
        };

        loop {
            if self.ctx.abort.is_triggered() {
                debug!(worker = self.id, "abort raised; taking no further tasks");
                break;
            }

            let Some(task) = self.ctx.queue.try_next() else {
                info!(worker = self.id, "worker quitting because the task queue is empty");
                break;
            };

            let outcome = match self.process(&task).await {
                Ok(()) => TaskOutcome::Success,
                Err(err) => {
                    let failure = TaskFailure::from(&err);
                    if failure.kind == FailureKind::Cancelled {
                        warn!(worker = self.id, task = %task, "task cancelled by abort");
                    } else {
                        error!(worker = self.id, task = %task, error = %err, "task failed");
                    }
                    TaskOutcome::Failed(failure)
                }
            };

            let abort_pool = matches!(
                &outcome,
                TaskOutcome::Failed(f) if f.kind != FailureKind::Cancelled
            ) && self.ctx.policy == FailurePolicy::Abort;

            self.send(WorkerEvent::TaskFinished {
                worker: self.id,
                task,
                outcome,
            })
            .await;

            if abort_pool {
                warn!(worker = self.id, "failure policy is abort; stopping the pool");
                self.ctx.abort.trigger();
            }

            // An order index failure never leaves Idle.
            if self.state != WorkerState::Idle {
                self.transition(WorkerState::Idle);
            }
        }

        self.transition(WorkerState::Retired);
        guard.retire();
        self.send(WorkerEvent::Retired { worker: self.id }).await;
    }

    /// Claim, admit, decode and execute one task.
    async fn process(&mut self, task: &TaskRef) -> Result<()> {
        let order = task
            .order_index()
            .map_err(|source| decode_error(task, source))?;

        self.ctx.barrier.claim(self.id, order);
        self.transition(WorkerState::Claimed(order));

        self.ctx
            .barrier
            .admit(self.id, self.ctx.poll_interval, &self.ctx.abort)
            .await?;
        self.transition(WorkerState::Admitted);

        info!(worker = self.id, task = %task, order = %order, "running task");
        self.send(WorkerEvent::TaskAdmitted {
            worker: self.id,
            task: task.clone(),
            order,
        })
        .await;

        let descriptor = self.decode(task)?;
        self.transition(WorkerState::Running);

        debug!(
            worker = self.id,
            task = %task,
            program = descriptor.program(),
            parameters = descriptor.parameters(),
            "calling program"
        );

        let status = self
            .ctx
            .executor
            .execute(task, &descriptor, &self.ctx.abort)
            .await?;

        if !status.success() {
            return Err(NodeflowError::TaskExecution {
                path: task.path().to_path_buf(),
                code: status.code,
            });
        }

        self.transition(WorkerState::Done);
        info!(worker = self.id, task = %task, "task finished");
        Ok(())
    }

    fn decode(&self, task: &TaskRef) -> Result<TaskDescriptor> {
        let text = self
            .ctx
            .fs
            .read_to_string(task.path())
            .map_err(|e| decode_error(task, DecodeError::Unreadable(format!("{e:#}"))))?;
        TaskDescriptor::parse(&text).map_err(|source| decode_error(task, source))
    }

    fn transition(&mut self, next: WorkerState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal worker transition {} -> {}",
            self.state,
            next
        );
        trace!(worker = self.id, from = %self.state, to = %next, "worker state");
        self.state = next;
    }

    async fn send(&self, event: WorkerEvent) {
        if self.events.send(event).await.is_err() {
            debug!(worker = self.id, "coordinator gone; dropping worker event");
        }
    }
}
