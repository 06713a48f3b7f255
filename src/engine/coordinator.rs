// src/engine/coordinator.rs

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::barrier::OrderingBarrier;
use super::queue::TaskQueue;
use super::signal::AbortSignal;
use super::summary::RunSummary;
use super::worker::{Worker, WorkerContext};
use super::WorkerEvent;
use crate::errors::{NodeflowError, Result};
use crate::exec::TaskExecutor;
use crate::fs::FileSystem;
use crate::task::{load_task_list, TaskRef};
use crate::types::FailurePolicy;

/// Pool settings the coordinator needs; usually taken from `EngineConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    pub workers: usize,
    pub failure_policy: FailurePolicy,
    /// Used both by the barrier's admission polling and the coordinator's
    /// completion polling.
    pub poll_interval: Duration,
}

/// Owns one run: fills the queue, spawns the workers, waits for every slot to
/// retire and collects the [`RunSummary`].
pub struct Coordinator<E: TaskExecutor> {
    options: PoolOptions,
    fs: Arc<dyn FileSystem>,
    executor: Arc<E>,
    abort: AbortSignal,
}

impl<E: TaskExecutor> Coordinator<E> {
    pub fn new(options: PoolOptions, fs: Arc<dyn FileSystem>, executor: Arc<E>) -> Self {
        Self {
            options,
            fs,
            executor,
            abort: AbortSignal::new(),
        }
    }

    /// Handle for raising the abort signal from outside (e.g. Ctrl-C).
    pub fn abort_signal(&self) -> AbortSignal {
        self.abort.clone()
    }

    /// Load `tasklist` through the coordinator's filesystem and run it.
    pub async fn run_task_list(self, tasklist: &Path) -> Result<RunSummary> {
        info!(tasklist = %tasklist.display(), "reading task list");
        let tasks = load_task_list(self.fs.as_ref(), tasklist)?;
        self.run(tasks).await
    }

    /// Run already-loaded references in the given queue order.
    pub async fn run(self, tasks: Vec<TaskRef>) -> Result<RunSummary> {
        let PoolOptions {
            workers,
            failure_policy,
            poll_interval,
        } = self.options;

        if workers == 0 {
            return Err(NodeflowError::ConfigError(
                "worker pool size must be greater than 0".to_string(),
            ));
        }

        let mut summary = RunSummary::new(tasks.len());
        let queue = Arc::new(TaskQueue::new(tasks));
        let barrier = Arc::new(OrderingBarrier::new(workers));
        info!(tasks = queue.len(), workers, policy = ?failure_policy, "task queue loaded");

        let ctx = Arc::new(WorkerContext {
            queue: Arc::clone(&queue),
            barrier: Arc::clone(&barrier),
            fs: Arc::clone(&self.fs),
            executor: Arc::clone(&self.executor),
            abort: self.abort.clone(),
            policy: failure_policy,
            poll_interval,
        });

        let (event_tx, mut event_rx) = mpsc::channel::<WorkerEvent>(64);

        info!(workers, "starting workers");
        let handles: Vec<_> = (0..workers)
            .map(|id| tokio::spawn(Worker::new(id, Arc::clone(&ctx), event_tx.clone()).run()))
            .collect();
        drop(event_tx);

        let finished = || {
            barrier.all_retired() && (queue.is_empty() || self.abort.is_triggered())
        };

        let mut ticker = tokio::time::interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    let retired = matches!(event, WorkerEvent::Retired { .. });
                    summary.record(event);
                    if retired && finished() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    debug!(queued = queue.len(), slots = ?barrier.snapshot(), "task queue size");
                    if finished() {
                        break;
                    }
                }
            }
        }

        // Ends once every worker has dropped its sender.
        while let Some(event) = event_rx.recv().await {
            summary.record(event);
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| NodeflowError::Other(anyhow!("worker task failed: {e}")))?;
        }

        summary.unprocessed = queue.drain_remaining();
        summary.aborted = self.abort.is_triggered();
        summary.log();

        Ok(summary)
    }
}
