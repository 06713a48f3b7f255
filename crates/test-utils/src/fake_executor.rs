use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nodeflow::engine::AbortSignal;
use nodeflow::errors::{NodeflowError, Result};
use nodeflow::exec::{ExecStatus, TaskExecutor};
use nodeflow::task::{TaskDescriptor, TaskRef};

/// Shared record of what a `FakeExecutor` ran, in start order.
pub type ExecutionLog = Arc<Mutex<Vec<TaskRef>>>;

/// A fake executor that:
/// - records which tasks were "run" (in the order they started)
/// - exits with a configured code per program (default 0)
/// - optionally sleeps per task, honouring the abort signal
/// - tracks the maximum number of tasks executing at once
pub struct FakeExecutor {
    executed: ExecutionLog,
    exit_codes: HashMap<String, i32>,
    unstartable: HashSet<String>,
    delay: Duration,
    running: Mutex<usize>,
    max_running: Arc<Mutex<usize>>,
}

impl FakeExecutor {
    pub fn new(executed: ExecutionLog) -> Self {
        Self {
            executed,
            exit_codes: HashMap::new(),
            unstartable: HashSet::new(),
            delay: Duration::ZERO,
            running: Mutex::new(0),
            max_running: Arc::new(Mutex::new(0)),
        }
    }

    /// Tasks whose program is `program` exit with `code`.
    pub fn with_exit_code(mut self, program: &str, code: i32) -> Self {
        self.exit_codes.insert(program.to_string(), code);
        self
    }

    /// Tasks whose program is `program` fail to start at all.
    pub fn with_unstartable(mut self, program: &str) -> Self {
        self.unstartable.insert(program.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Handle to the high-water mark of concurrently executing tasks.
    pub fn max_running(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.max_running)
    }

    fn enter(&self) {
        let mut running = self.running.lock().unwrap();
        *running += 1;
        let mut max = self.max_running.lock().unwrap();
        *max = (*max).max(*running);
    }

    fn leave(&self) {
        *self.running.lock().unwrap() -= 1;
    }
}

impl TaskExecutor for FakeExecutor {
    fn execute<'a>(
        &'a self,
        task: &'a TaskRef,
        descriptor: &'a TaskDescriptor,
        abort: &'a AbortSignal,
    ) -> Pin<Box<dyn Future<Output = Result<ExecStatus>> + Send + 'a>> {
        Box::pin(async move {
            if self.unstartable.contains(descriptor.program()) {
                return Err(NodeflowError::TaskSpawn {
                    path: task.path().to_path_buf(),
                    reason: "No such file or directory (os error 2)".to_string(),
                });
            }

            self.executed.lock().unwrap().push(task.clone());
            self.enter();

            if !self.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = abort.triggered() => {
                        self.leave();
                        return Err(NodeflowError::Cancelled);
                    }
                }
            }

            self.leave();
            let code = self
                .exit_codes
                .get(descriptor.program())
                .copied()
                .unwrap_or(0);
            Ok(ExecStatus::from_code(code))
        })
    }
}
