#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use tokio::time::timeout;
use tracing_subscriber::{fmt, EnvFilter};

use nodeflow::engine::{Coordinator, PoolOptions, RunSummary};
use nodeflow::fs::mock::MockFileSystem;
use nodeflow::task::TaskRef;
use nodeflow::types::FailurePolicy;
use nodeflow_test_utils::{ExecutionLog, FakeExecutor};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Pool options with a short poll interval so tests finish quickly.
pub fn fast_options(workers: usize, failure_policy: FailurePolicy) -> PoolOptions {
    PoolOptions {
        workers,
        failure_policy,
        poll_interval: Duration::from_millis(2),
    }
}

pub fn new_log() -> ExecutionLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn executed(log: &ExecutionLog) -> Vec<String> {
    log.lock().unwrap().iter().map(TaskRef::to_string).collect()
}

/// Run the task list at `tasklist` on `fs` and fail the test if it hangs.
pub async fn run_pool(
    fs: MockFileSystem,
    tasklist: &Path,
    executor: FakeExecutor,
    options: PoolOptions,
) -> RunSummary {
    let coordinator = Coordinator::new(options, Arc::new(fs), Arc::new(executor));
    timeout(Duration::from_secs(10), coordinator.run_task_list(tasklist))
        .await
        .expect("pool did not finish within 10 seconds")
        .expect("pool returned an error")
}
