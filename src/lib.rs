// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod task;
pub mod types;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::EngineConfig;
use crate::engine::{Coordinator, RunSummary};
use crate::errors::Result;
use crate::exec::ProcessExecutor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::task::{load_task_list, TaskRef};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config resolution (file + flags) and validation
/// - task list loading
/// - coordinator + process executor
/// - Ctrl-C handling
///
/// Returns `None` for `--dry-run`, otherwise the summary of the run.
pub async fn run(args: CliArgs) -> Result<Option<RunSummary>> {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let cfg = config::resolve(&args, fs.as_ref())?;

    info!("starting node workflow");
    if let Ok(cwd) = std::env::current_dir() {
        info!(cwd = %cwd.display(), "executing in current directory");
    }

    if args.dry_run {
        let tasks = load_task_list(fs.as_ref(), &cfg.tasklist)?;
        print_dry_run(&cfg, &tasks);
        return Ok(None);
    }

    let executor = Arc::new(ProcessExecutor::new(cfg.shell.clone()));
    let coordinator = Coordinator::new(cfg.pool_options(), fs, executor);

    // Ctrl-C -> abort the pool.
    {
        let abort = coordinator.abort_signal();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            warn!("interrupt received; aborting");
            abort.trigger();
        });
    }

    let summary = coordinator.run_task_list(&cfg.tasklist).await?;
    Ok(Some(summary))
}

/// Simple dry-run output: print the config and each task with its index.
fn print_dry_run(cfg: &EngineConfig, tasks: &[TaskRef]) {
    println!("nodeflow dry-run");
    println!("  workers = {}", cfg.workers);
    println!("  tasklist = {}", cfg.tasklist.display());
    println!("  failure_policy = {:?}", cfg.failure_policy);
    println!("  poll_interval = {:?}", cfg.poll_interval);
    println!("  shell = {}", cfg.shell);
    println!();

    println!("tasks ({}), in queue order:", tasks.len());
    for task in tasks {
        match task.order_index() {
            Ok(idx) => println!("  - [{idx}] {task}"),
            Err(e) => println!("  - [error: {e}] {task}"),
        }
    }

    debug!("dry-run complete (no execution)");
}
