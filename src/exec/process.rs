// src/exec/process.rs

//! Real task process runner.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::backend::{ExecStatus, TaskExecutor};
use crate::engine::AbortSignal;
use crate::errors::{NodeflowError, Result};
use crate::task::{TaskDescriptor, TaskRef};

/// Runs `<program> <parameters>` through a shell, waiting for it to exit.
///
/// Child stdout is inherited so simulation output goes straight to the
/// engine's stdout; stderr is forwarded into the log line by line.
#[derive(Debug, Clone)]
pub struct ProcessExecutor {
    shell: String,
}

impl ProcessExecutor {
    /// `shell` is invoked as `<shell> -c <command line>`. On Windows the
    /// command always goes through `cmd /C`.
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    fn build_command(&self, line: &str) -> Command {
        if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(line);
            c
        } else {
            let mut c = Command::new(&self.shell);
            c.arg("-c").arg(line);
            c
        }
    }

    async fn run(
        &self,
        task: &TaskRef,
        descriptor: &TaskDescriptor,
        abort: &AbortSignal,
    ) -> Result<ExecStatus> {
        let line = descriptor.command_line();
        info!(task = %task, cmd = %line, "starting task process");

        let mut cmd = self.build_command(&line);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| NodeflowError::TaskSpawn {
            path: task.path().to_path_buf(),
            reason: e.to_string(),
        })?;

        // Always consume stderr so the pipe never fills up.
        if let Some(stderr) = child.stderr.take() {
            let task_name = task.to_string();
            tokio::spawn(async move {
                let reader = BufReader::new(stderr);
                let mut lines = reader.lines();

                while let Ok(Some(line)) = lines.next_line().await {
                    info!(task = %task_name, "stderr: {}", line);
                }
            });
        }

        tokio::select! {
            status_res = child.wait() => {
                let status = status_res.map_err(|e| NodeflowError::TaskSpawn {
                    path: task.path().to_path_buf(),
                    reason: format!("waiting for process: {e}"),
                })?;

                let exec_status = ExecStatus { code: status.code() };
                info!(
                    task = %task,
                    exit_code = ?exec_status.code,
                    success = exec_status.success(),
                    "task process exited"
                );
                Ok(exec_status)
            }

            _ = abort.triggered() => {
                info!(task = %task, "abort requested; killing task process");
                if let Err(e) = child.kill().await {
                    warn!(task = %task, error = %e, "failed to kill task process");
                } else {
                    debug!(task = %task, "task process killed");
                }
                Err(NodeflowError::Cancelled)
            }
        }
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl TaskExecutor for ProcessExecutor {
    fn execute<'a>(
        &'a self,
        task: &'a TaskRef,
        descriptor: &'a TaskDescriptor,
        abort: &'a AbortSignal,
    ) -> Pin<Box<dyn Future<Output = Result<ExecStatus>> + Send + 'a>> {
        Box::pin(self.run(task, descriptor, abort))
    }
}
