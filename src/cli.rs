// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::RawEngineConfig;
use crate::types::FailurePolicy;

/// Command-line arguments for `nodeflow`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "nodeflow",
    version,
    about = "Run a node's task list across a pool of workers, starting tasks in order-index order.",
    long_about = None
)]
pub struct CliArgs {
    /// Number of workers to launch.
    #[arg(short = 'n', long, visible_alias = "numthreads", value_name = "N")]
    pub workers: Option<usize>,

    /// Task list file: one task file path per line.
    #[arg(short = 't', long, value_name = "PATH")]
    pub tasklist: Option<PathBuf>,

    /// Optional TOML config file with an `[engine]` section.
    ///
    /// Flags given on the command line override values from the file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// What to do when a task fails (default: continue).
    #[arg(long, value_enum, value_name = "POLICY")]
    pub failure_policy: Option<FailurePolicy>,

    /// Barrier and completion polling interval in milliseconds (default: 1000).
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Shell used to run task command lines (default: sh).
    #[arg(long, value_name = "SHELL")]
    pub shell: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `NODEFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate, print tasks with their order index, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Engine settings given as flags, in the shape of the `[engine]` section.
    pub fn to_raw_config(&self) -> RawEngineConfig {
        RawEngineConfig {
            workers: self.workers,
            tasklist: self.tasklist.clone(),
            failure_policy: self.failure_policy,
            poll_interval_ms: self.poll_interval_ms,
            shell: self.shell.clone(),
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_original_short_flags() {
        let args = CliArgs::parse_from(["nodeflow", "-n", "8", "-t", "tasklists/tasklist0.txt"]);
        assert_eq!(args.workers, Some(8));
        assert_eq!(args.tasklist, Some(PathBuf::from("tasklists/tasklist0.txt")));
        assert!(!args.dry_run);
    }

    #[test]
    fn parses_policy_and_alias() {
        let args = CliArgs::parse_from([
            "nodeflow",
            "--numthreads",
            "2",
            "--failure-policy",
            "abort",
            "--poll-interval-ms",
            "10",
        ]);
        let raw = args.to_raw_config();
        assert_eq!(raw.workers, Some(2));
        assert_eq!(raw.failure_policy, Some(FailurePolicy::Abort));
        assert_eq!(raw.poll_interval_ms, Some(10));
    }
}
