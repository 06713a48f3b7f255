// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeflowError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The task could not be turned into something runnable. Order index
    /// failures land here as well.
    #[error("Task decode error in {}: {source}", .path.display())]
    TaskDecode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    /// The task program ran but did not exit successfully.
    ///
    /// `code` is `None` when the process was terminated by a signal.
    #[error(
        "Task execution error in {}: program exited with {}",
        .path.display(),
        describe_code(.code)
    )]
    TaskExecution { path: PathBuf, code: Option<i32> },

    #[error("Task execution error in {}: could not start program: {reason}", .path.display())]
    TaskSpawn { path: PathBuf, reason: String },

    #[error("Cancelled: run was aborted")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Reasons a task reference or task file could not be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field 'program' is empty")]
    EmptyProgram,

    #[error("file name '{0}' contains no numeric order index")]
    NoOrderIndex(String),

    #[error("order index '{0}' is out of range")]
    OrderIndexOutOfRange(String),

    #[error("unreadable task file: {0}")]
    Unreadable(String),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, NodeflowError>;
