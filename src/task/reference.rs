// src/task/reference.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::DecodeError;

static NON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9]+").expect("non-digit regex is valid"));

/// Position of a task in the required start-order sequence.
///
/// Always strictly below the barrier's retired sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderIndex(u64);

impl OrderIndex {
    /// Largest index a task may carry.
    pub const MAX: u64 = (i64::MAX - 1) as u64;

    pub fn new(value: u64) -> Option<Self> {
        (value <= Self::MAX).then_some(Self(value))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Derive the index from a task file path.
    ///
    /// Every non-digit character is stripped from the final path segment
    /// (the whole file name, extension included) and the remaining digits
    /// are read as one number, so `tasks/1.17.txt` yields 117 and `a1b2`
    /// yields 12. Directory names never contribute.
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let digits = NON_DIGITS.replace_all(&name, "").into_owned();
        if digits.is_empty() {
            return Err(DecodeError::NoOrderIndex(name));
        }

        digits
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| DecodeError::OrderIndexOutOfRange(digits))
    }
}

impl fmt::Display for OrderIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One line of the task list: the path of a task file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskRef {
    path: PathBuf,
}

impl TaskRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn order_index(&self) -> Result<OrderIndex, DecodeError> {
        OrderIndex::from_path(&self.path)
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
