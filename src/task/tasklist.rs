// src/task/tasklist.rs

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::errors::{NodeflowError, Result};
use crate::fs::FileSystem;
use crate::task::reference::{OrderIndex, TaskRef};

/// Things about a task list that are allowed but probably unintended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderingIssue {
    /// Two or more tasks derive the same order index.
    DuplicateIndex { index: OrderIndex, tasks: Vec<TaskRef> },
    /// Lexicographic queue order puts `later` (higher index) before `earlier`.
    SortMismatch { earlier: TaskRef, later: TaskRef },
}

/// Turn task-list text into queue order.
///
/// Lines are trimmed, blank lines dropped, and the rest sorted
/// lexicographically by path text. This is not the numeric order-index
/// order: `1.10.txt` sorts before `1.9.txt`.
pub fn parse_task_list(text: &str) -> Vec<TaskRef> {
    let mut lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    lines.sort_unstable();
    lines.into_iter().map(TaskRef::new).collect()
}

/// Read the task-list file and return the sorted references.
pub fn load_task_list(fs: &dyn FileSystem, path: &Path) -> Result<Vec<TaskRef>> {
    let text = fs.read_to_string(path).map_err(|e| {
        NodeflowError::ConfigError(format!(
            "cannot read task list {}: {e:#}",
            path.display()
        ))
    })?;

    let tasks = parse_task_list(&text);
    debug!(tasklist = %path.display(), count = tasks.len(), "loaded task list");

    for issue in ordering_issues(&tasks) {
        match issue {
            OrderingIssue::DuplicateIndex { index, tasks } => {
                let names: Vec<String> = tasks.iter().map(ToString::to_string).collect();
                warn!(order = %index, tasks = ?names, "duplicate order index in task list");
            }
            OrderingIssue::SortMismatch { earlier, later } => {
                warn!(
                    queued_first = %later,
                    queued_second = %earlier,
                    "lexicographic task list order disagrees with order index"
                );
            }
        }
    }

    Ok(tasks)
}

/// Report duplicate indices and the first spot where queue order and index
/// order disagree. References without a derivable index are skipped here;
/// they fail later, when a worker claims them.
pub fn ordering_issues(tasks: &[TaskRef]) -> Vec<OrderingIssue> {
    let indexed: Vec<(OrderIndex, &TaskRef)> = tasks
        .iter()
        .filter_map(|t| t.order_index().ok().map(|idx| (idx, t)))
        .collect();

    let mut issues = Vec::new();

    let mut by_index: HashMap<OrderIndex, Vec<TaskRef>> = HashMap::new();
    for (idx, task) in &indexed {
        by_index.entry(*idx).or_default().push((*task).clone());
    }
    let mut duplicates: Vec<(OrderIndex, Vec<TaskRef>)> = by_index
        .into_iter()
        .filter(|(_, tasks)| tasks.len() > 1)
        .collect();
    duplicates.sort_by_key(|(idx, _)| *idx);
    issues.extend(
        duplicates
            .into_iter()
            .map(|(index, tasks)| OrderingIssue::DuplicateIndex { index, tasks }),
    );

    if let Some(pair) = indexed.windows(2).find(|w| w[0].0 > w[1].0) {
        issues.push(OrderingIssue::SortMismatch {
            earlier: pair[1].1.clone(),
            later: pair[0].1.clone(),
        });
    }

    issues
}
