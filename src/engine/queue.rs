// src/engine/queue.rs

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::task::TaskRef;

/// Shared FIFO of task references, filled once at startup and drained by
/// all workers.
///
/// Each reference is handed out at most once: `try_next` pops under the lock.
/// `is_empty` is only a snapshot; callers must not assume a following
/// `try_next` succeeds.
#[derive(Debug, Default)]
pub struct TaskQueue {
    inner: Mutex<VecDeque<TaskRef>>,
}

impl TaskQueue {
    pub fn new(tasks: impl IntoIterator<Item = TaskRef>) -> Self {
        Self {
            inner: Mutex::new(tasks.into_iter().collect()),
        }
    }

    /// Pop the next reference, or `None` when nothing is left.
    pub fn try_next(&self) -> Option<TaskRef> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return everything still queued (used after an abort).
    pub fn drain_remaining(&self) -> Vec<TaskRef> {
        self.lock().drain(..).collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<TaskRef>> {
        // The deque is never left half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
