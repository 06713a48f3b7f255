// src/engine/barrier.rs

//! Start-order gate shared by all workers.
//!
//! Every worker owns one slot. A worker writes the order index of the task it
//! is about to run into its slot (`claim`) and may only start once its slot
//! holds the smallest value among all slots that are not retired (`admit`).
//! The result is the guarantee "index k starts only after every index < k
//! has at least started". Since the lowest claimed worker is the only one
//! admitted, execution is effectively serial in index order; the pool size
//! decides how many tasks sit pre-claimed behind it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use tracing::{trace, warn};

use super::signal::AbortSignal;
use super::WorkerId;
use crate::errors::{NodeflowError, Result};
use crate::task::OrderIndex;

/// Slot value before a worker's first claim. Lower than every index, so a
/// worker that has not claimed yet holds everyone back until it claims or
/// retires.
pub const UNCLAIMED: i64 = -1;

/// Slot value of a retired worker; excluded from the minimum.
pub const RETIRED: i64 = i64::MAX;

/// Decoded view of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Unclaimed,
    Claimed(OrderIndex),
    Retired,
}

impl SlotState {
    fn from_raw(raw: i64) -> Self {
        match raw {
            UNCLAIMED => SlotState::Unclaimed,
            RETIRED => SlotState::Retired,
            n => OrderIndex::new(n as u64)
                .map(SlotState::Claimed)
                .unwrap_or(SlotState::Retired),
        }
    }
}

#[derive(Debug)]
pub struct OrderingBarrier {
    slots: Box<[AtomicI64]>,
}

impl OrderingBarrier {
    /// One `UNCLAIMED` slot per worker.
    pub fn new(workers: usize) -> Self {
        let slots = (0..workers).map(|_| AtomicI64::new(UNCLAIMED)).collect();
        Self { slots }
    }

    pub fn workers(&self) -> usize {
        self.slots.len()
    }

    /// Record the index of the task `worker` is about to run.
    pub fn claim(&self, worker: WorkerId, index: OrderIndex) {
        let slot = &self.slots[worker];
        if slot.load(Ordering::SeqCst) == RETIRED {
            warn!(worker, order = %index, "retired worker tried to claim a task; ignoring");
            return;
        }
        // OrderIndex::MAX < RETIRED, so the cast never produces the sentinel.
        slot.store(index.get() as i64, Ordering::SeqCst);
        trace!(worker, order = %index, "slot claimed");
    }

    /// Smallest value among non-retired slots, or `None` if all are retired.
    pub fn current_min(&self) -> Option<i64> {
        self.slots
            .iter()
            .map(|s| s.load(Ordering::SeqCst))
            .filter(|&v| v != RETIRED)
            .min()
    }

    /// The admission predicate: own slot is claimed and equals the minimum.
    pub fn is_admissible(&self, worker: WorkerId) -> bool {
        let own = self.slots[worker].load(Ordering::SeqCst);
        if own == RETIRED || own == UNCLAIMED {
            return false;
        }
        self.current_min() == Some(own)
    }

    /// Wait until `worker` may start, re-checking every `poll_interval`.
    ///
    /// The check reads other slots without locking; a stale read only delays
    /// admission to the next poll. Returns `NodeflowError::Cancelled` once
    /// `abort` is raised.
    pub async fn admit(
        &self,
        worker: WorkerId,
        poll_interval: Duration,
        abort: &AbortSignal,
    ) -> Result<()> {
        loop {
            if abort.is_triggered() {
                return Err(NodeflowError::Cancelled);
            }
            if self.is_admissible(worker) {
                return Ok(());
            }

            trace!(worker, min = ?self.current_min(), "waiting for lower order indices to start");

            tokio::select! {
                _ = tokio::time::sleep(poll_interval) => {}
                _ = abort.triggered() => return Err(NodeflowError::Cancelled),
            }
        }
    }

    /// Mark `worker` as finished for good. Only the first call has an effect.
    pub fn retire(&self, worker: WorkerId) {
        let previous = self.slots[worker].swap(RETIRED, Ordering::SeqCst);
        if previous == RETIRED {
            warn!(worker, "worker retired twice");
        } else {
            trace!(worker, "slot retired");
        }
    }

    pub fn all_retired(&self) -> bool {
        self.slots
            .iter()
            .all(|s| s.load(Ordering::SeqCst) == RETIRED)
    }

    pub fn snapshot(&self) -> Vec<SlotState> {
        self.slots
            .iter()
            .map(|s| SlotState::from_raw(s.load(Ordering::SeqCst)))
            .collect()
    }
}
