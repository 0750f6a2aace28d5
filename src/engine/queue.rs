// src/engine/queue.rs

use std::collections::BTreeSet;

use crate::types::TaskKind;

/// Tasks triggered while already running.
///
/// Any number of re-triggers during one run collapse into a single pending
/// rerun, which starts when the current run completes.
#[derive(Debug, Default, Clone)]
pub struct TriggerQueue {
    pending: BTreeSet<TaskKind>,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_trigger(&mut self, task: TaskKind) {
        self.pending.insert(task);
    }

    /// Remove `task` from the queue, returning whether it was pending.
    pub fn take(&mut self, task: TaskKind) -> bool {
        self.pending.remove(&task)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
