//! Undo/redo bookkeeping.
//!
//! The undo and redo deques hold *inverted* changes: applying an entry as-is
//! performs the undo (or redo). Moving an entry between stacks therefore pops
//! it, applies it, and pushes its inverse on the opposite stack.
//!
//! New edits land in a pending queue first and only reach the undo stack when
//! the queue drains (debounce window expiry or an explicit drain), merged into
//! one change. That is what makes a burst of keystrokes a single undo step.

use core_change::Change;
use std::collections::VecDeque;
use tracing::trace;

pub struct History {
    undo: VecDeque<Change>,
    redo: VecDeque<Change>,
    pending: Vec<Change>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            pending: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Queue a freshly applied change. Any redoable future is now stale.
    pub fn enqueue(&mut self, change: Change) {
        self.redo.clear();
        self.pending.push(change);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Merge and clear the pending queue. `None` when nothing is pending.
    pub fn drain_pending(&mut self) -> Option<Change> {
        if self.pending.is_empty() {
            return None;
        }
        let merged = Change::merge(self.pending.drain(..));
        trace!(
            target: "edit.history",
            ops = merged.operations().len(),
            "pending_drained"
        );
        Some(merged)
    }

    /// Push an inverted change, dropping the oldest entry past the limit.
    pub fn push_undo(&mut self, change: Change) {
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(change);
    }

    pub fn push_redo(&mut self, change: Change) {
        self.redo.push_back(change);
    }

    pub fn pop_undo(&mut self) -> Option<Change> {
        self.undo.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<Change> {
        self.redo.pop_back()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.pending.clear();
    }
}
