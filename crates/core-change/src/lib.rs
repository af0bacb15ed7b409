//! Replayable, invertible descriptions of content mutations.
//!
//! An `Operation` is the atomic primitive: an insertion or deletion of line
//! records at a cursor. A `Change` is an ordered list of operations applied
//! left-to-right and undone/redone together. Inversion is symmetric
//! (`Insertion.invert() == Deletion` with identical payload and vice versa),
//! which is what makes `undo = apply(invert(last))` and
//! `redo = apply(invert(undone))` exact.
//!
//! Coordinates are interpreted against the buffer state at the moment each
//! operation applies: a deletion's selection spans the text it removes, an
//! insertion's selection spans the text it has just produced.

use core_model::{Cursor, EditTarget, Selection};
use core_text::Line;
use tracing::trace;

/// Atomic content mutation over a cursor and replacement lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Insertion {
        cursor: Cursor,
        lines: Vec<Line>,
    },
    Deletion {
        cursor: Cursor,
        lines: Vec<Line>,
        /// Optionally supplied by callers that already know the deleted
        /// selection; asserted equal to the derived one. A mismatch is a
        /// caller bug, never a user-facing error.
        cached: Option<Selection>,
    },
}

impl Operation {
    pub fn insertion(cursor: Cursor, lines: Vec<Line>) -> Self {
        debug_assert!(!lines.is_empty(), "operations carry at least one line");
        Operation::Insertion { cursor, lines }
    }

    pub fn deletion(cursor: Cursor, lines: Vec<Line>) -> Self {
        debug_assert!(!lines.is_empty(), "operations carry at least one line");
        Operation::Deletion {
            cursor,
            lines,
            cached: None,
        }
    }

    /// Deletion with a precomputed selection shortcut.
    pub fn deletion_of(cursor: Cursor, lines: Vec<Line>, selection: Selection) -> Self {
        debug_assert!(!lines.is_empty(), "operations carry at least one line");
        Operation::Deletion {
            cursor,
            lines,
            cached: Some(selection),
        }
    }

    pub fn cursor(&self) -> Cursor {
        match self {
            Operation::Insertion { cursor, .. } | Operation::Deletion { cursor, .. } => *cursor,
        }
    }

    pub fn lines(&self) -> &[Line] {
        match self {
            Operation::Insertion { lines, .. } | Operation::Deletion { lines, .. } => lines,
        }
    }

    pub fn is_insertion(&self) -> bool {
        matches!(self, Operation::Insertion { .. })
    }

    /// The selection this operation spans, derived from `(cursor, lines)`:
    /// single-line payloads extend the cursor column, multi-line payloads end
    /// at the last line's length on the final covered row.
    pub fn selection(&self) -> Selection {
        let cursor = self.cursor();
        let lines = self.lines();
        let end = if lines.len() > 1 {
            Cursor::new(cursor.row + lines.len() - 1, lines[lines.len() - 1].len())
        } else {
            Cursor::new(cursor.row, cursor.col + lines[0].len())
        };
        let derived = Selection::new(cursor.settled(), end);
        if let Operation::Deletion {
            cached: Some(cached),
            ..
        } = self
        {
            debug_assert_eq!(
                cached.normalized(),
                derived.normalized(),
                "cached deletion selection must match the derived one"
            );
        }
        derived
    }

    /// Symmetric inversion: Insertion <-> Deletion over the same payload.
    pub fn invert(&self) -> Operation {
        match self {
            Operation::Insertion { cursor, lines } => Operation::Deletion {
                cursor: *cursor,
                lines: lines.clone(),
                cached: None,
            },
            Operation::Deletion { cursor, lines, .. } => Operation::Insertion {
                cursor: *cursor,
                lines: lines.clone(),
            },
        }
    }
}

/// Ordered list of operations applied together and undone together.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Change {
    ops: Vec<Operation>,
}

impl Change {
    pub fn new(ops: Vec<Operation>) -> Self {
        Self { ops }
    }

    pub fn single(op: Operation) -> Self {
        Self { ops: vec![op] }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Undo/redo pivot: reversed list with every element inverted.
    pub fn invert(&self) -> Change {
        Change {
            ops: self.ops.iter().rev().map(Operation::invert).collect(),
        }
    }

    /// Coalesce several changes into one (a debounce window's worth of
    /// keystrokes becomes a single undo unit).
    pub fn merge(changes: impl IntoIterator<Item = Change>) -> Change {
        let mut ops = Vec::new();
        for c in changes {
            ops.extend(c.ops);
        }
        trace!(target: "edit.history", ops = ops.len(), "change_merge");
        Change { ops }
    }

    /// Fold the operation selections into the net cursor-or-selection this
    /// change implies once applied. Touching spans merge into a running
    /// selection; a gap terminates the fold early and collapses the result to
    /// a zero-width cursor at the last operation's end. A fully collapsed
    /// result yields a bare cursor.
    pub fn target(&self) -> EditTarget {
        debug_assert!(!self.ops.is_empty(), "target of an empty change");
        let Some(first) = self.ops.first() else {
            return EditTarget::Cursor(Cursor::origin());
        };
        let mut running = first.selection();
        for op in &self.ops[1..] {
            let s = op.selection();
            if running.end == s.start {
                running = Selection::new(running.start, s.end);
            } else if s.end == running.start {
                running = Selection::new(s.start, running.end);
            } else {
                // Non-contiguous operations: keep only where the last one ends.
                let last = self.ops[self.ops.len() - 1].selection();
                running = Selection::caret(last.end);
                break;
            }
        }
        if running.is_empty() {
            EditTarget::Cursor(running.end)
        } else {
            EditTarget::Selection(running)
        }
    }
}
