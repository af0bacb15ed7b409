//! Navigation layer: the single source of truth for caret and selection.
//!
//! `InputTarget` owns the live cursor/selection and the codepoint buffer and
//! implements every movement/selection algorithm, independent of how edits
//! happen. The edit engine mutates the buffer through `document_mut` and
//! hands the resulting cursor-or-selection back through the same funnel UI
//! navigation uses (`set_target`), so status publishing and scroll-follow
//! behave identically for both paths.
//!
//! Word boundaries come from an injected oracle (default backed by
//! `unicode-segmentation`) intersected with a fixed punctuation break set;
//! the walk degrades column-by-column when the oracle reports a
//! non-advancing boundary, terminating at 0 or the line length.

use std::ops::Range;
use std::sync::Arc;

use core_model::{Cursor, EditTarget, Selection};
use core_text::{Document, words};
use tracing::trace;

mod motions;

/// Movement direction along the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Movement granularity. Paragraph degrades to line start/end because the
/// buffer does not soft-wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Char,
    Word,
    Paragraph,
    Line,
    Page,
}

/// Line/document edge for home/end style movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Mutually exclusive drag-selection modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Char,
    Word,
    Line,
    /// Line-number gutter drag: whole lines including their breaks.
    Gutter,
}

/// Word-boundary oracle supplied by the layout/rendering collaborator.
/// Offsets are UTF-8 bytes within one line.
pub trait BoundaryOracle: Send + Sync {
    fn word_range(&self, line: &str, byte: usize) -> Range<usize>;
}

/// Default oracle over `unicode-segmentation` word bounds.
#[derive(Debug, Default)]
pub struct SegmentationOracle;

impl BoundaryOracle for SegmentationOracle {
    fn word_range(&self, line: &str, byte: usize) -> Range<usize> {
        words::segment_at(line, byte)
    }
}

/// Consumes "caret moved" notifications (status bar position display).
pub trait StatusSink: Send + Sync {
    fn cursor_status(&self, target: &EditTarget);
}

/// Consumes "reveal the caret" requests after movement.
pub trait ScrollSink: Send + Sync {
    fn reveal(&self, cursor: Cursor);
}

struct NoopSink;

impl StatusSink for NoopSink {
    fn cursor_status(&self, _target: &EditTarget) {}
}

impl ScrollSink for NoopSink {
    fn reveal(&self, _cursor: Cursor) {}
}

struct DragState {
    mode: DragMode,
    /// Selection captured when the drag was armed; word/line drags take
    /// coverage with it so either direction extends from the anchor.
    origin: Selection,
}

/// Owns the document buffer plus the live cursor/selection.
pub struct InputTarget {
    doc: Document,
    cursor: Cursor,
    selection: Option<Selection>,
    drag: Option<DragState>,
    /// Last known viewport height in rows, set by the host for page motions.
    page_rows: usize,
    oracle: Arc<dyn BoundaryOracle>,
    status: Arc<dyn StatusSink>,
    scroll: Arc<dyn ScrollSink>,
}

impl InputTarget {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            cursor: Cursor::origin(),
            selection: None,
            drag: None,
            page_rows: 20,
            oracle: Arc::new(SegmentationOracle),
            status: Arc::new(NoopSink),
            scroll: Arc::new(NoopSink),
        }
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn BoundaryOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn with_status_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.status = sink;
        self
    }

    pub fn with_scroll_sink(mut self, sink: Arc<dyn ScrollSink>) -> Self {
        self.scroll = sink;
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Edit-engine access to the buffer. Callers must re-publish the cursor
    /// through `set_target` after mutating.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Current cursor-or-selection.
    pub fn target(&self) -> EditTarget {
        match self.selection {
            Some(s) => EditTarget::Selection(s),
            None => EditTarget::Cursor(self.cursor),
        }
    }

    pub fn set_page_rows(&mut self, rows: usize) {
        self.page_rows = rows.max(1);
    }

    fn clamped(&self, c: Cursor) -> Cursor {
        let row = c.row.min(self.doc.last_row());
        let col = c.col.min(self.doc.line_len(row));
        Cursor::with_last(row, col, c.last_col)
    }

    /// The single mutation funnel: updates cursor/selection, publishes the
    /// new position, and optionally asks the host to reveal the caret.
    pub fn set_target(&mut self, target: EditTarget, scroll: bool) {
        match target {
            EditTarget::Cursor(c) => {
                self.cursor = self.clamped(c);
                self.selection = None;
            }
            EditTarget::Selection(s) => {
                let s = Selection::new(self.clamped(s.start), self.clamped(s.end));
                self.cursor = s.end;
                self.selection = if s.is_empty() { None } else { Some(s) };
            }
        }
        trace!(
            target: "nav.motion",
            row = self.cursor.row,
            col = self.cursor.col,
            selecting = self.selection.is_some(),
            "set_target"
        );
        let published = self.target();
        self.status.cursor_status(&published);
        if scroll {
            self.scroll.reveal(self.cursor);
        }
    }

    // ---------------------------------------------------------------------
    // Movement
    // ---------------------------------------------------------------------

    pub fn move_cursor(&mut self, dir: Direction, by: Granularity, selecting: bool) {
        // Collapsing a selection with a plain movement lands at its boundary,
        // not one step further.
        if !selecting && let Some(sel) = self.selection {
            let bound = match dir {
                Direction::Prev => sel.min(),
                Direction::Next => sel.max(),
            };
            self.set_target(EditTarget::Cursor(bound.settled()), true);
            return;
        }
        let from = self.cursor;
        let to = match by {
            Granularity::Char => self.char_step(from, dir),
            Granularity::Word => self.word_step(from, dir),
            Granularity::Paragraph => self.paragraph_step(from, dir),
            Granularity::Line => self.vertical_step(from, dir, 1),
            Granularity::Page => self.vertical_step(from, dir, self.page_rows),
        };
        self.finish_move(from, to, selecting);
    }

    /// Smart home/end: first press goes to the first/last non-space column;
    /// a second press goes to the absolute line edge.
    pub fn move_to_line_edge(&mut self, edge: Edge, selecting: bool) {
        if !selecting && let Some(sel) = self.selection {
            let bound = match edge {
                Edge::Start => sel.min(),
                Edge::End => sel.max(),
            };
            self.set_target(EditTarget::Cursor(bound.settled()), true);
            return;
        }
        let from = self.cursor;
        let line_len = self.doc.line_len(from.row);
        let col = match edge {
            Edge::Start => {
                let first = self
                    .doc
                    .line(from.row)
                    .map(|l| l.first_non_space())
                    .unwrap_or(0);
                if from.col == first { 0 } else { first.min(line_len) }
            }
            Edge::End => {
                let last = self
                    .doc
                    .line(from.row)
                    .map(|l| l.last_non_space_end())
                    .unwrap_or(0);
                if from.col == last { line_len } else { last }
            }
        };
        self.finish_move(from, Cursor::new(from.row, col), selecting);
    }

    pub fn move_to_document_edge(&mut self, edge: Edge, selecting: bool) {
        let from = self.cursor;
        let to = match edge {
            Edge::Start => Cursor::origin(),
            Edge::End => {
                let row = self.doc.last_row();
                Cursor::new(row, self.doc.line_len(row))
            }
        };
        self.finish_move(from, to, selecting);
    }

    fn finish_move(&mut self, from: Cursor, to: Cursor, selecting: bool) {
        if selecting {
            let anchor = self.selection.map(|s| s.start).unwrap_or(from);
            self.set_target(EditTarget::Selection(Selection::new(anchor, to)), true);
        } else {
            self.set_target(EditTarget::Cursor(to), true);
        }
    }

    // ---------------------------------------------------------------------
    // Selection helpers
    // ---------------------------------------------------------------------

    pub fn select_all(&mut self) {
        let row = self.doc.last_row();
        let all = Selection::new(Cursor::origin(), Cursor::new(row, self.doc.line_len(row)));
        self.set_target(EditTarget::Selection(all), false);
    }

    pub fn select_none(&mut self) {
        self.set_target(EditTarget::Cursor(self.cursor), false);
    }

    pub fn select_word(&mut self) {
        let sel = self.selection_of_word(self.cursor);
        self.set_target(EditTarget::Selection(sel), false);
    }

    /// Word selection around a caret, via the boundary oracle. At the line
    /// end the preceding word is selected.
    pub fn selection_of_word(&self, at: Cursor) -> Selection {
        let at = self.clamped(at);
        let Some(line) = self.doc.line(at.row) else {
            return Selection::caret(at);
        };
        let col = if at.col == line.len() && at.col > 0 {
            at.col - 1
        } else {
            at.col
        };
        let range = self.oracle.word_range(line.as_str(), line.char_to_byte(col));
        let start = line.byte_to_char(range.start);
        let end = line.byte_to_char(range.end);
        Selection::new(Cursor::new(at.row, start), Cursor::new(at.row, end.max(start)))
    }

    /// A whole line plus its trailing break, or to the line end when it is
    /// the last line.
    pub fn selection_of_line_and_break(&self, row: usize) -> Selection {
        let row = row.min(self.doc.last_row());
        if row == self.doc.last_row() {
            Selection::new(Cursor::new(row, 0), Cursor::new(row, self.doc.line_len(row)))
        } else {
            Selection::new(Cursor::new(row, 0), Cursor::new(row + 1, 0))
        }
    }

    /// The line above plus its break: `(row-1, 0) .. (row, 0)`.
    pub fn selection_of_previous_line_and_break(&self, row: usize) -> Option<Selection> {
        if row == 0 {
            return None;
        }
        Some(Selection::new(Cursor::new(row - 1, 0), Cursor::new(row, 0)))
    }

    /// The break after `row` plus the following line:
    /// `(row, len) .. (row+1, len(row+1))`.
    pub fn selection_of_next_break_and_line(&self, row: usize) -> Option<Selection> {
        if row >= self.doc.last_row() {
            return None;
        }
        Some(Selection::new(
            Cursor::new(row, self.doc.line_len(row)),
            Cursor::new(row + 1, self.doc.line_len(row + 1)),
        ))
    }

    /// Normalize a selection to the whole lines it covers. A multi-line
    /// selection ending at column 0 does not pull in that final row.
    pub fn selection_of_line_content(&self, sel: Selection) -> Selection {
        let (min, max) = (sel.min(), sel.max());
        let last_row = if max.col == 0 && max.row > min.row {
            max.row - 1
        } else {
            max.row
        };
        Selection::new(
            Cursor::new(min.row, 0),
            Cursor::new(last_row, self.doc.line_len(last_row)),
        )
    }

    /// Columns shifted by signed deltas, clamped at zero. Rows unchanged.
    pub fn selection_shifted_by(
        &self,
        sel: Selection,
        start_delta: isize,
        end_delta: isize,
    ) -> Selection {
        let shift = |c: Cursor, d: isize| {
            let col = c.col.saturating_add_signed(d);
            Cursor::new(c.row, col)
        };
        Selection::new(shift(sel.start, start_delta), shift(sel.end, end_delta))
    }

    // ---------------------------------------------------------------------
    // Drag selection
    // ---------------------------------------------------------------------

    /// Arm a drag. Word/line/gutter modes capture the selection at the drag
    /// origin so later `drag_to` calls can extend from it in either
    /// direction.
    pub fn begin_drag(&mut self, mode: DragMode) {
        let origin = match mode {
            DragMode::Char => Selection::caret(self.cursor),
            DragMode::Word => self.selection_of_word(self.cursor),
            DragMode::Line | DragMode::Gutter => self.selection_of_line_and_break(self.cursor.row),
        };
        if mode != DragMode::Char {
            self.set_target(EditTarget::Selection(origin), false);
        }
        self.drag = Some(DragState { mode, origin });
    }

    /// Advance the active drag to a document position (the host converts
    /// pointer geometry to row/column).
    pub fn drag_to(&mut self, row: usize, col: usize) {
        let Some(drag) = &self.drag else {
            return;
        };
        let point = self.clamped(Cursor::new(row, col));
        let sel = match drag.mode {
            DragMode::Char => Selection::new(drag.origin.start, point),
            DragMode::Word => oriented_coverage(drag.origin, self.selection_of_word(point), point),
            DragMode::Line | DragMode::Gutter => {
                oriented_coverage(drag.origin, self.selection_of_line_and_break(point.row), point)
            }
        };
        self.set_target(EditTarget::Selection(sel), true);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

/// Coverage of the drag origin with the selection at the drag point, oriented
/// so the caret sits at the dragged end.
fn oriented_coverage(origin: Selection, at_point: Selection, point: Cursor) -> Selection {
    let cov = Selection::coverage(origin, at_point);
    if point < origin.min() {
        Selection::new(cov.max(), cov.min())
    } else {
        cov.normalized()
    }
}

#[cfg(test)]
mod tests;
