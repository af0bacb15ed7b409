//! The edit engine: applies changes to the buffer, derives structural edits
//! from primitive insert/delete, and owns the debounced undo/redo history.
//!
//! All engine state lives in one `EngineInner` behind an `Arc<Mutex<_>>`
//! shared with debounce timer firings; the edit-apply path and the timer
//! drain path run under the same critical section, so a timer firing
//! concurrently with an explicit drain cannot double-drain. Timer elections
//! use an atomic in-flight counter: each edit arms a fresh window, and only
//! the firing that decrements the counter to zero performs the drain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use core_change::{Change, Operation};
use core_find::TextFinder;
use core_model::{Cursor, EditTarget, Selection};
use core_nav::InputTarget;
use core_text::{Document, Line, lines_of};
use tracing::trace;

use crate::TextProcessor;
use crate::hooks::{DebounceScheduler, EditHooks, ThreadScheduler};
use crate::history::History;
use crate::options::EditOptions;

/// Everything the edit path and the timer path share.
struct EngineInner {
    target: InputTarget,
    finder: TextFinder,
    history: History,
    hooks: EditHooks,
    options: EditOptions,
    last_warning: Option<Instant>,
}

/// The lines a normalized selection covers: suffix of the first row, whole
/// middle rows, prefix of the last row.
fn text_of_selection(doc: &Document, span: Selection) -> Vec<Line> {
    let (a, b) = (span.min(), span.max());
    let Some(first) = doc.line(a.row) else {
        return vec![Line::empty()];
    };
    if a.row == b.row {
        return vec![first.subsequence_safely(a.col, b.col)];
    }
    let mut out = Vec::with_capacity(b.row - a.row + 1);
    out.push(first.subsequence_safely(a.col, first.len()));
    for row in a.row + 1..b.row {
        out.push(doc.line(row).cloned().unwrap_or_default());
    }
    let last = doc.line(b.row).cloned().unwrap_or_default();
    out.push(last.subsequence_safely(0, b.col));
    out
}

/// Row range a change touches, for highlight/render invalidation.
fn touched_rows(change: &Change) -> std::ops::Range<usize> {
    let mut lo = usize::MAX;
    let mut hi = 0usize;
    for op in change.operations() {
        let s = op.selection().normalized();
        lo = lo.min(s.start.row);
        hi = hi.max(s.end.row + 1);
    }
    if lo == usize::MAX { 0..0 } else { lo..hi }
}

/// Cursor-or-selection to restore after replaying a change. A net insertion
/// restores the span of what appeared; a net deletion collapses to a caret at
/// the span's start, since the spanned text no longer exists.
fn restore_target(change: &Change) -> EditTarget {
    let target = change.target();
    match change.operations().last() {
        Some(op) if !op.is_insertion() => {
            EditTarget::Cursor(target.as_selection().min().settled())
        }
        _ => target,
    }
}

impl EngineInner {
    fn new(doc: Document, options: EditOptions) -> Self {
        Self {
            target: InputTarget::new(doc),
            finder: TextFinder::new(),
            history: History::new(options.undo_limit),
            hooks: EditHooks::default(),
            options,
            last_warning: None,
        }
    }

    // -----------------------------------------------------------------
    // Buffer mutation primitives
    // -----------------------------------------------------------------

    fn apply_operation(&mut self, op: &Operation) {
        match op {
            Operation::Insertion { cursor, lines } => self.apply_insertion(*cursor, lines),
            Operation::Deletion { cursor, lines, .. } => self.apply_deletion(*cursor, lines),
        }
    }

    fn apply_change(&mut self, change: &Change) {
        for op in change.operations() {
            self.apply_operation(op);
        }
    }

    /// Splice inserted lines into the buffer. A multi-line payload splits the
    /// target row into prefix+first and last+suffix, with middle lines
    /// inserted verbatim between them.
    fn apply_insertion(&mut self, cursor: Cursor, lines: &[Line]) {
        debug_assert!(!lines.is_empty(), "insertions carry at least one line");
        let row = cursor.row;
        let Some(line) = self.target.document().line(row).cloned() else {
            return;
        };
        let col = cursor.col.min(line.len());
        if lines.len() == 1 {
            let spliced = line.inserted(col, lines[0].as_str());
            self.target.document_mut().replace_line(row, spliced);
            self.hooks.render.invalidate_rows(row..row + 1);
        } else {
            let prefix = line.subsequence_safely(0, col);
            let suffix = line.subsequence_safely(col, line.len());
            let first = prefix.concat(&lines[0]);
            let mut tail: Vec<Line> = lines[1..lines.len() - 1].to_vec();
            tail.push(lines[lines.len() - 1].concat(&suffix));
            {
                let doc = self.target.document_mut();
                doc.replace_line(row, first);
                doc.insert_lines(row + 1, tail);
            }
            self.hooks.render.insert_rows(row + 1, lines.len() - 1);
            self.hooks.render.invalidate_rows(row..row + lines.len());
        }
        trace!(target: "edit.apply", row, col, rows = lines.len(), "insert");
    }

    /// Remove the span the payload covers. A deletion spanning rows keeps the
    /// start row's prefix and the end row's suffix, joined into one line, and
    /// drops the rows between.
    fn apply_deletion(&mut self, cursor: Cursor, lines: &[Line]) {
        debug_assert!(!lines.is_empty(), "deletions carry at least one line");
        let row = cursor.row;
        let col = cursor.col;
        #[cfg(debug_assertions)]
        {
            let end = if lines.len() > 1 {
                Cursor::new(row + lines.len() - 1, lines[lines.len() - 1].len())
            } else {
                Cursor::new(row, col + lines[0].len())
            };
            let span = Selection::new(Cursor::new(row, col), end);
            debug_assert_eq!(
                text_of_selection(self.target.document(), span),
                lines,
                "deletion payload must match the buffer text it removes"
            );
        }
        let Some(start_line) = self.target.document().line(row).cloned() else {
            return;
        };
        if lines.len() == 1 {
            let cut = col + lines[0].len();
            let spliced = start_line
                .subsequence_safely(0, col)
                .concat(&start_line.subsequence_safely(cut, start_line.len()));
            self.target.document_mut().replace_line(row, spliced);
            self.hooks.render.invalidate_rows(row..row + 1);
        } else {
            let end_row = row + lines.len() - 1;
            let end_col = lines[lines.len() - 1].len();
            let end_line = self
                .target
                .document()
                .line(end_row)
                .cloned()
                .unwrap_or_default();
            let joined = start_line
                .subsequence_safely(0, col)
                .concat(&end_line.subsequence_safely(end_col, end_line.len()));
            {
                let doc = self.target.document_mut();
                doc.remove_lines(row + 1..(end_row + 1).min(doc.line_count()));
                doc.replace_line(row, joined);
            }
            self.hooks.render.remove_rows(row + 1, lines.len() - 1);
            self.hooks.render.invalidate_rows(row..row + 1);
        }
        trace!(target: "edit.apply", row, col, rows = lines.len(), "delete");
    }

    // -----------------------------------------------------------------
    // History
    // -----------------------------------------------------------------

    /// Merge pending edits into one undo entry and notify collaborators.
    /// Runs under the engine lock from both the timer path and explicit
    /// drains.
    fn drain(&mut self) {
        let Some(merged) = self.history.drain_pending() else {
            return;
        };
        let rows = touched_rows(&merged);
        self.history.push_undo(merged.invert());
        self.hooks.highlighter.invalidate(rows);
        self.hooks
            .persistence
            .content_changed(&self.target.document().flatten());
        self.refresh_finder();
        trace!(
            target: "edit.history",
            undo = self.history.undo_depth(),
            "drain"
        );
    }

    fn refresh_finder(&mut self) {
        if self.finder.pattern().is_some() {
            self.finder.compute_all_matches(self.target.document());
        }
    }

    fn undo(&mut self) -> bool {
        // Explicit undo finalizes the in-flight burst first.
        self.drain();
        let Some(change) = self.history.pop_undo() else {
            return false;
        };
        self.apply_change(&change);
        self.target.set_target(restore_target(&change), true);
        self.history.push_redo(change.invert());
        self.after_replay(&change);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(change) = self.history.pop_redo() else {
            return false;
        };
        self.apply_change(&change);
        self.target.set_target(restore_target(&change), true);
        self.history.push_undo(change.invert());
        self.after_replay(&change);
        true
    }

    /// Post-replay collaborator refresh. Replayed changes never re-enter the
    /// pending queue; they move between the two stacks directly.
    fn after_replay(&mut self, change: &Change) {
        self.hooks.highlighter.invalidate(touched_rows(change));
        self.hooks
            .persistence
            .content_changed(&self.target.document().flatten());
        self.refresh_finder();
    }

    /// Rate-limited "document is read-only" warning: at most one per
    /// debounce window, so holding a key down does not spam the host.
    fn warn_not_writable(&mut self) {
        let now = Instant::now();
        let due = self
            .last_warning
            .is_none_or(|at| now.duration_since(at) >= self.options.debounce_window);
        if due {
            self.hooks.notifications.not_writable();
            self.last_warning = Some(now);
        }
    }

    // -----------------------------------------------------------------
    // Edits. Each builder applies its operations, repositions the live
    // cursor/selection, and returns the change for the pending queue.
    // -----------------------------------------------------------------

    fn insert_text(&mut self, text: &str) -> Option<Change> {
        let mut ops = Vec::new();
        if let Some(sel) = self.target.selection() {
            let span = sel.normalized();
            if !span.is_empty() {
                let removed = text_of_selection(self.target.document(), span);
                let del = Operation::deletion_of(span.start.settled(), removed, span);
                self.apply_operation(&del);
                ops.push(del);
            }
            self.target
                .set_target(EditTarget::Cursor(span.start.settled()), false);
        }
        if !text.is_empty() {
            let at = self.target.cursor().settled();
            let ins = Operation::insertion(at, lines_of(text));
            self.apply_operation(&ins);
            let caret = ins.selection().end;
            ops.push(ins);
            self.target.set_target(EditTarget::Cursor(caret), true);
        }
        if ops.is_empty() { None } else { Some(Change::new(ops)) }
    }

    /// Line break with auto-indent: the new line starts at
    /// `min(cursor col, leading spaces) / tab_size` whole indentation stops.
    fn insert_new_line(&mut self) -> Option<Change> {
        let at = match self.target.selection() {
            Some(s) => s.normalized().start,
            None => self.target.cursor(),
        };
        let leading = self
            .target
            .document()
            .line(at.row)
            .map(|l| l.leading_spaces())
            .unwrap_or(0);
        let tab = self.options.tab_size.max(1);
        let stops = at.col.min(leading) / tab;
        let mut text = String::with_capacity(1 + stops * tab);
        text.push('\n');
        for _ in 0..stops * tab {
            text.push(' ');
        }
        self.insert_text(&text)
    }

    fn delete_selection(&mut self) -> Option<Change> {
        let sel = self.target.selection()?;
        let span = sel.normalized();
        if span.is_empty() {
            self.target
                .set_target(EditTarget::Cursor(span.start.settled()), false);
            return None;
        }
        let removed = text_of_selection(self.target.document(), span);
        let del = Operation::deletion_of(span.start.settled(), removed, span);
        self.apply_operation(&del);
        self.target
            .set_target(EditTarget::Cursor(span.start.settled()), true);
        Some(Change::single(del))
    }

    fn delete_backward(&mut self) -> Option<Change> {
        if self.target.selection().is_some() {
            return self.delete_selection();
        }
        let at = self.target.cursor();
        if at.col > 0 {
            let line = self.target.document().line(at.row)?;
            let removed = line.subsequence_safely(at.col - 1, at.col);
            let del = Operation::deletion(Cursor::new(at.row, at.col - 1), vec![removed]);
            self.apply_operation(&del);
            self.target
                .set_target(EditTarget::Cursor(Cursor::new(at.row, at.col - 1)), true);
            Some(Change::single(del))
        } else if at.row > 0 {
            // Join with the previous line: the payload spans just the break.
            let prev_len = self.target.document().line_len(at.row - 1);
            let del = Operation::deletion(
                Cursor::new(at.row - 1, prev_len),
                vec![Line::empty(), Line::empty()],
            );
            self.apply_operation(&del);
            self.target
                .set_target(EditTarget::Cursor(Cursor::new(at.row - 1, prev_len)), true);
            Some(Change::single(del))
        } else {
            None
        }
    }

    fn delete_forward(&mut self) -> Option<Change> {
        if self.target.selection().is_some() {
            return self.delete_selection();
        }
        let at = self.target.cursor();
        let len = self.target.document().line_len(at.row);
        if at.col < len {
            let line = self.target.document().line(at.row)?;
            let removed = line.subsequence_safely(at.col, at.col + 1);
            let del = Operation::deletion(at.settled(), vec![removed]);
            self.apply_operation(&del);
            self.target.set_target(EditTarget::Cursor(at.settled()), true);
            Some(Change::single(del))
        } else if at.row < self.target.document().last_row() {
            let del = Operation::deletion(
                Cursor::new(at.row, len),
                vec![Line::empty(), Line::empty()],
            );
            self.apply_operation(&del);
            self.target.set_target(EditTarget::Cursor(at.settled()), true);
            Some(Change::single(del))
        } else {
            None
        }
    }

    /// Duplicate the selection (reselecting the inserted copy) or the current
    /// line (cursor follows its line down).
    fn duplicate(&mut self) -> Option<Change> {
        if let Some(sel) = self.target.selection()
            && !sel.normalized().is_empty()
        {
            let span = sel.normalized();
            let lines = text_of_selection(self.target.document(), span);
            let ins = Operation::insertion(span.start.settled(), lines);
            self.apply_operation(&ins);
            let copy = ins.selection();
            let restored = if sel.is_forward() {
                copy
            } else {
                Selection::new(copy.end, copy.start)
            };
            self.target
                .set_target(EditTarget::Selection(restored), true);
            return Some(Change::single(ins));
        }
        let at = self.target.cursor();
        let line = self.target.document().line(at.row)?.clone();
        // A two-line payload ending in an empty record carries its own break,
        // so the last line of the buffer needs no special case.
        let ins = Operation::insertion(Cursor::new(at.row, 0), vec![line, Line::empty()]);
        self.apply_operation(&ins);
        self.target
            .set_target(EditTarget::Cursor(Cursor::new(at.row + 1, at.col)), true);
        Some(Change::single(ins))
    }

    /// Whole rows the current cursor/selection covers. A multi-row selection
    /// ending at column 0 does not count that final row.
    fn block_rows(&self) -> (usize, usize) {
        match self.target.selection() {
            Some(s) => {
                let content = self.target.selection_of_line_content(s);
                (content.start.row, content.end.row)
            }
            None => {
                let row = self.target.cursor().row;
                (row, row)
            }
        }
    }

    fn reorder_lines_up(&mut self) -> Option<Change> {
        let target = self.target.target();
        let (first, last) = self.block_rows();
        if first == 0 {
            return None;
        }
        let prev = self.target.document().line(first - 1)?.clone();
        let del = Operation::deletion(
            Cursor::new(first - 1, 0),
            vec![prev.clone(), Line::empty()],
        );
        self.apply_operation(&del);
        // The block now sits one row higher; reinsert the borrowed line
        // (break first) below it.
        let anchor = last - 1;
        let ins = Operation::insertion(
            Cursor::new(anchor, self.target.document().line_len(anchor)),
            vec![Line::empty(), prev],
        );
        self.apply_operation(&ins);
        self.target.set_target(target.shifted_rows(-1), true);
        Some(Change::new(vec![del, ins]))
    }

    fn reorder_lines_down(&mut self) -> Option<Change> {
        let target = self.target.target();
        let (first, last) = self.block_rows();
        if last >= self.target.document().last_row() {
            return None;
        }
        let next = self.target.document().line(last + 1)?.clone();
        let del = Operation::deletion(
            Cursor::new(last, self.target.document().line_len(last)),
            vec![Line::empty(), next.clone()],
        );
        self.apply_operation(&del);
        let ins = Operation::insertion(Cursor::new(first, 0), vec![next, Line::empty()]);
        self.apply_operation(&ins);
        self.target.set_target(target.shifted_rows(1), true);
        Some(Change::new(vec![del, ins]))
    }

    fn indent_tab(&mut self) -> Option<Change> {
        let tab = self.options.tab_size.max(1);
        let Some(sel) = self.target.selection() else {
            // Round the caret's column up to the next tab stop.
            let col = self.target.cursor().col;
            let pad = tab - (col % tab);
            let mut spaces = String::with_capacity(pad);
            for _ in 0..pad {
                spaces.push(' ');
            }
            return self.insert_text(&spaces);
        };
        let content = self.target.selection_of_line_content(sel);
        let (first, last) = (content.start.row, content.end.row);
        let pad = Line::new(" ".repeat(tab));
        let mut ops = Vec::with_capacity(last - first + 1);
        for row in first..=last {
            let ins = Operation::insertion(Cursor::new(row, 0), vec![pad.clone()]);
            self.apply_operation(&ins);
            ops.push(ins);
        }
        // Bounds shift by the delta of their own row; a bound resting at
        // column 0 of an untouched row stays put.
        let delta = |c: Cursor| {
            if c.row >= first && c.row <= last {
                tab as isize
            } else {
                0
            }
        };
        let restored = self
            .target
            .selection_shifted_by(sel, delta(sel.start), delta(sel.end));
        self.target
            .set_target(EditTarget::Selection(restored), true);
        Some(Change::new(ops))
    }

    fn outdent_tab(&mut self) -> Option<Change> {
        let tab = self.options.tab_size.max(1);
        let sel = self.target.selection();
        let (first, last) = match sel {
            Some(s) => {
                let content = self.target.selection_of_line_content(s);
                (content.start.row, content.end.row)
            }
            None => {
                let row = self.target.cursor().row;
                (row, row)
            }
        };
        let mut ops = Vec::new();
        let mut removed: Vec<(usize, usize)> = Vec::new();
        for row in first..=last {
            let leading = self
                .target
                .document()
                .line(row)
                .map(|l| l.leading_spaces())
                .unwrap_or(0);
            let cut = leading.min(tab);
            if cut == 0 {
                continue;
            }
            let del = Operation::deletion(Cursor::new(row, 0), vec![Line::new(" ".repeat(cut))]);
            self.apply_operation(&del);
            ops.push(del);
            removed.push((row, cut));
        }
        if ops.is_empty() {
            return None;
        }
        let cut_of = |row: usize| {
            removed
                .iter()
                .find(|(r, _)| *r == row)
                .map(|(_, k)| *k)
                .unwrap_or(0)
        };
        match sel {
            Some(s) => {
                let restored = self.target.selection_shifted_by(
                    s,
                    -(cut_of(s.start.row) as isize),
                    -(cut_of(s.end.row) as isize),
                );
                self.target
                    .set_target(EditTarget::Selection(restored), true);
            }
            None => {
                let at = self.target.cursor();
                let col = at.col.saturating_sub(cut_of(at.row));
                self.target
                    .set_target(EditTarget::Cursor(Cursor::new(at.row, col)), true);
            }
        }
        Some(Change::new(ops))
    }

    /// Comment or uncomment the covered lines with the file type's line
    /// token. Blank lines are skipped; the token is stripped only when every
    /// non-blank covered line carries it.
    fn toggle_comment(&mut self) -> Option<Change> {
        let token = self.options.line_comment.clone()?;
        if token.is_empty() {
            return None;
        }
        let target = self.target.target();
        let (first, last) = self.block_rows();
        let doc = self.target.document();
        let rows: Vec<usize> = (first..=last)
            .filter(|&row| doc.line(row).is_some_and(|l| !l.is_blank()))
            .collect();
        if rows.is_empty() {
            return None;
        }
        let stripping = rows
            .iter()
            .all(|&row| doc.line(row).is_some_and(|l| l.starts_with(&token)));
        let token_cols = token.chars().count() as isize;
        let mut ops = Vec::with_capacity(rows.len());
        for &row in &rows {
            let op = if stripping {
                Operation::deletion(Cursor::new(row, 0), vec![Line::new(token.clone())])
            } else {
                Operation::insertion(Cursor::new(row, 0), vec![Line::new(token.clone())])
            };
            self.apply_operation(&op);
            ops.push(op);
        }
        let delta = if stripping { -token_cols } else { token_cols };
        let shift = |c: Cursor| {
            if rows.contains(&c.row) {
                Cursor::new(c.row, c.col.saturating_add_signed(delta))
            } else {
                c
            }
        };
        let restored = match target {
            EditTarget::Cursor(c) => EditTarget::Cursor(shift(c)),
            EditTarget::Selection(s) => {
                EditTarget::Selection(Selection::new(shift(s.start), shift(s.end)))
            }
        };
        self.target.set_target(restored, true);
        Some(Change::new(ops))
    }

    /// Replace the current match, then re-select the match now holding the
    /// same position index.
    fn replace_current_found(&mut self, text: &str) -> Option<Change> {
        let position = self.finder.position();
        let current = self.finder.find_current()?;
        self.target
            .set_target(EditTarget::Selection(current), false);
        let change = self.insert_text(text)?;
        self.finder.compute_all_matches(self.target.document());
        self.finder.set_position(position);
        if let Some(next) = self.finder.find_current() {
            self.target.set_target(EditTarget::Selection(next), false);
        }
        Some(change)
    }

    /// Replace every match from the document start, re-querying the live
    /// buffer after each replacement so earlier edits cannot stale later
    /// offsets, then force one full recomputation.
    fn replace_all_found(&mut self, text: &str) -> Option<Change> {
        self.finder.pattern()?;
        let mut ops = Vec::new();
        let mut offset = 0usize;
        while let Some(m) = {
            let doc = self.target.document();
            self.finder.compute_next_match(doc, offset)
        } {
            let span = m.normalized();
            let start_offset = self.finder.offset_of(span.start);
            if !span.is_empty() {
                let removed = text_of_selection(self.target.document(), span);
                let del = Operation::deletion_of(span.start.settled(), removed, span);
                self.apply_operation(&del);
                ops.push(del);
            }
            if !text.is_empty() {
                let ins = Operation::insertion(span.start.settled(), lines_of(text));
                self.apply_operation(&ins);
                ops.push(ins);
            }
            // An empty match replaced by nothing mutates nothing; step over
            // it so the walk always advances.
            offset = start_offset
                + text.len()
                + usize::from(span.is_empty() && text.is_empty());
        }
        self.finder.compute_all_matches(self.target.document());
        if ops.is_empty() {
            return None;
        }
        let change = Change::new(ops);
        self.target.set_target(restore_target(&change), true);
        Some(change)
    }
}

/// The writable text processor. Cheap to clone-share via `read_only`; all
/// mutators lock the shared state, apply, enqueue for the debounce drain, and
/// re-arm the window.
pub struct EditEngine {
    inner: Arc<Mutex<EngineInner>>,
    /// In-flight debounce timers. Only the firing that takes this to zero
    /// drains the pending queue.
    timers: Arc<AtomicU64>,
    scheduler: Arc<dyn DebounceScheduler>,
}

impl EditEngine {
    pub fn new(doc: Document, options: EditOptions) -> Self {
        Self {
            inner: Arc::new(Mutex::new(EngineInner::new(doc, options))),
            timers: Arc::new(AtomicU64::new(0)),
            scheduler: Arc::new(ThreadScheduler),
        }
    }

    /// Engine over raw content, split into line records.
    pub fn from_content(content: &str, options: EditOptions) -> anyhow::Result<Self> {
        Ok(Self::new(Document::from_str(content)?, options))
    }

    pub fn with_hooks(self, hooks: EditHooks) -> Self {
        self.lock().hooks = hooks;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn DebounceScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Read-only view sharing this engine's state.
    pub fn read_only(&self) -> ReadOnlyProcessor {
        ReadOnlyProcessor {
            inner: Arc::clone(&self.inner),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn edit(&self, build: impl FnOnce(&mut EngineInner) -> Option<Change>) {
        let mut inner = self.lock();
        if !inner.hooks.persistence.is_writable() {
            inner.warn_not_writable();
            return;
        }
        let Some(change) = build(&mut *inner) else {
            return;
        };
        inner.history.enqueue(change);
        let window = inner.options.debounce_window;
        drop(inner);
        self.arm_timer(window);
    }

    fn arm_timer(&self, window: Duration) {
        self.timers.fetch_add(1, Ordering::SeqCst);
        let inner = Arc::clone(&self.inner);
        let timers = Arc::clone(&self.timers);
        self.scheduler.schedule(
            window,
            Box::new(move || {
                if timers.fetch_sub(1, Ordering::SeqCst) == 1 {
                    let mut inner = inner.lock().unwrap_or_else(PoisonError::into_inner);
                    inner.drain();
                }
            }),
        );
    }

    // -----------------------------------------------------------------
    // Navigation and search access
    // -----------------------------------------------------------------

    /// Run navigation/selection calls against the live input target.
    pub fn with_target<R>(&self, f: impl FnOnce(&mut InputTarget) -> R) -> R {
        f(&mut self.lock().target)
    }

    pub fn content(&self) -> String {
        self.lock().target.document().flatten()
    }

    pub fn cursor(&self) -> Cursor {
        self.lock().target.cursor()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.lock().target.selection()
    }

    pub fn undo_depth(&self) -> usize {
        self.lock().history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.lock().history.redo_depth()
    }

    pub fn find_text(&self, query: &str, case_sensitive: bool) {
        let mut inner = self.lock();
        inner.finder.find_text(query, case_sensitive);
        let inner = &mut *inner;
        inner.finder.compute_all_matches(inner.target.document());
    }

    pub fn find_word(&self, query: &str, case_sensitive: bool) {
        let mut inner = self.lock();
        inner.finder.find_word(query, case_sensitive);
        let inner = &mut *inner;
        inner.finder.compute_all_matches(inner.target.document());
    }

    pub fn find_regex(&self, pattern: &str, case_sensitive: bool) {
        let mut inner = self.lock();
        inner.finder.find_regex(pattern, case_sensitive);
        let inner = &mut *inner;
        inner.finder.compute_all_matches(inner.target.document());
    }

    pub fn match_count(&self) -> usize {
        self.lock().finder.match_count()
    }

    pub fn matches_on_line(&self, row: usize) -> Vec<Selection> {
        self.lock().finder.matches_on_line(row)
    }

    /// Advance to and select the next match.
    pub fn find_next(&self) -> Option<Selection> {
        let mut inner = self.lock();
        let found = inner.finder.find_next();
        if let Some(m) = found {
            inner.target.set_target(EditTarget::Selection(m), true);
        }
        found
    }

    /// Step back to and select the previous match.
    pub fn find_previous(&self) -> Option<Selection> {
        let mut inner = self.lock();
        let found = inner.finder.find_previous();
        if let Some(m) = found {
            inner.target.set_target(EditTarget::Selection(m), true);
        }
        found
    }
}

impl TextProcessor for EditEngine {
    fn insert_text(&self, text: &str) {
        self.edit(|inner| inner.insert_text(text));
    }

    fn insert_new_line(&self) {
        self.edit(EngineInner::insert_new_line);
    }

    fn delete_selection(&self) {
        self.edit(EngineInner::delete_selection);
    }

    fn delete_backward(&self) {
        self.edit(EngineInner::delete_backward);
    }

    fn delete_forward(&self) {
        self.edit(EngineInner::delete_forward);
    }

    fn duplicate(&self) {
        self.edit(EngineInner::duplicate);
    }

    fn reorder_lines_up(&self) {
        self.edit(EngineInner::reorder_lines_up);
    }

    fn reorder_lines_down(&self) {
        self.edit(EngineInner::reorder_lines_down);
    }

    fn indent_tab(&self) {
        self.edit(EngineInner::indent_tab);
    }

    fn outdent_tab(&self) {
        self.edit(EngineInner::outdent_tab);
    }

    fn toggle_comment(&self) {
        self.edit(EngineInner::toggle_comment);
    }

    fn replace_current_found(&self, text: &str) {
        self.edit(|inner| inner.replace_current_found(text));
    }

    fn replace_all_found(&self, text: &str) {
        self.edit(|inner| inner.replace_all_found(text));
    }

    fn undo(&self) -> bool {
        let mut inner = self.lock();
        if !inner.hooks.persistence.is_writable() {
            inner.warn_not_writable();
            return false;
        }
        inner.undo()
    }

    fn redo(&self) -> bool {
        let mut inner = self.lock();
        if !inner.hooks.persistence.is_writable() {
            inner.warn_not_writable();
            return false;
        }
        inner.redo()
    }

    fn drain_changes(&self) {
        self.lock().drain();
    }

    fn clear_history(&self) {
        self.lock().history.clear();
    }
}

/// Read-only processor over the same engine state: every mutator is dropped
/// with a rate-limited warning, so the UI layer needs no read-only branching.
pub struct ReadOnlyProcessor {
    inner: Arc<Mutex<EngineInner>>,
}

impl ReadOnlyProcessor {
    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reject(&self) {
        self.lock().warn_not_writable();
    }

    pub fn content(&self) -> String {
        self.lock().target.document().flatten()
    }

    pub fn with_target<R>(&self, f: impl FnOnce(&mut InputTarget) -> R) -> R {
        f(&mut self.lock().target)
    }
}

impl TextProcessor for ReadOnlyProcessor {
    fn insert_text(&self, _text: &str) {
        self.reject();
    }

    fn insert_new_line(&self) {
        self.reject();
    }

    fn delete_selection(&self) {
        self.reject();
    }

    fn delete_backward(&self) {
        self.reject();
    }

    fn delete_forward(&self) {
        self.reject();
    }

    fn duplicate(&self) {
        self.reject();
    }

    fn reorder_lines_up(&self) {
        self.reject();
    }

    fn reorder_lines_down(&self) {
        self.reject();
    }

    fn indent_tab(&self) {
        self.reject();
    }

    fn outdent_tab(&self) {
        self.reject();
    }

    fn toggle_comment(&self) {
        self.reject();
    }

    fn replace_current_found(&self, _text: &str) {
        self.reject();
    }

    fn replace_all_found(&self, _text: &str) {
        self.reject();
    }

    fn undo(&self) -> bool {
        self.reject();
        false
    }

    fn redo(&self) -> bool {
        self.reject();
        false
    }

    fn drain_changes(&self) {}

    fn clear_history(&self) {}
}
