//! Caret and selection value types.
//!
//! A `Cursor` is a (row, codepoint-column) pair plus the column the user last
//! *intended* before vertical movement shortened it on a shorter line. A
//! `Selection` is a directional pair of cursors: `start`/`end` record which
//! end the user moved last, while `min`/`max` expose the normalized bounds.
//!
//! Invariants maintained by callers (the navigation layer re-clamps after
//! every public operation):
//! * `cursor.col <= line_len(cursor.row)`.
//! * `coverage` inputs nest or order; an interleaving that fits neither is a
//!   caller bug upstream, not a runtime error.

/// Caret position in codepoint space, ordered row-major then by column.
/// `last_col` carries vertical-movement intent and does not participate in
/// ordering or equality.
#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
    pub last_col: usize,
}

impl Cursor {
    pub fn new(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            last_col: col,
        }
    }

    pub fn with_last(row: usize, col: usize, last_col: usize) -> Self {
        Self { row, col, last_col }
    }

    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Same position with the intent column reset to the real column.
    pub fn settled(self) -> Self {
        Self::new(self.row, self.col)
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.col == other.col
    }
}

impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.col).cmp(&(other.row, other.col))
    }
}

/// Directional range between two carets. Not auto-normalized: `start` is the
/// anchor and `end` the moving edge, so collapsing and extending behave the
/// way the user expects regardless of drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: Cursor,
    pub end: Cursor,
}

impl Selection {
    pub fn new(start: Cursor, end: Cursor) -> Self {
        Self { start, end }
    }

    /// Zero-width selection at a caret.
    pub fn caret(at: Cursor) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_forward(&self) -> bool {
        self.start <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Normalized lower bound.
    pub fn min(&self) -> Cursor {
        if self.is_forward() { self.start } else { self.end }
    }

    /// Normalized upper bound.
    pub fn max(&self) -> Cursor {
        if self.is_forward() { self.end } else { self.start }
    }

    /// Forward copy (min..max), dropping direction.
    pub fn normalized(&self) -> Selection {
        Selection::new(self.min(), self.max())
    }

    pub fn encloses(&self, other: &Selection) -> bool {
        self.min() <= other.min() && self.max() >= other.max()
    }

    pub fn contains(&self, cursor: Cursor) -> bool {
        self.min() <= cursor && cursor <= self.max()
    }

    /// Smallest selection enclosing both inputs. When one input already
    /// encloses the other it is returned directly, preserving its direction;
    /// otherwise a forward selection over the extreme bounds is built. The
    /// branches are exhaustive for ordered bounds.
    pub fn coverage(a: Selection, b: Selection) -> Selection {
        if a.encloses(&b) {
            a
        } else if b.encloses(&a) {
            b
        } else if a.min() <= b.min() {
            Selection::new(a.min(), b.max())
        } else if b.min() <= a.min() {
            Selection::new(b.min(), a.max())
        } else {
            unreachable!("selection bounds must nest or order");
        }
    }
}

/// The cursor-or-selection a change resolves to once applied. Callers restore
/// user focus from this after replaying a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    Cursor(Cursor),
    Selection(Selection),
}

impl EditTarget {
    /// The caret position of this target: the cursor itself, or the moving
    /// edge of the selection.
    pub fn caret(&self) -> Cursor {
        match self {
            EditTarget::Cursor(c) => *c,
            EditTarget::Selection(s) => s.end,
        }
    }

    /// View as a selection, collapsing a bare cursor to zero width.
    pub fn as_selection(&self) -> Selection {
        match self {
            EditTarget::Cursor(c) => Selection::caret(*c),
            EditTarget::Selection(s) => *s,
        }
    }

    /// Rows shifted by a signed delta, used by line-reorder bookkeeping.
    pub fn shifted_rows(&self, delta: isize) -> EditTarget {
        let shift = |c: Cursor| {
            Cursor::with_last(
                c.row.saturating_add_signed(delta),
                c.col,
                c.last_col,
            )
        };
        match self {
            EditTarget::Cursor(c) => EditTarget::Cursor(shift(*c)),
            EditTarget::Selection(s) => {
                EditTarget::Selection(Selection::new(shift(s.start), shift(s.end)))
            }
        }
    }
}

impl From<Cursor> for EditTarget {
    fn from(c: Cursor) -> Self {
        EditTarget::Cursor(c)
    }
}

impl From<Selection> for EditTarget {
    fn from(s: Selection) -> Self {
        EditTarget::Selection(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(a: (usize, usize), b: (usize, usize)) -> Selection {
        Selection::new(Cursor::new(a.0, a.1), Cursor::new(b.0, b.1))
    }

    #[test]
    fn cursor_order_is_row_major_and_ignores_last_col() {
        assert!(Cursor::new(0, 5) < Cursor::new(1, 0));
        assert!(Cursor::new(2, 1) < Cursor::new(2, 3));
        assert_eq!(Cursor::with_last(1, 2, 9), Cursor::new(1, 2));
    }

    #[test]
    fn selection_direction_and_bounds() {
        let fwd = sel((0, 1), (1, 2));
        let back = sel((1, 2), (0, 1));
        assert!(fwd.is_forward());
        assert!(!back.is_forward());
        assert_eq!(back.min(), Cursor::new(0, 1));
        assert_eq!(back.max(), Cursor::new(1, 2));
        assert_eq!(back.normalized(), fwd);
    }

    #[test]
    fn coverage_returns_enclosing_input_with_its_direction() {
        let outer = sel((2, 0), (0, 0)); // backward
        let inner = sel((0, 2), (1, 0));
        let c = Selection::coverage(outer, inner);
        assert_eq!(c, outer);
        assert!(!c.is_forward());
    }

    #[test]
    fn coverage_of_overlapping_and_disjoint_spans_extremes() {
        let a = sel((0, 0), (0, 5));
        let b = sel((0, 3), (1, 2));
        assert_eq!(Selection::coverage(a, b), sel((0, 0), (1, 2)));
        let c = sel((3, 0), (3, 4));
        assert_eq!(Selection::coverage(a, c), sel((0, 0), (3, 4)));
        assert_eq!(Selection::coverage(c, a), sel((0, 0), (3, 4)));
    }

    #[test]
    fn coverage_idempotent_and_associative() {
        let a = sel((0, 0), (0, 4));
        let b = sel((0, 2), (1, 1));
        let c = sel((1, 0), (2, 3));
        assert_eq!(Selection::coverage(a, a), a);
        assert_eq!(
            Selection::coverage(Selection::coverage(a, b), c),
            Selection::coverage(a, Selection::coverage(b, c)),
        );
    }

    #[test]
    fn target_caret_and_row_shift() {
        let t: EditTarget = sel((2, 3), (4, 1)).into();
        assert_eq!(t.caret(), Cursor::new(4, 1));
        let up = t.shifted_rows(-1);
        assert_eq!(up.as_selection(), sel((1, 3), (3, 1)));
        let c: EditTarget = Cursor::new(0, 2).into();
        assert_eq!(c.shifted_rows(-1).caret(), Cursor::new(0, 2)); // clamped at top
    }
}
