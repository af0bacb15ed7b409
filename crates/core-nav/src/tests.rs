use std::sync::Arc;

use super::*;
use core_model::{Cursor, EditTarget, Selection};
use core_text::Document;

fn target(content: &str) -> InputTarget {
    InputTarget::new(Document::from_str(content).unwrap())
}

fn cur(row: usize, col: usize) -> Cursor {
    Cursor::new(row, col)
}

fn sel(a: (usize, usize), b: (usize, usize)) -> Selection {
    Selection::new(cur(a.0, a.1), cur(b.0, b.1))
}

#[test]
fn char_movement_wraps_line_boundaries() {
    let mut t = target("ab\ncd");
    t.set_target(EditTarget::Cursor(cur(0, 2)), false);
    t.move_cursor(Direction::Next, Granularity::Char, false);
    assert_eq!(t.cursor(), cur(1, 0));
    t.move_cursor(Direction::Prev, Granularity::Char, false);
    assert_eq!(t.cursor(), cur(0, 2));
}

#[test]
fn char_movement_noop_at_document_edges() {
    let mut t = target("ab");
    t.move_cursor(Direction::Prev, Granularity::Char, false);
    assert_eq!(t.cursor(), cur(0, 0));
    t.set_target(EditTarget::Cursor(cur(0, 2)), false);
    t.move_cursor(Direction::Next, Granularity::Char, false);
    assert_eq!(t.cursor(), cur(0, 2));
}

#[test]
fn plain_movement_collapses_selection_to_bound() {
    let mut t = target("hello world");
    t.set_target(EditTarget::Selection(sel((0, 2), (0, 7))), false);
    t.move_cursor(Direction::Prev, Granularity::Char, false);
    // lands at the boundary, not one step further
    assert_eq!(t.cursor(), cur(0, 2));
    assert!(t.selection().is_none());

    t.set_target(EditTarget::Selection(sel((0, 2), (0, 7))), false);
    t.move_cursor(Direction::Next, Granularity::Char, false);
    assert_eq!(t.cursor(), cur(0, 7));
}

#[test]
fn selecting_movement_extends_from_anchor() {
    let mut t = target("abcdef");
    t.set_target(EditTarget::Cursor(cur(0, 2)), false);
    t.move_cursor(Direction::Next, Granularity::Char, true);
    t.move_cursor(Direction::Next, Granularity::Char, true);
    assert_eq!(t.selection(), Some(sel((0, 2), (0, 4))));
    t.move_cursor(Direction::Prev, Granularity::Char, true);
    assert_eq!(t.selection(), Some(sel((0, 2), (0, 3))));
    // shrinking back onto the anchor clears the selection
    t.move_cursor(Direction::Prev, Granularity::Char, true);
    assert!(t.selection().is_none());
}

#[test]
fn word_movement_over_punctuation() {
    let mut t = target("foo, bar_baz qux");
    t.move_cursor(Direction::Next, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(0, 3)); // end of "foo"
    t.move_cursor(Direction::Next, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(0, 12)); // end of "bar_baz"
    t.move_cursor(Direction::Next, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(0, 16));
    t.move_cursor(Direction::Prev, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(0, 13)); // start of "qux"
    t.move_cursor(Direction::Prev, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(0, 5)); // start of "bar_baz"
}

#[test]
fn word_movement_crosses_lines_at_edges() {
    let mut t = target("ab\ncd");
    t.set_target(EditTarget::Cursor(cur(0, 2)), false);
    t.move_cursor(Direction::Next, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(1, 0));
    t.move_cursor(Direction::Prev, Granularity::Word, false);
    assert_eq!(t.cursor(), cur(0, 2));
}

/// Oracle that never advances; the walk must still terminate by degrading to
/// single-column steps.
struct StuckOracle;

impl BoundaryOracle for StuckOracle {
    fn word_range(&self, _line: &str, byte: usize) -> std::ops::Range<usize> {
        byte..byte
    }
}

#[test]
fn word_movement_survives_non_advancing_oracle() {
    let mut t = target("abc def").with_oracle(Arc::new(StuckOracle));
    t.move_cursor(Direction::Next, Granularity::Word, false);
    assert!(t.cursor().col > 0);
    t.set_target(EditTarget::Cursor(cur(0, 7)), false);
    t.move_cursor(Direction::Prev, Granularity::Word, false);
    assert!(t.cursor().col < 7);
}

#[test]
fn paragraph_movement_degrades_to_line_edges() {
    let mut t = target("abc\ndef");
    t.set_target(EditTarget::Cursor(cur(0, 1)), false);
    t.move_cursor(Direction::Next, Granularity::Paragraph, false);
    assert_eq!(t.cursor(), cur(0, 3)); // to end of line first
    t.move_cursor(Direction::Next, Granularity::Paragraph, false);
    assert_eq!(t.cursor(), cur(1, 3)); // then to the next line's end
    t.move_cursor(Direction::Prev, Granularity::Paragraph, false);
    assert_eq!(t.cursor(), cur(1, 0));
    t.move_cursor(Direction::Prev, Granularity::Paragraph, false);
    assert_eq!(t.cursor(), cur(0, 0));
}

#[test]
fn vertical_movement_restores_intended_column() {
    let mut t = target("long line here\nab\nanother long line");
    t.set_target(EditTarget::Cursor(cur(0, 10)), false);
    t.move_cursor(Direction::Next, Granularity::Line, false);
    assert_eq!(t.cursor(), cur(1, 2)); // clamped on the short line
    t.move_cursor(Direction::Next, Granularity::Line, false);
    assert_eq!(t.cursor(), cur(2, 10)); // intent restored
}

#[test]
fn page_movement_uses_host_height() {
    let mut t = target("0\n1\n2\n3\n4\n5\n6\n7");
    t.set_page_rows(3);
    t.move_cursor(Direction::Next, Granularity::Page, false);
    assert_eq!(t.cursor().row, 3);
    t.move_cursor(Direction::Next, Granularity::Page, false);
    assert_eq!(t.cursor().row, 6);
    t.move_cursor(Direction::Next, Granularity::Page, false);
    assert_eq!(t.cursor().row, 7); // clamped to the last row
    t.move_cursor(Direction::Prev, Granularity::Page, false);
    assert_eq!(t.cursor().row, 4);
}

#[test]
fn smart_home_and_end_toggle() {
    let mut t = target("    indented   ");
    t.set_target(EditTarget::Cursor(cur(0, 8)), false);
    t.move_to_line_edge(Edge::Start, false);
    assert_eq!(t.cursor().col, 4); // first non-space
    t.move_to_line_edge(Edge::Start, false);
    assert_eq!(t.cursor().col, 0); // second press: absolute start
    t.move_to_line_edge(Edge::End, false);
    assert_eq!(t.cursor().col, 12); // past "indented"
    t.move_to_line_edge(Edge::End, false);
    assert_eq!(t.cursor().col, 15); // full length
}

#[test]
fn document_edge_movement() {
    let mut t = target("ab\ncd\nef");
    t.move_to_document_edge(Edge::End, false);
    assert_eq!(t.cursor(), cur(2, 2));
    t.move_to_document_edge(Edge::Start, true);
    assert_eq!(t.selection(), Some(sel((2, 2), (0, 0))));
}

#[test]
fn select_all_and_none() {
    let mut t = target("ab\ncd");
    t.select_all();
    assert_eq!(t.selection(), Some(sel((0, 0), (1, 2))));
    t.select_none();
    assert!(t.selection().is_none());
    assert_eq!(t.cursor(), cur(1, 2));
}

#[test]
fn word_selection_at_caret_and_line_end() {
    let mut t = target("foo bar");
    t.set_target(EditTarget::Cursor(cur(0, 5)), false);
    t.select_word();
    assert_eq!(t.selection(), Some(sel((0, 4), (0, 7))));
    // at the very end of the line, the preceding word is selected
    assert_eq!(t.selection_of_word(cur(0, 7)), sel((0, 4), (0, 7)));
}

#[test]
fn line_and_break_selections() {
    let t = target("ab\ncd\nef");
    assert_eq!(t.selection_of_line_and_break(0), sel((0, 0), (1, 0)));
    assert_eq!(t.selection_of_line_and_break(2), sel((2, 0), (2, 2)));
    assert_eq!(
        t.selection_of_previous_line_and_break(1),
        Some(sel((0, 0), (1, 0)))
    );
    assert_eq!(t.selection_of_previous_line_and_break(0), None);
    assert_eq!(
        t.selection_of_next_break_and_line(0),
        Some(sel((0, 2), (1, 2)))
    );
    assert_eq!(t.selection_of_next_break_and_line(2), None);
}

#[test]
fn line_content_normalization_excludes_trailing_col0_row() {
    let t = target("abc\ndef\nghi");
    assert_eq!(
        t.selection_of_line_content(sel((0, 1), (1, 2))),
        sel((0, 0), (1, 3))
    );
    // selection ending exactly at a line start does not pull that row in
    assert_eq!(
        t.selection_of_line_content(sel((0, 1), (2, 0))),
        sel((0, 0), (1, 3))
    );
    assert_eq!(
        t.selection_of_line_content(sel((1, 2), (1, 2))),
        sel((1, 0), (1, 3))
    );
}

#[test]
fn selection_shift_clamps_at_zero() {
    let t = target("abc\ndef");
    let s = t.selection_shifted_by(sel((0, 1), (1, 2)), -4, 2);
    assert_eq!(s, sel((0, 0), (1, 4)));
}

#[test]
fn char_drag_follows_pointer() {
    let mut t = target("abcdef");
    t.set_target(EditTarget::Cursor(cur(0, 3)), false);
    t.begin_drag(DragMode::Char);
    t.drag_to(0, 5);
    assert_eq!(t.selection(), Some(sel((0, 3), (0, 5))));
    t.drag_to(0, 1);
    assert_eq!(t.selection(), Some(sel((0, 3), (0, 1))));
    t.end_drag();
    t.drag_to(0, 6); // no drag armed: ignored
    assert_eq!(t.selection(), Some(sel((0, 3), (0, 1))));
}

#[test]
fn word_drag_extends_whole_words_both_directions() {
    let mut t = target("alpha beta gamma");
    t.set_target(EditTarget::Cursor(cur(0, 7)), false);
    t.begin_drag(DragMode::Word);
    assert_eq!(t.selection(), Some(sel((0, 6), (0, 10)))); // "beta"
    t.drag_to(0, 13);
    assert_eq!(t.selection(), Some(sel((0, 6), (0, 16))));
    // dragging back before the anchor keeps the anchor word covered
    t.drag_to(0, 2);
    assert_eq!(t.selection(), Some(sel((0, 10), (0, 0))));
}

#[test]
fn line_drag_covers_whole_lines() {
    let mut t = target("ab\ncd\nef");
    t.set_target(EditTarget::Cursor(cur(1, 1)), false);
    t.begin_drag(DragMode::Gutter);
    assert_eq!(t.selection(), Some(sel((1, 0), (2, 0))));
    t.drag_to(2, 1);
    assert_eq!(t.selection(), Some(sel((1, 0), (2, 2))));
    t.drag_to(0, 0);
    assert_eq!(t.selection(), Some(sel((2, 0), (0, 0))));
}

#[test]
fn set_target_clamps_out_of_range_positions() {
    let mut t = target("ab\ncd");
    t.set_target(EditTarget::Cursor(cur(9, 9)), false);
    assert_eq!(t.cursor(), cur(1, 2));
}
