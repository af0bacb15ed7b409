//! Find/replace integration through the engine.

use std::sync::Arc;

use core_edit::{EditEngine, EditOptions, ManualScheduler, TextProcessor};
use core_model::{Cursor, Selection};

fn engine(content: &str) -> (EditEngine, Arc<ManualScheduler>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let sched = Arc::new(ManualScheduler::new());
    let e = EditEngine::from_content(content, EditOptions::default())
        .unwrap()
        .with_scheduler(sched.clone());
    (e, sched)
}

fn sel(a: (usize, usize), b: (usize, usize)) -> Selection {
    Selection::new(Cursor::new(a.0, a.1), Cursor::new(b.0, b.1))
}

#[test]
fn find_next_selects_and_wraps() {
    let (e, _) = engine("cat dog\ncat");
    e.find_text("cat", true);
    assert_eq!(e.match_count(), 2);
    assert_eq!(e.find_next(), Some(sel((1, 0), (1, 3))));
    assert_eq!(e.selection(), Some(sel((1, 0), (1, 3))));
    assert_eq!(e.find_next(), Some(sel((0, 0), (0, 3))));
    assert_eq!(e.find_previous(), Some(sel((1, 0), (1, 3))));
}

#[test]
fn replace_current_advances_to_the_same_index() {
    let (e, _) = engine("cat cat cat");
    e.find_text("cat", true);
    e.replace_current_found("dog");
    assert_eq!(e.content(), "dog cat cat");
    // the match now holding index 0 is selected
    assert_eq!(e.selection(), Some(sel((0, 4), (0, 7))));
    e.replace_current_found("dog");
    assert_eq!(e.content(), "dog dog cat");
    assert_eq!(e.selection(), Some(sel((0, 8), (0, 11))));
}

#[test]
fn replace_all_survives_offset_shifts() {
    let (e, _) = engine("cat cat\ncat");
    e.find_text("cat", true);
    e.replace_all_found("elephant");
    assert_eq!(e.content(), "elephant elephant\nelephant");
    assert_eq!(e.match_count(), 0);
}

#[test]
fn replace_all_with_empty_text_deletes_matches() {
    let (e, _) = engine("xaxa");
    e.find_text("a", true);
    e.replace_all_found("");
    assert_eq!(e.content(), "xx");
}

#[test]
fn replace_all_is_one_undo_unit() {
    let (e, sched) = engine("a a a");
    e.find_text("a", true);
    e.replace_all_found("b");
    sched.fire_all();
    assert_eq!(e.content(), "b b b");
    assert!(e.undo());
    assert_eq!(e.content(), "a a a");
}

#[test]
fn matches_track_the_buffer_across_bursts() {
    let (e, sched) = engine("cat");
    e.find_text("cat", true);
    assert_eq!(e.match_count(), 1);
    e.with_target(|t| {
        t.set_target(
            core_model::EditTarget::Cursor(Cursor::new(0, 3)),
            false,
        )
    });
    e.insert_text(" cat");
    sched.fire_all(); // drain refreshes the match set
    assert_eq!(e.match_count(), 2);
    assert_eq!(e.matches_on_line(0).len(), 2);
}

#[test]
fn word_search_ignores_substrings() {
    let (e, _) = engine("concatenate cat cats");
    e.find_word("cat", true);
    assert_eq!(e.match_count(), 1);
    assert_eq!(e.find_next(), Some(sel((0, 12), (0, 15))));
}

#[test]
fn invalid_pattern_yields_zero_matches() {
    let (e, _) = engine("anything");
    e.find_regex("([unclosed", true);
    assert_eq!(e.match_count(), 0);
    assert_eq!(e.find_next(), None);
}
