//! The text processor: buffer edits, structural operations, and the
//! debounce-coalesced undo/redo history.
//!
//! `EditEngine` is the writable processor; `ReadOnlyProcessor` shares its
//! state but drops every mutation with a rate-limited warning, so the UI
//! layer drives both through the same [`TextProcessor`] trait without
//! read-only branching. Navigation and search state live in the engine too
//! (`with_target`, the `find_*` methods), so edits, cursor restoration, and
//! match recomputation stay consistent under one lock.

mod engine;
mod history;
mod hooks;
mod options;

pub use engine::{EditEngine, ReadOnlyProcessor};
pub use hooks::{
    DebounceScheduler, EditHooks, Highlighter, ManualScheduler, NotificationSink,
    PersistenceSink, RenderSink, ThreadScheduler,
};
pub use options::EditOptions;

/// Every content mutation the UI layer can request. Boundary cases (empty
/// stacks, edges of the buffer, no selection where one is required) are
/// silent no-ops, not errors.
pub trait TextProcessor {
    /// Insert text at the caret. An active selection is replaced atomically:
    /// its deletion and the insertion form one undo unit.
    fn insert_text(&self, text: &str);
    /// Line break with auto-indent carried from the current line.
    fn insert_new_line(&self);
    fn delete_selection(&self);
    /// Backspace: one codepoint before the caret, or the selection, or the
    /// break joining this line to the previous one.
    fn delete_backward(&self);
    /// Forward delete, mirroring `delete_backward`.
    fn delete_forward(&self);
    /// Duplicate the selection (reselecting the copy) or the current line.
    fn duplicate(&self);
    fn reorder_lines_up(&self);
    fn reorder_lines_down(&self);
    fn indent_tab(&self);
    fn outdent_tab(&self);
    /// Comment/uncomment the covered lines with the configured line token.
    fn toggle_comment(&self);
    /// Replace the current match and re-select the one at the same index.
    fn replace_current_found(&self, text: &str);
    /// Replace every match, re-querying the live buffer between replacements.
    fn replace_all_found(&self, text: &str);
    /// Returns false when there is nothing to undo.
    fn undo(&self) -> bool;
    /// Returns false when there is nothing to redo.
    fn redo(&self) -> bool;
    /// Finalize the in-flight edit burst into one undo entry immediately.
    fn drain_changes(&self);
    fn clear_history(&self);
}
