//! Engine configuration. Hosts persist this (TOML or similar) and hand it to
//! the engine at construction; the engine itself reads no ambient state.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TAB_SIZE: usize = 4;
pub const UNDO_LIMIT: usize = 1000;
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOptions {
    /// Column width of one indentation stop.
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,
    /// Maximum retained undo entries; the oldest entry is dropped beyond it.
    #[serde(default = "default_undo_limit")]
    pub undo_limit: usize,
    /// Quiet period after which pending edits coalesce into one undo step.
    #[serde(default = "default_window")]
    pub debounce_window: Duration,
    /// Line-comment token of the document's file type; `None` disables
    /// comment toggling.
    #[serde(default)]
    pub line_comment: Option<String>,
}

fn default_tab_size() -> usize {
    TAB_SIZE
}

fn default_undo_limit() -> usize {
    UNDO_LIMIT
}

fn default_window() -> Duration {
    DEBOUNCE_WINDOW
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            tab_size: TAB_SIZE,
            undo_limit: UNDO_LIMIT,
            debounce_window: DEBOUNCE_WINDOW,
            line_comment: None,
        }
    }
}
