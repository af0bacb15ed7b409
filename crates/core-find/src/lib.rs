//! Incremental find/replace index over the live buffer.
//!
//! The finder keeps a flattened copy of the document (rows joined by `\n`)
//! plus a per-line byte offset table so navigation queries never re-scan the
//! buffer; only a content change or a pattern change triggers recomputation.
//! Match positions are stored as codepoint-space `Selection`s and indexed by
//! every row they touch for per-line highlighting.
//!
//! An invalid user pattern is not an error to propagate: compilation failure
//! resets the finder to the empty state and the user simply sees zero
//! matches.

use std::collections::HashMap;

use core_model::{Cursor, Selection};
use core_text::{Document, words};
use regex::{Regex, RegexBuilder, escape};
use thiserror::Error;
use tracing::{debug, trace};

/// Pattern compilation failure. Recovered internally by resetting the finder;
/// never surfaced past this crate.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("empty search pattern")]
    Empty,
    #[error("invalid search pattern: {0}")]
    Invalid(#[from] regex::Error),
}

/// Byte span of one row inside the flattened content. `len` includes the
/// trailing `\n` on every row but the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LineSpan {
    start: usize,
    len: usize,
}

/// Search index: compiled pattern, flattened content, match set and the
/// "current match" position.
#[derive(Debug, Default)]
pub struct TextFinder {
    pattern: Option<Regex>,
    content: String,
    line_table: Vec<LineSpan>,
    matches: Vec<Selection>,
    by_line: HashMap<usize, Vec<usize>>,
    position: usize,
}

impl TextFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal search.
    pub fn find_text(&mut self, query: &str, case_sensitive: bool) {
        self.set_pattern(Self::compile(&escape(query), case_sensitive));
    }

    /// Literal search constrained to standalone words. A boundary assertion
    /// is added only on the edges where the query itself starts/ends with a
    /// word character, so `"cat"` does not match inside `"concatenate"` while
    /// `"()"` still matches anywhere.
    pub fn find_word(&mut self, query: &str, case_sensitive: bool) {
        let mut pat = String::new();
        if query.chars().next().is_some_and(words::is_word_char) {
            pat.push_str(r"\b");
        }
        pat.push_str(&escape(query));
        if query.chars().next_back().is_some_and(words::is_word_char) {
            pat.push_str(r"\b");
        }
        self.set_pattern(Self::compile(&pat, case_sensitive));
    }

    /// Raw regex search.
    pub fn find_regex(&mut self, pattern: &str, case_sensitive: bool) {
        self.set_pattern(Self::compile(pattern, case_sensitive));
    }

    fn compile(pattern: &str, case_sensitive: bool) -> Result<Regex, PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }
        Ok(RegexBuilder::new(pattern)
            .case_insensitive(!case_sensitive)
            .multi_line(true)
            .build()?)
    }

    fn set_pattern(&mut self, compiled: Result<Regex, PatternError>) {
        match compiled {
            Ok(re) => {
                trace!(target: "find.index", pattern = re.as_str(), "pattern_set");
                self.pattern = Some(re);
            }
            Err(err) => {
                debug!(target: "find.index", %err, "pattern_rejected");
                self.reset();
            }
        }
    }

    /// Drop the pattern and every derived result.
    pub fn reset(&mut self) {
        self.pattern = None;
        self.matches.clear();
        self.by_line.clear();
        self.position = 0;
    }

    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_ref().map(|re| re.as_str())
    }

    /// Rebuild the flattened content, the offset table, the match set and
    /// the per-line index in one scan. Called on content or pattern change,
    /// not per navigation keystroke.
    pub fn compute_all_matches(&mut self, doc: &Document) {
        self.rebuild_content(doc);
        self.matches.clear();
        self.by_line.clear();
        let Some(re) = &self.pattern else {
            self.position = 0;
            return;
        };
        for m in re.find_iter(&self.content) {
            let sel = self.offsets_to_selection(m.start(), m.end());
            let idx = self.matches.len();
            for row in sel.start.row..=sel.end.row {
                self.by_line.entry(row).or_default().push(idx);
            }
            self.matches.push(sel);
        }
        self.position = self.position.min(self.matches.len().saturating_sub(1));
        trace!(
            target: "find.index",
            matches = self.matches.len(),
            position = self.position,
            "recompute"
        );
    }

    /// Single incremental find from a linear byte offset against the *live*
    /// buffer. Used by replace-all so each replacement re-queries instead of
    /// trusting offsets shifted by earlier replacements.
    pub fn compute_next_match(&mut self, doc: &Document, from: usize) -> Option<Selection> {
        self.rebuild_content(doc);
        let re = self.pattern.as_ref()?;
        let from = from.min(self.content.len());
        let m = re.find_at(&self.content, from)?;
        Some(self.offsets_to_selection(m.start(), m.end()))
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn matches(&self) -> &[Selection] {
        &self.matches
    }

    /// Matches overlapping one row, in document order.
    pub fn matches_on_line(&self, row: usize) -> Vec<Selection> {
        self.by_line
            .get(&row)
            .map(|ids| ids.iter().map(|&i| self.matches[i]).collect())
            .unwrap_or_default()
    }

    /// Index of the current match, clamped to the match set.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = position.min(self.matches.len().saturating_sub(1));
    }

    pub fn find_current(&self) -> Option<Selection> {
        self.matches.get(self.position).copied()
    }

    /// Rotate forward, wrapping past the end.
    pub fn find_next(&mut self) -> Option<Selection> {
        if self.matches.is_empty() {
            return None;
        }
        self.position = (self.position + 1) % self.matches.len();
        self.find_current()
    }

    /// Rotate backward, wrapping past the start.
    pub fn find_previous(&mut self) -> Option<Selection> {
        if self.matches.is_empty() {
            return None;
        }
        self.position = (self.position + self.matches.len() - 1) % self.matches.len();
        self.find_current()
    }

    /// Linear byte offset of a cursor in the flattened content.
    pub fn offset_of(&self, cursor: Cursor) -> usize {
        let Some(span) = self.line_table.get(cursor.row) else {
            return self.content.len();
        };
        let line_end = span.start + span.len;
        let line = &self.content[span.start..line_end.min(self.content.len())];
        let col_byte: usize = line
            .char_indices()
            .nth(cursor.col)
            .map(|(b, _)| b)
            .unwrap_or(line.trim_end_matches('\n').len());
        span.start + col_byte
    }

    fn rebuild_content(&mut self, doc: &Document) {
        self.content = doc.flatten();
        self.line_table.clear();
        let mut start = 0usize;
        let last = doc.last_row();
        for (row, line) in doc.lines().iter().enumerate() {
            let mut len = line.as_str().len();
            if row != last {
                len += 1; // the joining '\n'
            }
            self.line_table.push(LineSpan { start, len });
            start += len;
        }
    }

    /// Translate flattened byte offsets to a codepoint-space selection via
    /// the offset table.
    fn offsets_to_selection(&self, start: usize, end: usize) -> Selection {
        Selection::new(self.offset_to_cursor(start), self.offset_to_cursor(end))
    }

    fn offset_to_cursor(&self, offset: usize) -> Cursor {
        let row = match self
            .line_table
            .binary_search_by(|span| span.start.cmp(&offset))
        {
            Ok(row) => row,
            Err(next) => next.saturating_sub(1),
        };
        let Some(span) = self.line_table.get(row) else {
            return Cursor::origin();
        };
        // An offset on the joining '\n' resolves to the line end.
        let within = (offset - span.start).min(span.len);
        let col = self.content[span.start..span.start + within]
            .trim_end_matches('\n')
            .chars()
            .count();
        Cursor::new(row, col)
    }
}
