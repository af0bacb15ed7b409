//! Codepoint-indexed line records and the flat document buffer.
//!
//! All cursor/column arithmetic in the engine is expressed in *codepoints*
//! (Unicode scalar values). Lower-level text APIs (word-boundary queries,
//! the regex-based finder) work in UTF-8 byte offsets, so `Line` carries the
//! conversion helpers between the two spaces. Codepoints outside ASCII span
//! multiple bytes; the helpers never produce an offset inside a codepoint.
//!
//! `Line` values are immutable per document version: every edit produces new
//! `Line`s rather than mutating in place, so snapshots captured by the change
//! history stay valid.

use anyhow::Result;

pub mod words;

/// A single line of text addressed by codepoint offset. Never contains `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    text: String,
}

impl Line {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        debug_assert!(!text.contains('\n'), "line records never embed newlines");
        Self { text }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Codepoint count (not byte count).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Map a codepoint offset to the underlying byte offset, clamping to the
    /// line end. The result is always a character boundary.
    pub fn char_to_byte(&self, col: usize) -> usize {
        self.text
            .char_indices()
            .nth(col)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    /// Map a byte offset back to a codepoint offset. Offsets inside a
    /// codepoint resolve to the codepoint they fall within.
    pub fn byte_to_char(&self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        self.text
            .char_indices()
            .take_while(|(b, _)| *b < byte)
            .count()
    }

    pub fn char_at(&self, col: usize) -> Option<char> {
        self.text.chars().nth(col)
    }

    /// Codepoint-space slice `[start, end)`. Caller guarantees
    /// `start <= end <= len`; violations are a caller bug.
    pub fn subsequence(&self, start: usize, end: usize) -> Line {
        debug_assert!(start <= end, "subsequence range must be ordered");
        debug_assert!(end <= self.len(), "subsequence end within line");
        self.subsequence_safely(start, end)
    }

    /// Codepoint-space slice clamped to `[0, len]`; never splits a codepoint
    /// and never panics.
    pub fn subsequence_safely(&self, start: usize, end: usize) -> Line {
        let len = self.len();
        let start = start.min(len);
        let end = end.min(len).max(start);
        let b0 = self.char_to_byte(start);
        let b1 = self.char_to_byte(end);
        Line {
            text: self.text[b0..b1].to_string(),
        }
    }

    /// New line with `other` appended.
    pub fn concat(&self, other: &Line) -> Line {
        let mut text = self.text.clone();
        text.push_str(&other.text);
        Line { text }
    }

    /// New line with `text` spliced in at a codepoint offset (clamped).
    pub fn inserted(&self, col: usize, text: &str) -> Line {
        debug_assert!(!text.contains('\n'), "splice newlines at Document level");
        let b = self.char_to_byte(col.min(self.len()));
        let mut out = String::with_capacity(self.text.len() + text.len());
        out.push_str(&self.text[..b]);
        out.push_str(text);
        out.push_str(&self.text[b..]);
        Line { text: out }
    }

    /// Length of the run of leading space characters, in codepoints.
    pub fn leading_spaces(&self) -> usize {
        self.text.chars().take_while(|c| *c == ' ').count()
    }

    /// Codepoint offset of the first non-space character (line length when
    /// the whole line is spaces).
    pub fn first_non_space(&self) -> usize {
        self.leading_spaces()
    }

    /// Codepoint offset just past the last non-space character.
    pub fn last_non_space_end(&self) -> usize {
        self.len() - self.text.chars().rev().take_while(|c| *c == ' ').count()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.starts_with(prefix)
    }

    /// True when the line contains only spaces (or nothing).
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(|c| c == ' ')
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Line::new(s)
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split arbitrary text into line records. A trailing `\n` yields a trailing
/// empty line, matching how an insertion of `"x\n"` leaves the caret on a
/// fresh line.
pub fn lines_of(text: &str) -> Vec<Line> {
    text.split('\n').map(Line::new).collect()
}

/// The flat ordered line buffer. Adequate for editor-sized documents; not a
/// rope. Always holds at least one (possibly empty) line. Every mutation
/// bumps `version` so collaborators can detect staleness without observing
/// in-place mutation.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<Line>,
    version: u64,
}

impl Document {
    /// Construct from in-memory content, splitting on `\n`.
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(Self {
            lines: lines_of(content),
            version: 0,
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Codepoint length of a row; zero for out-of-range rows.
    pub fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map(Line::len).unwrap_or(0)
    }

    pub fn last_row(&self) -> usize {
        self.lines.len() - 1
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Replace one row with a new record.
    pub fn replace_line(&mut self, row: usize, line: Line) {
        debug_assert!(row < self.lines.len(), "replace_line row in range");
        self.lines[row] = line;
        self.version += 1;
    }

    /// Insert records so they occupy rows `at..at+lines.len()`.
    pub fn insert_lines(&mut self, at: usize, lines: Vec<Line>) {
        debug_assert!(at <= self.lines.len(), "insert_lines at most append");
        self.lines.splice(at..at, lines);
        self.version += 1;
    }

    /// Remove rows `range` and return them. The buffer never becomes empty;
    /// removing every row leaves one empty line.
    pub fn remove_lines(&mut self, range: std::ops::Range<usize>) -> Vec<Line> {
        debug_assert!(range.end <= self.lines.len(), "remove_lines in range");
        let removed: Vec<Line> = self.lines.drain(range).collect();
        if self.lines.is_empty() {
            self.lines.push(Line::empty());
        }
        self.version += 1;
        removed
    }

    /// Flattened content, rows joined by `\n`.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(line.as_str());
        }
        out
    }
}

impl Default for Document {
    fn default() -> Self {
        Self {
            lines: vec![Line::empty()],
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_len_counts_codepoints_not_bytes() {
        let l = Line::new("a😀b");
        assert_eq!(l.len(), 3);
        assert!(l.as_str().len() > 3);
    }

    #[test]
    fn char_byte_round_trip_with_astral_codepoint() {
        let l = Line::new("a😀b");
        let b = l.char_to_byte(2); // offset of 'b'
        assert_eq!(&l.as_str()[b..], "b");
        assert_eq!(l.byte_to_char(b), 2);
        // an offset inside the emoji resolves to the emoji's codepoint index
        assert_eq!(l.byte_to_char(2), 1);
    }

    #[test]
    fn subsequence_safely_clamps_and_never_splits() {
        let l = Line::new("a😀b");
        assert_eq!(l.subsequence_safely(1, 2).as_str(), "😀");
        assert_eq!(l.subsequence_safely(0, 100).as_str(), "a😀b");
        assert_eq!(l.subsequence_safely(5, 2).as_str(), "");
    }

    #[test]
    fn inserted_splices_at_codepoint_offset() {
        let l = Line::new("a😀b");
        assert_eq!(l.inserted(2, "X").as_str(), "a😀Xb");
        assert_eq!(l.inserted(99, "!").as_str(), "a😀b!");
    }

    #[test]
    fn leading_and_trailing_space_scan() {
        let l = Line::new("   x y  ");
        assert_eq!(l.leading_spaces(), 3);
        assert_eq!(l.first_non_space(), 3);
        assert_eq!(l.last_non_space_end(), 6);
        assert!(Line::new("   ").is_blank());
        assert!(!l.is_blank());
    }

    #[test]
    fn lines_of_keeps_trailing_empty_line() {
        let ls = lines_of("ab\ncd\n");
        assert_eq!(ls.len(), 3);
        assert_eq!(ls[2], Line::empty());
        assert_eq!(lines_of("").len(), 1);
    }

    #[test]
    fn document_splice_and_flatten() {
        let mut d = Document::from_str("ab\ncd").unwrap();
        assert_eq!(d.line_count(), 2);
        let v0 = d.version();
        d.insert_lines(1, vec![Line::new("mid")]);
        assert_eq!(d.flatten(), "ab\nmid\ncd");
        assert!(d.version() > v0);
        let removed = d.remove_lines(0..2);
        assert_eq!(removed.len(), 2);
        assert_eq!(d.flatten(), "cd");
    }

    #[test]
    fn document_never_empties() {
        let mut d = Document::from_str("only").unwrap();
        d.remove_lines(0..1);
        assert_eq!(d.line_count(), 1);
        assert_eq!(d.flatten(), "");
    }
}
