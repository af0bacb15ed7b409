//! Word-boundary helpers layered over `unicode-segmentation`.
//!
//! Navigation treats word boundaries as an external oracle intersected with a
//! fixed punctuation break set; this module supplies the default oracle
//! implementation. All offsets here are UTF-8 byte offsets into a single
//! line; callers convert to/from codepoint columns via `Line`.

use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Characters that always terminate a word regardless of what the
/// segmentation oracle reports.
pub const BREAK_CHARS: &[char] = &[
    ' ', '\t', '.', ',', ';', ':', '!', '?', '\'', '"', '`', '(', ')', '[', ']', '{', '}', '<',
    '>', '/', '\\', '|', '@', '#', '$', '%', '^', '&', '*', '+', '-', '=', '~',
];

pub fn is_break_char(c: char) -> bool {
    BREAK_CHARS.contains(&c)
}

/// Word classification used by the finder's word-search assertions.
pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Byte range of the word-bound segment containing `byte`. Returns an empty
/// range at the line end. `byte` past the end clamps to the end.
pub fn segment_at(line: &str, byte: usize) -> Range<usize> {
    if byte >= line.len() {
        return line.len()..line.len();
    }
    for (start, seg) in line.split_word_bound_indices() {
        let end = start + seg.len();
        if byte >= start && byte < end {
            return start..end;
        }
    }
    line.len()..line.len()
}
