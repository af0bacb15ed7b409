//! Granularity step computations. Pure position math over the owned
//! document; selection handling and side effects stay in `lib.rs`.

use crate::{Direction, InputTarget};
use core_model::Cursor;
use core_text::words;

impl InputTarget {
    pub(crate) fn char_step(&self, from: Cursor, dir: Direction) -> Cursor {
        match dir {
            Direction::Prev => {
                if from.col > 0 {
                    Cursor::new(from.row, from.col - 1)
                } else if from.row > 0 {
                    Cursor::new(from.row - 1, self.document().line_len(from.row - 1))
                } else {
                    Cursor::origin()
                }
            }
            Direction::Next => {
                let len = self.document().line_len(from.row);
                if from.col < len {
                    Cursor::new(from.row, from.col + 1)
                } else if from.row < self.document().last_row() {
                    Cursor::new(from.row + 1, 0)
                } else {
                    Cursor::new(from.row, len)
                }
            }
        }
    }

    pub(crate) fn word_step(&self, from: Cursor, dir: Direction) -> Cursor {
        match dir {
            Direction::Next => {
                let len = self.document().line_len(from.row);
                if from.col >= len {
                    if from.row < self.document().last_row() {
                        return Cursor::new(from.row + 1, 0);
                    }
                    return Cursor::new(from.row, len);
                }
                Cursor::new(from.row, self.word_end_after(from.row, from.col))
            }
            Direction::Prev => {
                if from.col == 0 {
                    if from.row > 0 {
                        return Cursor::new(from.row - 1, self.document().line_len(from.row - 1));
                    }
                    return Cursor::origin();
                }
                Cursor::new(from.row, self.word_start_before(from.row, from.col))
            }
        }
    }

    /// Column after the word at-or-after `col`. Leading break characters are
    /// skipped; the oracle's segment is truncated at any embedded break
    /// character. A non-advancing oracle answer degrades to a column-by-column
    /// walk, terminating at the line length.
    fn word_end_after(&self, row: usize, col: usize) -> usize {
        let Some(line) = self.document().line(row) else {
            return col;
        };
        let len = line.len();
        let mut c = col;
        while c < len && line.char_at(c).is_some_and(words::is_break_char) {
            c += 1;
        }
        if c >= len {
            return len;
        }
        let range = self.oracle.word_range(line.as_str(), line.char_to_byte(c));
        let end = line.byte_to_char(range.end);
        if end <= c {
            return self.word_end_after(row, c + 1);
        }
        for i in c..end {
            if line.char_at(i).is_some_and(words::is_break_char) {
                return i.max(c + 1);
            }
        }
        end
    }

    /// Column of the word start strictly before `col`; symmetric to
    /// `word_end_after`, terminating at 0.
    fn word_start_before(&self, row: usize, col: usize) -> usize {
        let Some(line) = self.document().line(row) else {
            return 0;
        };
        let mut c = col.min(line.len());
        while c > 0 && line.char_at(c - 1).is_some_and(words::is_break_char) {
            c -= 1;
        }
        if c == 0 {
            return 0;
        }
        let range = self.oracle.word_range(line.as_str(), line.char_to_byte(c - 1));
        let start = line.byte_to_char(range.start);
        if start >= c {
            return self.word_start_before(row, c - 1);
        }
        for i in (start..c - 1).rev() {
            if line.char_at(i).is_some_and(words::is_break_char) {
                return i + 1;
            }
        }
        start
    }

    /// Paragraph movement degrades to line start/end (no soft wrap): rows
    /// advance only when the cursor already sits at the line's edge.
    pub(crate) fn paragraph_step(&self, from: Cursor, dir: Direction) -> Cursor {
        match dir {
            Direction::Prev => {
                if from.col > 0 {
                    Cursor::new(from.row, 0)
                } else if from.row > 0 {
                    Cursor::new(from.row - 1, 0)
                } else {
                    Cursor::origin()
                }
            }
            Direction::Next => {
                let len = self.document().line_len(from.row);
                if from.col < len {
                    Cursor::new(from.row, len)
                } else if from.row < self.document().last_row() {
                    Cursor::new(from.row + 1, self.document().line_len(from.row + 1))
                } else {
                    Cursor::new(from.row, len)
                }
            }
        }
    }

    /// Vertical movement restoring the intended column on longer lines.
    pub(crate) fn vertical_step(&self, from: Cursor, dir: Direction, rows: usize) -> Cursor {
        let intent = from.last_col.max(from.col);
        let row = match dir {
            Direction::Prev => from.row.saturating_sub(rows),
            Direction::Next => (from.row + rows).min(self.document().last_row()),
        };
        let col = intent.min(self.document().line_len(row));
        Cursor::with_last(row, col, intent)
    }
}
