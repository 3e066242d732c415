//! Text buffer backing the edit surface, using ropey.

use ropey::Rope;
use std::ops::Range;

/// A text buffer backed by a rope data structure.
/// Edits are addressed in characters; highlighting works in bytes.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    /// Creates a new empty text buffer.
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Creates a text buffer from a string.
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Returns the total number of characters in the buffer.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the total number of UTF-8 bytes in the buffer.
    pub fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    /// Returns the total number of lines in the buffer.
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns true if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Inserts a string at the given character index.
    /// Returns the byte offset the text landed at.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> usize {
        let idx = char_idx.min(self.len_chars());
        let byte = self.rope.char_to_byte(idx);
        self.rope.insert(idx, text);
        byte
    }

    /// Removes text in the given character range.
    /// Returns the removed byte range, empty when nothing was removed.
    pub fn remove(&mut self, start: usize, end: usize) -> Range<usize> {
        let start = start.min(self.len_chars());
        let end = end.min(self.len_chars());
        if start >= end {
            let byte = self.rope.char_to_byte(start);
            return byte..byte;
        }
        let bytes = self.rope.char_to_byte(start)..self.rope.char_to_byte(end);
        self.rope.remove(start..end);
        bytes
    }

    /// Converts a character index to a byte offset.
    pub fn char_to_byte(&self, char_idx: usize) -> usize {
        self.rope.char_to_byte(char_idx.min(self.len_chars()))
    }

    /// Clamps a byte range to the buffer, widening it outward to char boundaries.
    pub fn char_aligned(&self, range: Range<usize>) -> Range<usize> {
        let end = range.end.min(self.len_bytes());
        let start = range.start.min(end);
        let start = self.rope.char_to_byte(self.rope.byte_to_char(start));
        let end_char = self.rope.byte_to_char(end);
        let end = if self.rope.char_to_byte(end_char) < end {
            self.rope.char_to_byte(end_char + 1)
        } else {
            end
        };
        start..end
    }

    /// Copies out the bytes in `range`, which must lie on char boundaries.
    pub fn slice_to_string(&self, range: Range<usize>) -> String {
        self.rope.byte_slice(range).to_string()
    }

    /// Converts a character index to a (line, column) position.
    /// Both line and column are 0-indexed.
    pub fn char_to_line_col(&self, char_idx: usize) -> (usize, usize) {
        let char_idx = char_idx.min(self.len_chars());
        let line = self.rope.char_to_line(char_idx);
        let line_start = self.rope.line_to_char(line);
        (line, char_idx - line_start)
    }

    /// Returns the byte range covering lines `[first, first + count)`.
    pub fn line_byte_range(&self, first: usize, count: usize) -> Range<usize> {
        let lines = self.len_lines();
        let first = first.min(lines);
        let last = first.saturating_add(count).min(lines);
        let start = self.rope.line_to_byte(first);
        let end = if last >= lines {
            self.len_bytes()
        } else {
            self.rope.line_to_byte(last)
        };
        start..end
    }

    /// Returns the entire buffer as a string.
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Returns true if the buffer holds exactly `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.rope.len_bytes() == text.len() && self.rope == text
    }
}
