//! Cursor and selection handling.

use crate::buffer::TextBuffer;
use std::fmt;

/// Represents a position in the buffer as (line, column).
/// Both are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Status bar form, 1-indexed: `L: 3 C: 7`.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L: {} C: {}", self.line + 1, self.col + 1)
    }
}

/// A text selection with an anchor and a cursor position.
/// When anchor == cursor, there is no active selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// The anchor point (where selection started).
    pub anchor: usize,
    /// The cursor position (where selection ends / caret is).
    pub cursor: usize,
}

impl Selection {
    /// Creates a new selection at the given position (no active selection).
    pub fn new(pos: usize) -> Self {
        Self {
            anchor: pos,
            cursor: pos,
        }
    }

    /// Returns true if there's an active selection (anchor != cursor).
    pub fn has_selection(&self) -> bool {
        self.anchor != self.cursor
    }

    /// Returns the start and end of the selection (ordered).
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.cursor {
            (self.anchor, self.cursor)
        } else {
            (self.cursor, self.anchor)
        }
    }

    /// Returns the selected range, or None if no selection.
    pub fn selected_range(&self) -> Option<(usize, usize)> {
        if self.has_selection() {
            Some(self.range())
        } else {
            None
        }
    }
}

/// The caret of the edit surface, in character indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    selection: Selection,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the caret position.
    pub fn position(&self) -> usize {
        self.selection.cursor
    }

    /// Moves the caret, extending the selection if requested.
    pub fn set_position(&mut self, pos: usize, extend: bool) {
        self.selection.cursor = pos;
        if !extend {
            self.selection.anchor = pos;
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_range(&self) -> Option<(usize, usize)> {
        self.selection.selected_range()
    }

    /// Shifts the caret and anchor to account for `len` chars inserted at `at`.
    pub fn adjust_for_insert(&mut self, at: usize, len: usize) {
        let shift = |p: usize| if p >= at { p + len } else { p };
        self.selection.anchor = shift(self.selection.anchor);
        self.selection.cursor = shift(self.selection.cursor);
    }

    /// Shifts the caret and anchor to account for chars `[start, end)` removed.
    pub fn adjust_for_remove(&mut self, start: usize, end: usize) {
        let len = end.saturating_sub(start);
        let shift = |p: usize| {
            if p >= end {
                p - len
            } else if p > start {
                start
            } else {
                p
            }
        };
        self.selection.anchor = shift(self.selection.anchor);
        self.selection.cursor = shift(self.selection.cursor);
    }

    /// Keeps the caret and anchor inside the buffer.
    pub fn clamp_to_buffer(&mut self, buffer: &TextBuffer) {
        let max = buffer.len_chars();
        self.selection.anchor = self.selection.anchor.min(max);
        self.selection.cursor = self.selection.cursor.min(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::new(0, 0).to_string(), "L: 1 C: 1");
        assert_eq!(Position::new(2, 6).to_string(), "L: 3 C: 7");
    }

    #[test]
    fn test_selection_range_ordering() {
        let sel = Selection { anchor: 9, cursor: 3 };
        assert_eq!(sel.range(), (3, 9));
        assert!(Selection::new(4).selected_range().is_none());
    }

    #[test]
    fn test_adjust_for_insert() {
        let mut cursor = Cursor::new();
        cursor.set_position(5, false);
        cursor.adjust_for_insert(2, 3);
        assert_eq!(cursor.position(), 8);
        cursor.adjust_for_insert(10, 3);
        assert_eq!(cursor.position(), 8);
    }

    #[test]
    fn test_adjust_for_remove() {
        let mut cursor = Cursor::new();
        cursor.set_position(2, false);
        cursor.set_position(9, true);
        cursor.adjust_for_remove(4, 6);
        assert_eq!(cursor.selected_range(), Some((2, 7)));
        cursor.adjust_for_remove(1, 5);
        assert_eq!(cursor.selected_range(), Some((1, 3)));
    }

    #[test]
    fn test_clamp_to_buffer() {
        let buffer = TextBuffer::from_str("abc");
        let mut cursor = Cursor::new();
        cursor.set_position(10, false);
        cursor.clamp_to_buffer(&buffer);
        assert_eq!(cursor.position(), 3);
    }
}
