//! The edit surface: buffer, caret, styling and the metadata panels.

use crate::buffer::TextBuffer;
use crate::cursor::{Cursor, Position};
use crate::document::{Document, DocumentId, Timestamp};
use crate::stats::StatsTracker;
use crate::syntax::{Appearance, MarkupHighlighter, StyleMap, StyledSpan};
use chrono::{Duration, Local};
use std::ops::Range;

/// Metadata fields shown around the edit surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub title: String,
    /// `Mar 05, 2024`, or `...` when unknown.
    pub created: String,
    /// `Mar 05, 2024 @ 09:41:07`, or `...` when unknown.
    pub updated: String,
    pub is_draft: bool,
    /// Publication date; an hour from now when the document has none yet.
    pub published: Timestamp,
}

impl Metadata {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            title: doc.title().to_string(),
            created: doc
                .date_created()
                .map(|d| d.format("%b %d, %Y").to_string())
                .unwrap_or_else(|| "...".to_string()),
            updated: doc
                .date_updated()
                .map(|d| d.format("%b %d, %Y @ %I:%M:%S").to_string())
                .unwrap_or_else(|| "...".to_string()),
            is_draft: doc.is_draft().unwrap_or(false),
            published: doc
                .date_published()
                .unwrap_or_else(|| Local::now() + Duration::hours(1)),
        }
    }
}

/// The editing surface state.
///
/// Holds the live text of one document. Styling is kept per byte and shifted
/// along with edits; only the ranges the session asks for are re-highlighted.
#[derive(Debug, Clone)]
pub struct Editor {
    /// The document whose text is loaded, if any.
    document: Option<DocumentId>,
    /// The text buffer.
    buffer: TextBuffer,
    /// The cursor.
    cursor: Cursor,
    /// Visible styling of the buffer.
    styles: StyleMap,
    /// Markup highlighter.
    highlighter: MarkupHighlighter,
    /// Status bar counts.
    stats: StatsTracker,
    /// Metadata panel contents.
    metadata: Option<Metadata>,
    /// First visible line.
    scroll_offset: usize,
    /// Number of visible lines; `None` treats the whole buffer as visible.
    visible_lines: Option<usize>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Appearance::default(), None)
    }
}

impl Editor {
    /// Creates an empty surface.
    pub fn new(appearance: Appearance, visible_lines: Option<usize>) -> Self {
        Self {
            document: None,
            buffer: TextBuffer::new(),
            cursor: Cursor::new(),
            styles: StyleMap::new(0),
            highlighter: MarkupHighlighter::new(appearance),
            stats: StatsTracker::new(),
            metadata: None,
            scroll_offset: 0,
            visible_lines: visible_lines.filter(|&n| n > 0),
        }
    }

    /// Loads a document's text, resetting caret, scroll and styling.
    pub fn load(&mut self, document: DocumentId, text: &str) {
        self.document = Some(document);
        self.buffer = TextBuffer::from_str(text);
        self.cursor = Cursor::new();
        self.scroll_offset = 0;
        self.styles.reset(text.len());
        self.stats.invalidate();
    }

    /// Replaces the text of the loaded document, keeping caret and scroll where possible.
    pub fn replace_text(&mut self, text: &str) {
        self.buffer = TextBuffer::from_str(text);
        self.cursor.clamp_to_buffer(&self.buffer);
        self.set_scroll_offset(self.scroll_offset);
        self.styles.reset(text.len());
        self.stats.invalidate();
    }

    /// Empties the surface.
    pub fn clear(&mut self) {
        self.document = None;
        self.buffer = TextBuffer::new();
        self.cursor = Cursor::new();
        self.styles.reset(0);
        self.stats = StatsTracker::new();
        self.metadata = None;
        self.scroll_offset = 0;
    }

    /// The document whose text is loaded.
    pub fn document(&self) -> Option<DocumentId> {
        self.document
    }

    /// Returns a reference to the buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Returns the entire text.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    /// Returns true if the surface shows exactly `text`.
    pub fn shows(&self, text: &str) -> bool {
        self.buffer.matches(text)
    }

    pub fn len_bytes(&self) -> usize {
        self.buffer.len_bytes()
    }

    // ==================== Caret ====================

    /// Returns the caret character index.
    pub fn cursor_char_index(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the caret position as (line, column).
    pub fn cursor_position(&self) -> Position {
        let (line, col) = self.buffer.char_to_line_col(self.cursor.position());
        Position::new(line, col)
    }

    /// Moves the caret to a character index.
    pub fn set_cursor(&mut self, char_idx: usize, extend_selection: bool) {
        self.cursor
            .set_position(char_idx.min(self.buffer.len_chars()), extend_selection);
    }

    /// Returns the selected range if any, as character indices.
    pub fn selected_range(&self) -> Option<(usize, usize)> {
        self.cursor.selected_range()
    }

    // ==================== Viewport ====================

    /// Returns the scroll offset (first visible line).
    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Sets the scroll offset directly.
    pub fn set_scroll_offset(&mut self, offset: usize) {
        let max_offset = self.buffer.len_lines().saturating_sub(1);
        self.scroll_offset = offset.min(max_offset);
    }

    /// Sets the number of visible lines, `None` or `0` for the whole buffer.
    pub fn set_visible_lines(&mut self, lines: Option<usize>) {
        self.visible_lines = lines.filter(|&n| n > 0);
    }

    /// Byte range currently on screen.
    pub fn visible_byte_range(&self) -> Range<usize> {
        match self.visible_lines {
            Some(lines) => self.buffer.line_byte_range(self.scroll_offset, lines),
            None => 0..self.buffer.len_bytes(),
        }
    }

    // ==================== Text Editing ====================

    /// Inserts text at the caret, replacing the selection.
    /// Returns false if nothing changed.
    pub fn insert_text(&mut self, text: &str) -> bool {
        let removed = self.delete_selection();
        if text.is_empty() {
            return removed;
        }
        let pos = self.cursor.position();
        self.insert_at(pos, text);
        true
    }

    /// Inserts text at a character index. The caret shifts if it sits at or after it.
    pub fn insert_at(&mut self, char_idx: usize, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let char_idx = char_idx.min(self.buffer.len_chars());
        let byte = self.buffer.insert(char_idx, text);
        self.styles.insert(byte, text.len());
        self.cursor.adjust_for_insert(char_idx, text.chars().count());
        true
    }

    /// Removes characters `[start, end)`.
    pub fn remove(&mut self, start: usize, end: usize) -> bool {
        let bytes = self.buffer.remove(start, end);
        if bytes.is_empty() {
            return false;
        }
        self.styles.remove(bytes);
        self.cursor.adjust_for_remove(start, end);
        true
    }

    /// Deletes the selection or the character before the caret (backspace).
    pub fn delete_backward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let pos = self.cursor.position();
        pos > 0 && self.remove(pos - 1, pos)
    }

    /// Deletes the current selection.
    /// Returns true if there was a selection to delete.
    fn delete_selection(&mut self) -> bool {
        match self.cursor.selected_range() {
            Some((start, end)) => {
                self.remove(start, end);
                self.cursor.set_position(start, false);
                true
            }
            None => false,
        }
    }

    // ==================== Styling ====================

    /// Re-highlights a byte range of the buffer.
    pub fn highlight_range(&mut self, range: Range<usize>) -> Vec<StyledSpan> {
        let range = self.buffer.char_aligned(range);
        let fragment = self.buffer.slice_to_string(range.clone());
        self.highlighter.highlight_fragment(
            &fragment,
            range.start,
            self.buffer.len_bytes(),
            &mut self.styles,
        )
    }

    /// Re-highlights the whole buffer.
    pub fn highlight_all(&mut self) -> Vec<StyledSpan> {
        self.highlight_range(0..self.buffer.len_bytes())
    }

    /// Paints spans computed elsewhere (the background worker).
    pub fn apply_spans(&mut self, spans: &[StyledSpan]) {
        self.styles.apply(spans);
    }

    pub fn styles(&self) -> &StyleMap {
        &self.styles
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.highlighter.set_appearance(appearance);
    }

    // ==================== Panels ====================

    pub fn stats(&self) -> &StatsTracker {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut StatsTracker {
        &mut self.stats
    }

    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Pushes document metadata into the panels. Text and caret are untouched.
    pub fn set_metadata(&mut self, metadata: Metadata) {
        self.metadata = Some(metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::SpanClass;
    use chrono::TimeZone;

    fn loaded(text: &str) -> Editor {
        let mut editor = Editor::default();
        editor.load(DocumentId::new(), text);
        editor
    }

    #[test]
    fn test_load_resets_caret_and_styles() {
        let mut editor = loaded("<p>one</p>");
        editor.set_cursor(4, false);
        editor.highlight_all();
        editor.load(DocumentId::new(), "two");
        assert_eq!(editor.cursor_char_index(), 0);
        assert_eq!(editor.styles().len(), 3);
        assert_eq!(editor.styles().class_at(0), Some(SpanClass::Plain));
    }

    #[test]
    fn test_insert_text_moves_caret() {
        let mut editor = loaded("ac");
        editor.set_cursor(1, false);
        assert!(editor.insert_text("b"));
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.cursor_char_index(), 2);
        assert_eq!(editor.styles().len(), 3);
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut editor = loaded("hello world");
        editor.set_cursor(0, false);
        editor.set_cursor(5, true);
        editor.insert_text("bye");
        assert_eq!(editor.text(), "bye world");
        assert_eq!(editor.cursor_char_index(), 3);
    }

    #[test]
    fn test_delete_backward() {
        let mut editor = loaded("abc");
        editor.set_cursor(3, false);
        assert!(editor.delete_backward());
        assert_eq!(editor.text(), "ab");
        editor.set_cursor(0, false);
        assert!(!editor.delete_backward());
    }

    #[test]
    fn test_styles_follow_edits() {
        let mut editor = loaded("<b>x</b>");
        editor.highlight_all();
        editor.insert_at(0, "hi ");
        assert_eq!(editor.styles().class_at(0), Some(SpanClass::Plain));
        assert_eq!(editor.styles().class_at(3), Some(SpanClass::Tag));
        editor.remove(0, 3);
        assert_eq!(editor.styles().class_at(0), Some(SpanClass::Tag));
    }

    #[test]
    fn test_replace_text_keeps_caret() {
        let mut editor = loaded("abcdef");
        editor.set_cursor(4, false);
        editor.replace_text("abcdefgh");
        assert_eq!(editor.cursor_char_index(), 4);
        editor.replace_text("ab");
        assert_eq!(editor.cursor_char_index(), 2);
    }

    #[test]
    fn test_visible_byte_range() {
        let mut editor = loaded("l0\nl1\nl2\nl3\n");
        assert_eq!(editor.visible_byte_range(), 0..12);
        editor.set_visible_lines(Some(2));
        editor.set_scroll_offset(1);
        assert_eq!(editor.visible_byte_range(), 3..9);
        editor.set_visible_lines(Some(0));
        assert_eq!(editor.visible_byte_range(), 0..12);
    }

    #[test]
    fn test_highlight_range_touches_only_that_range() {
        let mut editor = loaded("<b>é</b>\n<i>y</i>");
        let start = "<b>é</b>\n".len();
        let spans = editor.highlight_range(start..editor.len_bytes());

        assert_eq!(spans[0], StyledSpan::new(start..editor.len_bytes(), SpanClass::Plain));
        assert_eq!(spans[1], StyledSpan::new(start..start + 3, SpanClass::Tag));
        assert_eq!(editor.styles().class_at(0), Some(SpanClass::Plain));
        assert_eq!(editor.styles().class_at(start), Some(SpanClass::Tag));

        // A range starting inside a character widens to include it.
        editor.highlight_range(4..99);
        assert_eq!(editor.styles().class_at(5), Some(SpanClass::Tag));
    }

    #[test]
    fn test_cursor_position_label() {
        let mut editor = loaded("ab\ncd");
        editor.set_cursor(4, false);
        assert_eq!(editor.cursor_position().to_string(), "L: 2 C: 2");
    }

    #[test]
    fn test_metadata_from_document() {
        let created = Local.with_ymd_and_hms(2024, 3, 5, 9, 41, 7).single().unwrap();
        let doc = Document::new("Title", created);
        let metadata = Metadata::from_document(&doc);
        assert_eq!(metadata.title, "Title");
        assert_eq!(metadata.created, "Mar 05, 2024");
        assert_eq!(metadata.updated, "Mar 05, 2024 @ 09:41:07");
        assert!(!metadata.is_draft);
        assert!(metadata.published > Local::now());
    }
}
