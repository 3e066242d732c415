//! Character, word and line counts for the status bar.

use std::fmt;

/// Counts shown in the status bar as `chars / words / lines`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
}

impl TextStats {
    /// Computes the counts for `text`.
    ///
    /// An empty text has one line, and a trailing newline opens another.
    pub fn compute(text: &str) -> Self {
        let mut lines = text.lines().count();
        if text.is_empty() || text.ends_with('\n') {
            lines += 1;
        }
        Self {
            chars: text.chars().count(),
            words: text.split_whitespace().count(),
            lines,
        }
    }
}

impl fmt::Display for TextStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.chars, self.words, self.lines)
    }
}

/// Skips recomputation while the buffer length stays the same.
///
/// Cursor-only movement never changes the length, so it never pays for a
/// full scan. This is a cost control, not a correctness guarantee: an edit
/// that replaces text with text of equal length keeps the old counts.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    previous_len: Option<usize>,
    current: Option<TextStats>,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true (and remembers `len`) if stats should be recomputed.
    pub fn should_recompute(&mut self, len: usize) -> bool {
        if self.previous_len == Some(len) {
            return false;
        }
        self.previous_len = Some(len);
        true
    }

    /// Stores freshly computed stats.
    pub fn update(&mut self, stats: TextStats) {
        self.current = Some(stats);
    }

    /// Forgets the remembered length so the next check recomputes.
    pub fn invalidate(&mut self) {
        self.previous_len = None;
    }

    pub fn current(&self) -> Option<TextStats> {
        self.current
    }

    /// Status bar text, `...` until the first computation lands.
    pub fn label(&self) -> String {
        self.current
            .map(|s| s.to_string())
            .unwrap_or_else(|| "...".to_string())
    }
}
