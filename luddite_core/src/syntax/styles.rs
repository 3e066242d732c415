//! Per-byte style storage for the edit surface.

use super::highlighter::StyledSpan;
use super::theme::SpanClass;
use std::ops::Range;

/// The visible styling of a buffer: one class per byte.
///
/// Spans are painted in order, so a later span overrides an earlier one for
/// the bytes they share. Text inserted by an edit starts out `Plain`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    classes: Vec<SpanClass>,
}

impl StyleMap {
    /// Creates an all-plain map for a buffer of `len` bytes.
    pub fn new(len: usize) -> Self {
        Self {
            classes: vec![SpanClass::Plain; len],
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Discards all styling and resizes to `len` plain bytes.
    pub fn reset(&mut self, len: usize) {
        self.classes.clear();
        self.classes.resize(len, SpanClass::Plain);
    }

    /// Makes room for `len` bytes inserted at `at`.
    pub fn insert(&mut self, at: usize, len: usize) {
        let at = at.min(self.classes.len());
        self.classes
            .splice(at..at, std::iter::repeat(SpanClass::Plain).take(len));
    }

    /// Drops the styling of a removed byte range.
    pub fn remove(&mut self, range: Range<usize>) {
        let end = range.end.min(self.classes.len());
        let start = range.start.min(end);
        self.classes.drain(start..end);
    }

    /// Paints one span. Bytes past the end of the map are ignored.
    pub fn paint(&mut self, span: &StyledSpan) {
        let end = span.range.end.min(self.classes.len());
        let start = span.range.start.min(end);
        self.classes[start..end].fill(span.class);
    }

    /// Paints spans in order.
    pub fn apply(&mut self, spans: &[StyledSpan]) {
        for span in spans {
            self.paint(span);
        }
    }

    /// Returns the class at a byte offset.
    pub fn class_at(&self, byte: usize) -> Option<SpanClass> {
        self.classes.get(byte).copied()
    }

    /// Coalesces the map into maximal runs of one class, in order.
    pub fn runs(&self) -> Vec<StyledSpan> {
        let mut runs: Vec<StyledSpan> = Vec::new();
        for (offset, &class) in self.classes.iter().enumerate() {
            match runs.last_mut() {
                Some(last) if last.class == class => last.range.end = offset + 1,
                _ => runs.push(StyledSpan::new(offset..offset + 1, class)),
            }
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_paint_overrides() {
        let mut map = StyleMap::new(10);
        map.apply(&[
            StyledSpan::new(0..10, SpanClass::Tag),
            StyledSpan::new(2..5, SpanClass::AttributeName),
        ]);
        assert_eq!(
            map.runs(),
            vec![
                StyledSpan::new(0..2, SpanClass::Tag),
                StyledSpan::new(2..5, SpanClass::AttributeName),
                StyledSpan::new(5..10, SpanClass::Tag),
            ]
        );
    }

    #[test]
    fn test_insert_and_remove_shift_styles() {
        let mut map = StyleMap::new(4);
        map.paint(&StyledSpan::new(2..4, SpanClass::Tag));
        map.insert(2, 3);
        assert_eq!(map.len(), 7);
        assert_eq!(map.class_at(2), Some(SpanClass::Plain));
        assert_eq!(map.class_at(5), Some(SpanClass::Tag));

        map.remove(0..5);
        assert_eq!(map.runs(), vec![StyledSpan::new(0..2, SpanClass::Tag)]);
    }

    #[test]
    fn test_paint_past_end_is_clamped() {
        let mut map = StyleMap::new(3);
        map.paint(&StyledSpan::new(1..9, SpanClass::AttributeValue));
        assert_eq!(map.class_at(2), Some(SpanClass::AttributeValue));
        assert_eq!(map.class_at(3), None);
    }
}
