//! Markup highlighter.
//!
//! Colors tags, attribute names and attribute values with three layered
//! regex passes. The order of the passes matters: names are painted over
//! their tag, and quoted values are painted over any name match that ran
//! into them.

use super::styles::StyleMap;
use super::theme::{Appearance, Color, SpanClass, Theme};
use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]+>").expect("tag pattern is valid"));
static ATTRIBUTE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S\S+=").expect("attribute pattern is valid"));
static ATTRIBUTE_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)".*?""#).expect("value pattern is valid"));

/// A byte range of text with a style class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyledSpan {
    /// Half-open byte range into the text.
    pub range: Range<usize>,
    pub class: SpanClass,
}

impl StyledSpan {
    pub fn new(range: Range<usize>, class: SpanClass) -> Self {
        Self { range, class }
    }

    /// The text this span covers.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }
}

/// Scans `range` of `text` and returns the spans to paint, in paint order.
///
/// The first span resets the whole range to `Plain`. Each tag is followed by
/// the attribute names and then the attribute values found inside it.
/// The range is clamped to the text and widened to character boundaries.
/// Unterminated tags or quotes simply produce no span.
pub fn scan(text: &str, range: Range<usize>) -> Vec<StyledSpan> {
    let range = clamp_to_chars(text, range);
    if range.is_empty() {
        return Vec::new();
    }

    let mut spans = vec![StyledSpan::new(range.clone(), SpanClass::Plain)];
    let base = range.start;

    for tag in TAG.find_iter(&text[range]) {
        let tag_start = base + tag.start();
        spans.push(StyledSpan::new(tag_start..base + tag.end(), SpanClass::Tag));

        let inner = tag.as_str();
        spans.extend(ATTRIBUTE_NAME.find_iter(inner).map(|m| {
            StyledSpan::new(tag_start + m.start()..tag_start + m.end(), SpanClass::AttributeName)
        }));
        spans.extend(ATTRIBUTE_VALUE.find_iter(inner).map(|m| {
            StyledSpan::new(tag_start + m.start()..tag_start + m.end(), SpanClass::AttributeValue)
        }));
    }

    spans
}

/// Clamps a byte range to `text`, widening it outward to char boundaries.
fn clamp_to_chars(text: &str, range: Range<usize>) -> Range<usize> {
    let mut end = range.end.min(text.len());
    let mut start = range.start.min(end);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end += 1;
    }
    start..end
}

fn sync_len(styles: &mut StyleMap, len: usize) {
    if styles.len() != len {
        log::warn!(
            "style map out of sync ({} bytes for {} bytes of text), resetting",
            styles.len(),
            len
        );
        styles.reset(len);
    }
}

/// Applies markup highlighting to a style map, using the palette of the
/// current appearance.
#[derive(Debug, Clone, Default)]
pub struct MarkupHighlighter {
    theme: Theme,
}

impl MarkupHighlighter {
    /// Creates a highlighter for the given appearance.
    pub fn new(appearance: Appearance) -> Self {
        Self {
            theme: Theme::for_appearance(appearance),
        }
    }

    /// Switches palettes. Styles are stored as classes, so nothing is rescanned.
    pub fn set_appearance(&mut self, appearance: Appearance) {
        self.theme = Theme::for_appearance(appearance);
    }

    /// Returns a reference to the current theme.
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Highlights `range` of `text` into `styles`. Nothing outside the range is touched.
    pub fn highlight(
        &self,
        text: &str,
        range: Range<usize>,
        styles: &mut StyleMap,
    ) -> Vec<StyledSpan> {
        sync_len(styles, text.len());
        let spans = scan(text, range);
        styles.apply(&spans);
        spans
    }

    /// Highlights `fragment`, the bytes starting at `offset` of a text
    /// `total_len` bytes long. Spans come back in whole-text offsets.
    pub fn highlight_fragment(
        &self,
        fragment: &str,
        offset: usize,
        total_len: usize,
        styles: &mut StyleMap,
    ) -> Vec<StyledSpan> {
        sync_len(styles, total_len);
        let mut spans = scan(fragment, 0..fragment.len());
        for span in &mut spans {
            span.range = span.range.start + offset..span.range.end + offset;
        }
        styles.apply(&spans);
        spans
    }

    /// Highlights the whole buffer.
    pub fn highlight_all(&self, text: &str, styles: &mut StyleMap) -> Vec<StyledSpan> {
        self.highlight(text, 0..text.len(), styles)
    }

    /// Gets the color for a byte offset, falling back to the foreground.
    pub fn color_at(&self, styles: &StyleMap, byte: usize) -> Color {
        self.theme.color(styles.class_at(byte).unwrap_or_default())
    }
}
