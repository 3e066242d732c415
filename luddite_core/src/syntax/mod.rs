//! Markup highlighting module.
//!
//! Provides range-scoped tag/attribute highlighting over a per-byte style map.

mod highlighter;
mod styles;
mod theme;

pub use highlighter::{scan, MarkupHighlighter, StyledSpan};
pub use styles::StyleMap;
pub use theme::{Appearance, Color, SpanClass, Theme};
