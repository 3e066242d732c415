//! Theme system for markup highlighting.
//!
//! Two fixed palettes, picked by the display appearance.

use serde::{Deserialize, Serialize};

/// Style classes produced by the markup highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpanClass {
    /// A whole `<...>` tag.
    Tag,
    /// An attribute name including its `=`.
    AttributeName,
    /// A double-quoted attribute value including the quotes.
    AttributeValue,
    /// Default text (no special highlighting)
    #[default]
    Plain,
}

/// Display appearance the palette follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

/// RGBA color represented as [r, g, b, a] with values 0.0-1.0.
pub type Color = [f32; 4];

/// A markup highlighting theme.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Theme name.
    pub name: &'static str,
    /// Default text color, used for `Plain`.
    pub foreground: Color,
    /// Colors for Tag, AttributeName and AttributeValue, in that order.
    palette: [Color; 3],
}

impl Theme {
    /// Dark palette: teal tags, gray attribute names, purple values.
    pub fn dark() -> Self {
        Self {
            name: "Dark",
            foreground: [0.875, 0.875, 0.875, 1.0], // #DFDFDF
            palette: [
                [0.416, 0.769, 0.863, 1.0], // #6AC4DC
                [0.596, 0.596, 0.616, 1.0], // #98989D
                [0.749, 0.353, 0.949, 1.0], // #BF5AF2
            ],
        }
    }

    /// Light palette: blue tags, purple attribute names, gray values.
    pub fn light() -> Self {
        Self {
            name: "Light",
            foreground: [0.0, 0.0, 0.0, 0.85], // control text
            palette: [
                [0.0, 0.478, 1.0, 1.0],     // #007AFF
                [0.686, 0.322, 0.871, 1.0], // #AF52DE
                [0.557, 0.557, 0.576, 1.0], // #8E8E93
            ],
        }
    }

    /// Returns the theme for a display appearance.
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::light(),
            Appearance::Dark => Self::dark(),
        }
    }

    /// Gets the color for a style class.
    pub fn color(&self, class: SpanClass) -> Color {
        match class {
            SpanClass::Tag => self.palette[0],
            SpanClass::AttributeName => self.palette[1],
            SpanClass::AttributeValue => self.palette[2],
            SpanClass::Plain => self.foreground,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
