//! Positioned text fragments, the input of the reconstruction pipeline.

use serde::{Deserialize, Serialize};

/// One positioned run of text as emitted by a page decoder.
///
/// Coordinates follow the page-description convention: `y` grows upward, so
/// a fragment with a smaller `y` sits lower on the page. Arrival order is
/// significant; fragments are not globally sorted by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    /// The text content
    pub text: String,
    /// Opaque font/style identifier
    #[serde(default, alias = "styleId")]
    pub style_id: Option<String>,
    /// X position (left edge)
    pub x: f32,
    /// Y position
    pub y: f32,
    /// Width of the text
    #[serde(default)]
    pub width: f32,
    /// Glyph height, used as the heading-height signal
    pub height: f32,
}

impl Fragment {
    /// Create a new fragment without a style.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            style_id: None,
            x,
            y,
            width,
            height,
        }
    }

    /// Set the style identifier and return self.
    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Style identifier as a string slice.
    pub fn style(&self) -> Option<&str> {
        self.style_id.as_deref()
    }

    /// Right edge (x + width).
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Check if every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Check if the text is empty or only whitespace.
    pub fn is_only_whitespace(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if the text starts with one of the given bullet glyphs.
    pub fn starts_with_bullet(&self, glyphs: &[char]) -> bool {
        self.text
            .trim_start()
            .chars()
            .next()
            .map(|c| glyphs.contains(&c))
            .unwrap_or(false)
    }
}
