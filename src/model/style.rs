//! Emphasis kinds, formatting spans and style-id classification.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Emphasis applied to a range of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    /// Plain text
    #[default]
    None,
    /// Bold text
    Bold,
    /// Italic text
    Italic,
    /// Bold and italic text
    BoldItalic,
}

impl FormatKind {
    /// Build a kind from bold/italic flags.
    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (true, true) => FormatKind::BoldItalic,
            (true, false) => FormatKind::Bold,
            (false, true) => FormatKind::Italic,
            (false, false) => FormatKind::None,
        }
    }

    /// Markdown-style marker wrapped around text of this kind.
    pub fn marker(self) -> &'static str {
        match self {
            FormatKind::None => "",
            FormatKind::Bold => "**",
            FormatKind::Italic => "*",
            FormatKind::BoldItalic => "***",
        }
    }
}

/// A range of a [`TextRun`](super::TextRun)'s string tagged with an emphasis kind.
///
/// `start` and `length` are byte offsets and always fall on char boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSpan {
    /// Emphasis kind
    pub kind: FormatKind,
    /// Byte offset of the first character
    pub start: usize,
    /// Length in bytes
    pub length: usize,
}

impl FormatSpan {
    /// Create a new span.
    pub fn new(kind: FormatKind, start: usize, length: usize) -> Self {
        Self {
            kind,
            start,
            length,
        }
    }

    /// Byte offset one past the last character.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Maps opaque style identifiers to emphasis kinds.
///
/// Ids with no entry are plain text. With `infer_from_name` set, unknown ids
/// that look like font names ("Helvetica-BoldOblique") are classified from
/// their name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleMap {
    /// Explicit style id to kind mapping
    pub formats: HashMap<String, FormatKind>,
    /// Fall back to font-name inference for unmapped ids
    pub infer_from_name: bool,
}

impl StyleMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a style id to a kind and return self.
    pub fn with_style(mut self, style_id: impl Into<String>, kind: FormatKind) -> Self {
        self.formats.insert(style_id.into(), kind);
        self
    }

    /// Enable or disable font-name inference.
    pub fn with_name_inference(mut self, infer: bool) -> Self {
        self.infer_from_name = infer;
        self
    }

    /// Classify a style id.
    pub fn classify(&self, style_id: Option<&str>) -> FormatKind {
        let Some(id) = style_id else {
            return FormatKind::None;
        };

        if let Some(kind) = self.formats.get(id) {
            return *kind;
        }

        if self.infer_from_name {
            let name = id.to_lowercase();
            let bold =
                name.contains("bold") || name.contains("black") || name.contains("heavy");
            let italic = name.contains("italic") || name.contains("oblique");
            return FormatKind::from_flags(bold, italic);
        }

        log::trace!("style {:?} has no formatting entry, treating as plain", id);
        FormatKind::None
    }
}
