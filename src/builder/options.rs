//! Reconstruction options and the named geometric heuristics.

use serde::{Deserialize, Serialize};

use crate::model::{FormatKind, Fragment, StyleMap};

/// Numeric thresholds behind the layout heuristics.
///
/// The defaults were tuned against single-font-family rulebook layouts and
/// are kept configurable rather than treated as invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Minimum downward y step that starts a new table row
    pub row_break_epsilon: f32,
    /// Maximum horizontal gap for a fragment to continue the cell on its left
    pub cell_gap: f32,
    /// Heights closer than this belong to the same section
    pub height_tolerance: f32,
    /// Slack allowed above a table's last height for body continuation
    pub table_height_tolerance: f32,
}

impl Thresholds {
    /// A fragment at `y` sits strictly lower than `last_y`, beyond noise.
    pub fn is_row_break(&self, last_y: f32, y: f32) -> bool {
        last_y - y > self.row_break_epsilon
    }

    /// A fragment at `y` sits strictly higher than `last_y`, beyond noise:
    /// reading moved up into the next page column.
    pub fn rises_above(&self, last_y: f32, y: f32) -> bool {
        y - last_y > self.row_break_epsilon
    }

    /// Two heights denote the same heading level.
    pub fn same_height(&self, a: f32, b: f32) -> bool {
        (a - b).abs() <= self.height_tolerance
    }

    /// A fragment of `height` may continue a table whose last fragment had
    /// `table_height`; a larger font starts an unrelated block.
    pub fn continues_table(&self, height: f32, table_height: f32) -> bool {
        height <= table_height + self.table_height_tolerance
    }

    /// A fragment starting at `x` is adjacent to a cell spanning `left..right`.
    pub fn adjoins(&self, left: f32, right: f32, x: f32) -> bool {
        x >= left - self.cell_gap && x - right <= self.cell_gap
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            row_break_epsilon: 1.0,
            cell_gap: 3.0,
            height_tolerance: 0.01,
            table_height_tolerance: 0.01,
        }
    }
}

/// Options for reconstructing a document from fragments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconstructOptions {
    /// Geometric thresholds
    pub thresholds: Thresholds,

    /// Glyphs that open a list item
    pub bullet_glyphs: Vec<char>,

    /// Style id marking table header fragments
    pub table_header_style: Option<String>,

    /// Style id to emphasis mapping
    pub styles: StyleMap,

    /// Build independent documents in parallel
    pub parallel: bool,
}

impl ReconstructOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the style id that marks table header fragments.
    pub fn with_table_header_style(mut self, style_id: impl Into<String>) -> Self {
        self.table_header_style = Some(style_id.into());
        self
    }

    /// Set the style map.
    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.styles = styles;
        self
    }

    /// Set the bullet glyphs.
    pub fn with_bullet_glyphs(mut self, glyphs: impl IntoIterator<Item = char>) -> Self {
        self.bullet_glyphs = glyphs.into_iter().collect();
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Load options from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Check if a fragment carries the table header style.
    pub fn is_table_header(&self, fragment: &Fragment) -> bool {
        match (&self.table_header_style, fragment.style()) {
            (Some(header), Some(style)) => header == style,
            _ => false,
        }
    }

    /// Check if a fragment opens a list item.
    pub fn is_bullet(&self, fragment: &Fragment) -> bool {
        fragment.starts_with_bullet(&self.bullet_glyphs)
    }

    /// Emphasis kind of a fragment.
    pub fn format_of(&self, fragment: &Fragment) -> FormatKind {
        self.styles.classify(fragment.style())
    }
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            bullet_glyphs: vec!['•', '●', '○', '■', '□', '◆', '◇', '▪', '►'],
            table_header_style: None,
            styles: StyleMap::default(),
            parallel: true,
        }
    }
}
