//! Document-level types.

use std::fmt;

use serde::Serialize;

use super::{Part, Section};

/// A reconstructed document: sections in reading order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Sections in the order they were opened
    pub sections: Vec<Section>,

    /// Non-fatal layout problems found while rebuilding tables
    pub diagnostics: Vec<Diagnostic>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of sections.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Check if the document has no sections.
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Iterate over every part of every section.
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.sections.iter().flat_map(|s| s.parts().iter())
    }

    /// Number of tables across all sections.
    pub fn table_count(&self) -> usize {
        self.parts()
            .filter(|p| matches!(p, Part::Table(_)))
            .count()
    }

    /// Number of text paragraphs across all sections.
    pub fn paragraph_count(&self) -> usize {
        self.parts().filter(|p| matches!(p, Part::Text(_))).count()
    }

    /// Deepest resolved heading depth, if any section has one.
    pub fn max_depth(&self) -> Option<usize> {
        self.sections.iter().filter_map(|s| s.depth().ok()).max()
    }

    /// Get plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        self.sections
            .iter()
            .map(|section| section.plain_text())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// A layout problem that was resolved with a best-effort default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A table header grid had more rows than title, label and column names.
    UnexpectedHeaderRows {
        /// Number of header rows found
        rows: usize,
    },

    /// A stacked header label did not sit above any column name and was
    /// attached to the nearest one.
    UnmatchedHeaderLabel {
        /// Label text
        label: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnexpectedHeaderRows { rows } => {
                write!(f, "table has {} header rows, expected at most 3", rows)
            }
            Diagnostic::UnmatchedHeaderLabel { label } => {
                write!(f, "header label \"{}\" matched no column", label)
            }
        }
    }
}
