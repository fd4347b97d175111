//! # unlayout
//!
//! Rebuild hierarchical documents from positioned text fragments.
//!
//! A page decoder emits a flat stream of fragments (text, style id and a
//! bounding box). This library turns that stream into sections of
//! paragraphs and tables, with heading depths derived from glyph height and
//! bold/italic spans carried through.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unlayout::{reconstruct_file, render};
//!
//! fn main() -> unlayout::Result<()> {
//!     // Load a fragment dump and rebuild the document
//!     let doc = reconstruct_file("fragments.json")?;
//!
//!     for section in &doc.sections {
//!         println!("depth {}: {} parts", section.depth()?, section.parts().len());
//!     }
//!
//!     let text = render::to_text(&doc, &render::TextOptions::default())?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Heading depth**: distinct glyph heights ranked tallest first
//! - **Paragraph merging**: whitespace noise absorbed, emphasis spans merged
//! - **Table reconstruction**: multi-line cells, split page columns and
//!   stacked header labels
//! - **Parallel processing**: independent documents built with Rayon

pub mod builder;
pub mod error;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use builder::{
    build_document, build_documents, DepthRegistry, DocumentBuilder, FragmentDump,
    FragmentSource, ReconstructOptions, Thresholds,
};
pub use error::{Error, Result};
pub use model::{
    Diagnostic, Document, FormatKind, FormatSpan, Fragment, Part, Section, StyleMap, TableBlock,
    TextRun,
};
pub use render::{JsonFormat, TextOptions};

use std::path::Path;

/// Rebuild a document from any fragment source with default options.
///
/// # Example
///
/// ```
/// use unlayout::{reconstruct, Fragment};
///
/// let pages = vec![vec![
///     Fragment::new("Barbarian", 50.0, 700.0, 90.0, 18.0),
///     Fragment::new("Rage", 50.0, 680.0, 30.0, 10.0),
/// ]];
/// let doc = reconstruct(&pages).unwrap();
/// assert_eq!(doc.section_count(), 2);
/// ```
pub fn reconstruct<S: FragmentSource + ?Sized>(source: &S) -> Result<Document> {
    build_document(source, &ReconstructOptions::default())
}

/// Rebuild a document from any fragment source with custom options.
pub fn reconstruct_with_options<S: FragmentSource + ?Sized>(
    source: &S,
    options: &ReconstructOptions,
) -> Result<Document> {
    build_document(source, options)
}

/// Load a JSON fragment dump and rebuild the document.
///
/// # Arguments
///
/// * `path` - Path to a `{ "pages": [[fragment, ...], ...] }` file
///
/// # Example
///
/// ```no_run
/// use unlayout::reconstruct_file;
///
/// let doc = reconstruct_file("fragments.json").unwrap();
/// println!("Sections: {}", doc.section_count());
/// ```
pub fn reconstruct_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    reconstruct_file_with_options(path, &ReconstructOptions::default())
}

/// Load a JSON fragment dump and rebuild the document with custom options.
///
/// # Example
///
/// ```no_run
/// use unlayout::{reconstruct_file_with_options, ReconstructOptions};
///
/// let options = ReconstructOptions::new().with_table_header_style("TableHeader");
/// let doc = reconstruct_file_with_options("fragments.json", &options).unwrap();
/// ```
pub fn reconstruct_file_with_options<P: AsRef<Path>>(
    path: P,
    options: &ReconstructOptions,
) -> Result<Document> {
    let dump = FragmentDump::from_path(path)?;
    build_document(&dump, options)
}

/// Extract plain text from a fragment dump.
///
/// # Example
///
/// ```no_run
/// use unlayout::extract_text;
///
/// let text = extract_text("fragments.json").unwrap();
/// println!("{}", text);
/// ```
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = reconstruct_file(path)?;
    render::to_text(&doc, &TextOptions::default())
}

/// Convert a fragment dump to JSON.
///
/// # Example
///
/// ```no_run
/// use unlayout::{to_json, JsonFormat};
///
/// let json = to_json("fragments.json", JsonFormat::Pretty).unwrap();
/// std::fs::write("document.json", json).unwrap();
/// ```
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = reconstruct_file(path)?;
    render::to_json(&doc, format)
}

/// Builder for reconstructing and rendering documents.
///
/// # Example
///
/// ```no_run
/// use unlayout::Unlayout;
///
/// let text = Unlayout::new()
///     .with_table_header_style("TableHeader")
///     .with_markup()
///     .parse("fragments.json")?
///     .to_text()?;
/// # Ok::<(), unlayout::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unlayout {
    options: ReconstructOptions,
    text_options: TextOptions,
}

impl Unlayout {
    /// Create a new Unlayout builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the reconstruction options.
    pub fn with_options(mut self, options: ReconstructOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the style id that marks table header fragments.
    pub fn with_table_header_style(mut self, style_id: impl Into<String>) -> Self {
        self.options = self.options.with_table_header_style(style_id);
        self
    }

    /// Set the style map.
    pub fn with_styles(mut self, styles: StyleMap) -> Self {
        self.options = self.options.with_styles(styles);
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Render emphasis markers in text output.
    pub fn with_markup(mut self) -> Self {
        self.text_options = self.text_options.with_markup(true);
        self
    }

    /// Print section depths in text output.
    pub fn with_depths(mut self) -> Self {
        self.text_options = self.text_options.with_depth(true);
        self
    }

    /// Load a fragment dump and rebuild it.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UnlayoutResult> {
        let document = reconstruct_file_with_options(path, &self.options)?;
        Ok(UnlayoutResult {
            document,
            text_options: self.text_options,
        })
    }

    /// Rebuild a document from any fragment source.
    pub fn reconstruct<S: FragmentSource + ?Sized>(self, source: &S) -> Result<UnlayoutResult> {
        let document = build_document(source, &self.options)?;
        Ok(UnlayoutResult {
            document,
            text_options: self.text_options,
        })
    }
}

/// Result of reconstructing a document.
#[derive(Debug, Clone)]
pub struct UnlayoutResult {
    /// The reconstructed document
    pub document: Document,
    /// Text options to use
    text_options: TextOptions,
}

impl UnlayoutResult {
    /// Convert to plain text.
    pub fn to_text(&self) -> Result<String> {
        render::to_text(&self.document, &self.text_options)
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Get plain text without markup.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Take the document.
    pub fn into_document(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages() -> Vec<Vec<Fragment>> {
        vec![vec![
            Fragment::new("Barbarian", 50.0, 700.0, 90.0, 18.0),
            Fragment::new("Rage.", 50.0, 680.0, 30.0, 10.0).with_style("F2"),
            Fragment::new(" In battle, you fight", 80.0, 680.0, 100.0, 10.0),
        ]]
    }

    #[test]
    fn test_reconstruct_default() {
        let doc = reconstruct(&pages()).unwrap();
        assert_eq!(doc.section_count(), 2);
        assert_eq!(doc.plain_text(), "Barbarian\n\nRage. In battle, you fight");
    }

    #[test]
    fn test_unlayout_builder() {
        let builder = Unlayout::new()
            .with_table_header_style("th")
            .with_markup()
            .sequential();

        assert_eq!(builder.options.table_header_style.as_deref(), Some("th"));
        assert!(builder.text_options.markup);
        assert!(!builder.options.parallel);
    }

    #[test]
    fn test_unlayout_markup_output() {
        let styles = StyleMap::new().with_style("F2", FormatKind::Bold);
        let result = Unlayout::new()
            .with_styles(styles)
            .with_markup()
            .reconstruct(&pages())
            .unwrap();

        assert_eq!(
            result.to_text().unwrap(),
            "Barbarian\n\n**Rage.** In battle, you fight"
        );
        assert_eq!(result.plain_text(), "Barbarian\n\nRage. In battle, you fight");
    }

    #[test]
    fn test_reconstruct_file_missing() {
        let result = reconstruct_file("/nonexistent/fragments.json");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
