//! Plain text rendering for reconstructed documents.

use std::fmt::Write;

use crate::error::{Error, Result};
use crate::model::{Document, Part, Section, TableBlock};

/// Options for plain text output.
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    /// Wrap emphasized spans in `*`/`**`/`***` markers
    pub markup: bool,

    /// Print a `[depth N]` line before each section
    pub show_depth: bool,
}

impl TextOptions {
    /// Create options with plain output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable emphasis markers.
    pub fn with_markup(mut self, markup: bool) -> Self {
        self.markup = markup;
        self
    }

    /// Enable section depth lines.
    pub fn with_depth(mut self, show: bool) -> Self {
        self.show_depth = show;
        self
    }
}

/// Convert a document to plain text.
///
/// Paragraphs are separated by blank lines; table rows are printed one per
/// line with tab-separated cells and a dashed rule under the header.
pub fn to_text(doc: &Document, options: &TextOptions) -> Result<String> {
    let mut output = String::new();
    for section in &doc.sections {
        write_section(&mut output, section, options)?;
    }
    Ok(output.trim().to_string())
}

fn write_section(out: &mut String, section: &Section, options: &TextOptions) -> Result<()> {
    if options.show_depth {
        writeln!(out, "[depth {}]", section.depth()?).map_err(fmt_error)?;
    }
    for part in section.parts() {
        let written = match part {
            Part::Text(run) if options.markup => writeln!(out, "{}", run),
            Part::Text(run) => writeln!(out, "{}", run.text()),
            Part::Table(table) => write_table(out, table),
        };
        written.map_err(fmt_error)?;
        out.push('\n');
    }
    Ok(())
}

fn write_table(out: &mut String, table: &TableBlock) -> std::fmt::Result {
    let headers = table.header_strings();
    for row in &headers {
        writeln!(out, "{}", row.join("\t"))?;
    }
    if !headers.is_empty() {
        writeln!(out, "---")?;
    }
    for row in table.row_strings() {
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}

fn fmt_error(e: std::fmt::Error) -> Error {
    Error::Render(format!("text formatting error: {}", e))
}
