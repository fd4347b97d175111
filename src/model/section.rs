//! Sections: runs of content sharing one heading height.

use serde::Serialize;

use super::{Diagnostic, FormatKind, Fragment, TableBlock, TextRun};
use crate::builder::ReconstructOptions;
use crate::error::{Error, Result};

/// One reconstructable piece of content.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Part {
    /// A paragraph (or a pending whitespace run while building)
    Text(TextRun),
    /// A table
    Table(TableBlock),
}

impl Part {
    /// Check if this part is a run holding only whitespace.
    pub fn is_whitespace_run(&self) -> bool {
        matches!(self, Part::Text(run) if run.is_only_whitespace())
    }

    /// Get the text run, if this part is one.
    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Part::Text(run) => Some(run),
            Part::Table(_) => None,
        }
    }

    /// Get the table, if this part is one.
    pub fn as_table(&self) -> Option<&TableBlock> {
        match self {
            Part::Table(table) => Some(table),
            Part::Text(_) => None,
        }
    }
}

/// Content opened by a fragment of a given height.
///
/// Fragments are routed as they arrive: table header fragments and the
/// body fragments that follow them go to a [`TableBlock`], everything else
/// goes to paragraph runs. Whitespace-only fragments are kept as their own
/// runs until the next fragment decides whether they were layout noise
/// (one run) or a paragraph break (two runs).
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    depth: Option<usize>,
    heading_height: f32,
    parts: Vec<Part>,
}

impl Section {
    /// Create an empty section keyed by the height that opened it.
    pub fn new(heading_height: f32) -> Self {
        Self {
            depth: None,
            heading_height,
            parts: Vec::new(),
        }
    }

    /// Raw glyph height that opened this section.
    pub fn heading_height(&self) -> f32 {
        self.heading_height
    }

    /// Resolved heading depth (0 = tallest heading).
    ///
    /// Fails until the document's height registry has been resolved.
    pub fn depth(&self) -> Result<usize> {
        self.depth.ok_or(Error::DepthUnresolved(self.heading_height))
    }

    /// Record the resolved depth.
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = Some(depth);
    }

    /// Parts in reading order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Consume the section, returning its parts.
    pub fn into_parts(self) -> Vec<Part> {
        self.parts
    }

    /// Check if the section has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Check if the fragment continues this section rather than opening a
    /// new one.
    pub fn accepts(&self, fragment: &Fragment, options: &ReconstructOptions) -> bool {
        fragment.is_only_whitespace()
            || options.is_table_header(fragment)
            || self.continues_table(fragment, options)
            || options
                .thresholds
                .same_height(fragment.height, self.heading_height)
    }

    /// Route one fragment into the part list.
    pub fn feed(&mut self, fragment: &Fragment, options: &ReconstructOptions) {
        if options.is_table_header(fragment) {
            self.feed_table_header(fragment, options);
            return;
        }
        if self.continues_table(fragment, options) {
            if let Some(Part::Table(table)) = self.parts.last_mut() {
                table.feed(fragment, options);
            }
            return;
        }
        self.feed_text(fragment, options);
    }

    /// Forget row cursors of a trailing table at a page boundary.
    pub fn break_page(&mut self) {
        if let Some(Part::Table(table)) = self.parts.last_mut() {
            table.break_page();
        }
    }

    /// Trim runs, finish tables and drop parts left empty.
    pub fn finish(&mut self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for part in &mut self.parts {
            match part {
                Part::Text(run) => run.trim_end(),
                Part::Table(table) => diagnostics.extend(table.finish()),
            }
        }

        self.parts.retain(|part| match part {
            Part::Text(run) => !run.is_only_whitespace(),
            Part::Table(table) => !table.is_empty(),
        });
        diagnostics
    }

    /// Plain text of the section: paragraphs separated by blank lines,
    /// tables as tab-separated rows.
    pub fn plain_text(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                Part::Text(run) => run.text().to_string(),
                Part::Table(table) => table
                    .header_strings()
                    .into_iter()
                    .chain(table.row_strings())
                    .map(|row| row.join("\t"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Whitespace carries no height signal, so it never ends a table.
    fn continues_table(&self, fragment: &Fragment, options: &ReconstructOptions) -> bool {
        match self.parts.last() {
            Some(Part::Table(table)) => {
                fragment.is_only_whitespace()
                    || options
                        .thresholds
                        .continues_table(fragment.height, table.last_height())
            }
            _ => false,
        }
    }

    fn feed_table_header(&mut self, fragment: &Fragment, options: &ReconstructOptions) {
        match self.parts.last_mut() {
            Some(Part::Table(table)) if table.is_awaiting_headers() => {
                table.feed(fragment, options);
            }
            _ => {
                log::debug!("section: new table at y={}", fragment.y);
                let mut table = TableBlock::new();
                table.feed(fragment, options);
                self.parts.push(Part::Table(table));
            }
        }
    }

    fn feed_text(&mut self, fragment: &Fragment, options: &ReconstructOptions) {
        let kind = options.format_of(fragment);

        if options.is_bullet(fragment) || fragment.is_only_whitespace() {
            self.push_run(fragment, kind);
            return;
        }

        let after_whitespace = match self.parts.last_mut() {
            Some(Part::Text(run)) if !run.is_only_whitespace() => {
                run.append(fragment, kind);
                return;
            }
            Some(Part::Text(_)) => true,
            Some(Part::Table(_)) | None => false,
        };
        if !after_whitespace {
            self.push_run(fragment, kind);
            return;
        }

        // a pending whitespace run is noise, two in a row break the paragraph
        self.parts.pop();
        if self.parts.last().is_some_and(Part::is_whitespace_run) {
            log::trace!("section: paragraph break before {:?}", fragment.text);
            self.parts.pop();
            self.push_run(fragment, kind);
        } else if let Some(Part::Text(run)) = self.parts.last_mut() {
            run.ensure_trailing_space();
            run.append(fragment, kind);
        } else {
            self.push_run(fragment, kind);
        }
    }

    fn push_run(&mut self, fragment: &Fragment, kind: FormatKind) {
        self.parts
            .push(Part::Text(TextRun::from_fragment(fragment, kind)));
    }
}
