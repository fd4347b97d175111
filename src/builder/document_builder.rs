//! Page-by-page driver from fragments to a [`Document`].

use rayon::prelude::*;

use super::{DepthRegistry, FragmentSource, ReconstructOptions};
use crate::error::Result;
use crate::model::{Document, Fragment, Section};

/// Drives a fragment stream through section routing and depth bookkeeping.
///
/// Depths are collected while fragments are fed and resolved only in
/// [`finish`](Self::finish), once every height of the document is known.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    options: ReconstructOptions,
    registry: DepthRegistry,
    sections: Vec<Section>,
    pages: usize,
}

impl DocumentBuilder {
    /// Create a builder for one document.
    pub fn new(options: ReconstructOptions) -> Self {
        Self {
            options,
            registry: DepthRegistry::new(),
            sections: Vec::new(),
            pages: 0,
        }
    }

    /// Options in use.
    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Heights recorded so far.
    pub fn registry(&self) -> &DepthRegistry {
        &self.registry
    }

    /// Sections opened so far, unfinished.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Number of pages fed.
    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Feed one fragment.
    pub fn feed(&mut self, fragment: &Fragment) {
        let whitespace = fragment.is_only_whitespace();
        if !whitespace {
            self.registry.feed(fragment.height);
        }

        let accepted = self
            .sections
            .last()
            .is_some_and(|section| section.accepts(fragment, &self.options));

        if accepted {
            if let Some(section) = self.sections.last_mut() {
                section.feed(fragment, &self.options);
            }
        } else if whitespace {
            log::trace!("dropping whitespace outside any section");
        } else {
            log::debug!(
                "new section at height {} ({:?})",
                fragment.height,
                fragment.text
            );
            let mut section = Section::new(fragment.height);
            section.feed(fragment, &self.options);
            self.sections.push(section);
        }
    }

    /// Feed the fragments of one page, in arrival order.
    pub fn feed_page(&mut self, fragments: &[Fragment]) {
        if self.pages > 0 {
            if let Some(section) = self.sections.last_mut() {
                section.break_page();
            }
        }
        log::debug!("page {}: {} fragments", self.pages, fragments.len());
        for fragment in fragments {
            self.feed(fragment);
        }
        self.pages += 1;
    }

    /// Post-process every section, resolve depths and drop empty sections.
    pub fn finish(mut self) -> Document {
        let mut diagnostics = Vec::new();
        for section in &mut self.sections {
            diagnostics.extend(section.finish());
            let depth = self.registry.depth_of(section.heading_height());
            section.set_depth(depth);
        }
        self.sections.retain(|s| !s.is_empty());

        log::debug!(
            "document: {} sections, {} distinct heights, {} diagnostics",
            self.sections.len(),
            self.registry.len(),
            diagnostics.len()
        );

        Document {
            sections: self.sections,
            diagnostics,
        }
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(ReconstructOptions::default())
    }
}

/// Rebuild one document from a fragment source.
pub fn build_document<S>(source: &S, options: &ReconstructOptions) -> Result<Document>
where
    S: FragmentSource + ?Sized,
{
    let mut builder = DocumentBuilder::new(options.clone());
    for index in 0..source.page_count() {
        let fragments = source.page(index)?;
        builder.feed_page(&fragments);
    }
    Ok(builder.finish())
}

/// Rebuild independent documents, in parallel unless the options say
/// otherwise. Results keep the order of `sources`.
pub fn build_documents<S>(sources: &[S], options: &ReconstructOptions) -> Vec<Result<Document>>
where
    S: FragmentSource + Sync,
{
    if options.parallel {
        sources
            .par_iter()
            .map(|source| build_document(source, options))
            .collect()
    } else {
        sources
            .iter()
            .map(|source| build_document(source, options))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Part;

    fn frag(text: &str, y: f32, height: f32) -> Fragment {
        Fragment::new(text, 50.0, y, 60.0, height)
    }

    #[test]
    fn test_sections_follow_height_changes() {
        let mut builder = DocumentBuilder::default();
        builder.feed_page(&[
            frag("Barbarian", 700.0, 18.0),
            frag("A fierce warrior ", 680.0, 10.0),
            frag("of primitive background.", 670.0, 10.0),
            frag("Rage", 650.0, 14.0),
            frag("In battle, you fight", 640.0, 10.0),
        ]);
        let doc = builder.finish();

        let heights: Vec<f32> = doc.sections.iter().map(|s| s.heading_height()).collect();
        assert_eq!(heights, vec![18.0, 10.0, 14.0, 10.0]);
        assert_eq!(
            doc.sections[1].plain_text(),
            "A fierce warrior of primitive background."
        );
    }

    #[test]
    fn test_depth_is_monotone_in_height() {
        let mut builder = DocumentBuilder::default();
        // shortest height first, so early ranks shift as taller ones arrive
        builder.feed_page(&[frag("body", 700.0, 10.0), frag("Sub", 690.0, 14.0)]);
        builder.feed_page(&[frag("Title", 700.0, 18.0), frag("more body", 690.0, 10.0)]);
        let doc = builder.finish();

        let pairs: Vec<(f32, usize)> = doc
            .sections
            .iter()
            .map(|s| (s.heading_height(), s.depth().unwrap()))
            .collect();
        assert_eq!(pairs, vec![(10.0, 2), (14.0, 1), (18.0, 0), (10.0, 2)]);

        for a in &pairs {
            for b in &pairs {
                if a.0 > b.0 {
                    assert!(a.1 < b.1);
                }
            }
        }
    }

    #[test]
    fn test_whitespace_does_not_open_sections() {
        let mut builder = DocumentBuilder::default();
        builder.feed_page(&[
            frag("   ", 710.0, 30.0),
            frag("Heading", 700.0, 18.0),
            frag("  ", 690.0, 10.0),
            frag("Body", 680.0, 18.0),
        ]);

        assert_eq!(builder.sections().len(), 1);
        assert_eq!(builder.registry().heights(), &[18.0]);

        let doc = builder.finish();
        assert_eq!(doc.plain_text(), "Heading Body");
    }

    #[test]
    fn test_table_rows_continue_across_pages() {
        let options = ReconstructOptions::new().with_table_header_style("th");
        let mut builder = DocumentBuilder::new(options);
        builder.feed_page(&[
            Fragment::new("Level", 50.0, 700.0, 30.0, 9.0).with_style("th"),
            Fragment::new("Feature", 100.0, 700.0, 100.0, 9.0).with_style("th"),
            Fragment::new("1st", 50.0, 100.0, 15.0, 9.0),
            Fragment::new("Rage", 100.0, 100.0, 20.0, 9.0),
        ]);
        builder.feed_page(&[
            Fragment::new("2nd", 50.0, 750.0, 15.0, 9.0),
            Fragment::new("Reckless Attack", 100.0, 750.0, 60.0, 9.0),
        ]);
        let doc = builder.finish();

        assert_eq!(doc.section_count(), 1);
        let table = doc.sections[0].parts()[0].as_table().unwrap();
        assert_eq!(
            table.row_strings(),
            vec![vec!["1st", "Rage"], vec!["2nd", "Reckless Attack"]]
        );
    }

    #[test]
    fn test_empty_sections_are_dropped() {
        let mut builder = DocumentBuilder::default();
        builder.feed_page(&[frag("\u{200B}", 700.0, 20.0), frag("Body", 690.0, 10.0)]);
        let doc = builder.finish();

        assert_eq!(doc.section_count(), 1);
        assert!(matches!(doc.sections[0].parts()[0], Part::Text(_)));
    }

    #[test]
    fn test_build_documents_keeps_order() {
        let sources = vec![
            vec![vec![frag("One", 700.0, 10.0)]],
            vec![vec![frag("Two", 700.0, 10.0)]],
            vec![vec![frag("Three", 700.0, 10.0)]],
        ];
        let texts: Vec<String> = build_documents(&sources, &ReconstructOptions::default())
            .into_iter()
            .map(|doc| doc.unwrap().plain_text())
            .collect();

        assert_eq!(texts, vec!["One", "Two", "Three"]);

        let sequential = build_documents(&sources, &ReconstructOptions::new().sequential());
        assert_eq!(sequential.len(), 3);
    }
}
