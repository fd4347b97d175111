//! Heading depth classification from glyph height.

use std::cmp::Ordering;

/// Distinct glyph heights seen in one document, kept sorted ascending.
///
/// Depth is derived from rank: the tallest height is depth 0 and every
/// shorter height is one level deeper per distinct taller height. Headings
/// arrive in arbitrary height order, so a depth is only final once every
/// height of the document has been fed. Callers must re-query rather than
/// cache ranks taken before that point.
#[derive(Debug, Clone, Default)]
pub struct DepthRegistry {
    heights: Vec<f32>,
}

impl DepthRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a height if it has not been seen yet.
    pub fn feed(&mut self, height: f32) {
        self.insert(height);
    }

    /// Ascending rank of a height (0 = smallest), inserting it if absent.
    pub fn rank_of(&mut self, height: f32) -> usize {
        self.insert(height)
    }

    /// Heading depth of a height (0 = tallest), inserting it if absent.
    pub fn depth_of(&mut self, height: f32) -> usize {
        let rank = self.insert(height);
        self.heights.len() - 1 - rank
    }

    /// Heading depth of an already recorded height.
    pub fn lookup_depth(&self, height: f32) -> Option<usize> {
        self.search(height)
            .ok()
            .map(|rank| self.heights.len() - 1 - rank)
    }

    /// Check if a height has been recorded.
    pub fn contains(&self, height: f32) -> bool {
        self.search(height).is_ok()
    }

    /// Number of distinct heights.
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Check if no height has been recorded.
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// All distinct heights, ascending.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    fn search(&self, height: f32) -> std::result::Result<usize, usize> {
        self.heights
            .binary_search_by(|probe| probe.partial_cmp(&height).unwrap_or(Ordering::Less))
    }

    fn insert(&mut self, height: f32) -> usize {
        match self.search(height) {
            Ok(rank) => rank,
            Err(rank) => {
                log::trace!("new height {} at rank {}", height, rank);
                self.heights.insert(rank, height);
                rank
            }
        }
    }
}
