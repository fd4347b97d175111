//! Fragment sources: the boundary to the page decoder.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Fragment;

/// Something that yields positioned fragments page by page.
///
/// Fragments of one page must come back in the decoder's emission order;
/// that order is the only ordering signal within a page column.
pub trait FragmentSource {
    /// Number of pages available.
    fn page_count(&self) -> usize;

    /// Fragments of one page (0-indexed), in arrival order.
    fn page(&self, index: usize) -> Result<Vec<Fragment>>;
}

/// A serialized fragment stream: `{ "pages": [[fragment, ...], ...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentDump {
    /// Fragments grouped by page
    pub pages: Vec<Vec<Fragment>>,
}

impl FragmentDump {
    /// Create a dump from already grouped fragments.
    pub fn new(pages: Vec<Vec<Fragment>>) -> Self {
        Self { pages }
    }

    /// Load a dump from a JSON file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("loading fragment dump {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dump from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let dump: Self = serde_json::from_reader(reader)?;
        dump.validate()?;
        Ok(dump)
    }

    /// Load a dump from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let dump: Self = serde_json::from_str(json)?;
        dump.validate()?;
        Ok(dump)
    }

    /// Total number of fragments across pages.
    pub fn fragment_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    fn validate(&self) -> Result<()> {
        for (page, fragments) in self.pages.iter().enumerate() {
            if let Some(bad) = fragments.iter().position(|f| !f.is_finite()) {
                return Err(Error::InvalidInput(format!(
                    "fragment {} on page {} has non-finite geometry",
                    bad, page
                )));
            }
        }
        Ok(())
    }
}

impl FragmentSource for FragmentDump {
    fn page_count(&self) -> usize {
        self.pages.page_count()
    }

    fn page(&self, index: usize) -> Result<Vec<Fragment>> {
        self.pages.page(index)
    }
}

impl FragmentSource for Vec<Vec<Fragment>> {
    fn page_count(&self) -> usize {
        self.len()
    }

    fn page(&self, index: usize) -> Result<Vec<Fragment>> {
        self.get(index)
            .cloned()
            .ok_or(Error::PageOutOfRange(index, self.len()))
    }
}
