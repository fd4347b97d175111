//! Document model types for reconstructed content.
//!
//! Fragments go in, sections come out. A [`Section`] holds [`Part`]s, each
//! a [`TextRun`] paragraph or a [`TableBlock`]. The model is format-agnostic;
//! layout geometry is kept on runs only for table column matching and is not
//! serialized.

mod document;
mod fragment;
mod section;
mod style;
mod table;
mod text_run;

pub use document::{Diagnostic, Document};
pub use fragment::Fragment;
pub use section::{Part, Section};
pub use style::{FormatKind, FormatSpan, StyleMap};
pub use table::TableBlock;
pub use text_run::{normalize_text, TextRun};
