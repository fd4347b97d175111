//! Reconstruction driver: depth bookkeeping, options and fragment sources.

mod depth;
mod document_builder;
mod options;
mod source;

pub use depth::DepthRegistry;
pub use document_builder::{build_document, build_documents, DocumentBuilder};
pub use options::{ReconstructOptions, Thresholds};
pub use source::{FragmentDump, FragmentSource};
