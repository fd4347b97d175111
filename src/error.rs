//! Error types for unlayout library.

use std::io;
use thiserror::Error;

/// Result type alias for unlayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading fragments or using the model.
///
/// Layout ambiguity is never reported here; it degrades to a best-effort
/// structure and a [`Diagnostic`](crate::model::Diagnostic).
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed fragment dump or options file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Page number is out of range.
    #[error("Page {0} is out of range (source has {1} pages)")]
    PageOutOfRange(usize, usize),

    /// The fragment source produced something the builder cannot use.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A section depth was requested before the height registry was resolved.
    #[error("Depth for heading height {0} has not been resolved")]
    DepthUnresolved(f32),

    /// Error during rendering (text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}
