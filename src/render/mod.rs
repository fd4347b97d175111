//! Rendering module for converting documents to output formats.
//!
//! Both renderers are debug and glue output over the document model;
//! downstream consumers are expected to walk [`Document`](crate::Document)
//! directly.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{to_text, TextOptions};
