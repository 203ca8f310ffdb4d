//! Block — structured settings records logged across consecutive lines.
//!
//! A block starts with a header line (`... settings:`) followed by indented
//! `label: value` lines. [`BlockExtractor`] turns the most recent block into a
//! [`StructuredRecord`].

pub mod extractor;
pub mod model;

pub use extractor::BlockExtractor;
pub use model::{FieldKind, FieldSpec, FieldValue, Ratio, StructuredRecord};
