//! Sifter Domain Layer
//!
//! Core types shared by every other Sifter crate: the extraction schema,
//! the per-chunk candidates it produces, the per-document records selected
//! from them, and the result table they are aggregated into.
//!
//! ## Key Concepts
//!
//! - **Schema**: Ordered field descriptors plus the "not extracted" sentinel
//! - **Candidate**: A schema-conformant field mapping derived from one chunk
//! - **Completeness score**: Count of non-sentinel fields in a candidate
//! - **Record**: The best candidate selected for a document
//! - **ResultTable**: One row per record, columns in schema display order
//!
//! ## Architecture
//!
//! Infrastructure (model backends, file discovery, output formats) lives in
//! other crates. The only boundary this crate defines is [`traits::LlmProvider`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod document;
pub mod presets;
pub mod schema;
pub mod score;
pub mod table;
pub mod traits;

// Re-exports for convenience
pub use candidate::{Candidate, Record};
pub use document::Document;
pub use schema::{FieldDescriptor, Schema, SchemaError, DEFAULT_SENTINEL};
pub use score::completeness_score;
pub use table::{ResultTable, TableRow};
