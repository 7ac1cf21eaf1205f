//! Sifter Extractor
//!
//! Turns a set of plain-text documents into one structured record per
//! document using a text-generation backend.
//!
//! # Overview
//!
//! Each document is cut into overlapping chunks. Every chunk is sent to the
//! backend with a prompt describing the output contract, the reply is parsed
//! (leniently if needed) and conformed to the schema, and the most complete
//! candidate wins. Documents are then collected into a [`ResultTable`] in
//! input order.
//!
//! # Architecture
//!
//! ```text
//! Document → TextChunker → ModelInvoker → parse → Schema::normalize → score
//!                                                                      ↓
//!                         ResultTable ← Aggregator ← DocumentExtractor (best)
//! ```
//!
//! Failures are contained: a bad chunk is skipped, a document with no usable
//! chunk is omitted, and the run always completes with whatever it has.
//!
//! # Example Usage
//!
//! ```no_run
//! use sifter_domain::{presets, Document};
//! use sifter_extractor::{Aggregator, CancellationFlag, DocumentExtractor, ExtractorConfig};
//! use sifter_llm::MockProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = MockProvider::new(r#"{"title": "Perovskite tandem", "year": "2023"}"#);
//! let extractor = DocumentExtractor::new(llm, presets::photovoltaic()?, ExtractorConfig::default())?;
//!
//! let documents = vec![Document::new("a.txt", "..."), Document::new("b.txt", "...")];
//! let report = Aggregator::new(extractor, CancellationFlag::new()).run(documents).await;
//!
//! println!("{}", report.summary);
//! println!("Rows: {}", report.table.len());
//! # Ok(())
//! # }
//! ```
//!
//! [`ResultTable`]: sifter_domain::ResultTable

#![warn(missing_docs)]

mod aggregator;
mod chunking;
mod config;
mod error;
mod extractor;
mod invoker;
mod parser;
mod prompt;
mod types;


pub use aggregator::Aggregator;
pub use chunking::{split_text, strip_delimiters, TextChunk, TextChunker};
pub use config::ExtractorConfig;
pub use error::{BackendError, ExtractorError};
pub use extractor::{BestCandidate, DocumentExtractor};
pub use invoker::ModelInvoker;
pub use parser::{parse_llm_response, ParseOutcome, ParseStage};
pub use prompt::{PromptBuilder, DEFAULT_TEMPLATE, INSTRUCTIONS_PLACEHOLDER, TEXT_PLACEHOLDER};
pub use types::{
    CancellationFlag, ChunkOutcome, ChunkStats, DocumentExtraction, DocumentOutcome, RunReport,
    RunSummary,
};
