//! Outcome and summary types for extraction runs

use crate::error::BackendError;
use sifter_domain::{Candidate, Record, ResultTable};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What one chunk contributed to its document
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkOutcome {
    /// The reply parsed and was conformed to the schema
    Candidate {
        /// Schema-conformant values
        candidate: Candidate,
        /// Completeness score of `candidate`
        score: usize,
        /// True if the recovery parser was needed
        recovered: bool,
    },

    /// The backend call failed; the chunk is skipped
    BackendFailed(BackendError),

    /// The reply could not be parsed; the chunk is skipped
    ParseFailed {
        /// The reply as received
        raw: String,
        /// Why parsing failed
        reason: String,
    },
}

/// Final outcome for one document
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// The best candidate was selected
    Extracted(Record),

    /// No chunk produced a usable candidate
    NoExtraction,

    /// Cancelled at a chunk boundary; partial work discarded
    Abandoned,
}

/// Per-document chunk statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkStats {
    /// Chunks the document was split into
    pub chunks: usize,

    /// Chunks whose reply became a candidate
    pub candidates: usize,

    /// Candidates that needed the recovery parser
    pub recovered: usize,

    /// Chunks skipped because the backend failed
    pub backend_failures: usize,

    /// Chunks skipped because the reply did not parse
    pub parse_failures: usize,
}

impl ChunkStats {
    /// Account for one chunk outcome
    pub fn record(&mut self, outcome: &ChunkOutcome) {
        match outcome {
            ChunkOutcome::Candidate { recovered, .. } => {
                self.candidates += 1;
                if *recovered {
                    self.recovered += 1;
                }
            }
            ChunkOutcome::BackendFailed(_) => self.backend_failures += 1,
            ChunkOutcome::ParseFailed { .. } => self.parse_failures += 1,
        }
    }

    /// Add another document's statistics
    pub fn merge(&mut self, other: &ChunkStats) {
        self.chunks += other.chunks;
        self.candidates += other.candidates;
        self.recovered += other.recovered;
        self.backend_failures += other.backend_failures;
        self.parse_failures += other.parse_failures;
    }
}

/// Outcome plus statistics for one document
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentExtraction {
    /// Identifier of the document
    pub document_id: String,

    /// Selected record, omission, or abandonment
    pub outcome: DocumentOutcome,

    /// Chunk-level statistics
    pub stats: ChunkStats,
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents handed to the run
    pub documents_total: usize,

    /// Documents that produced a record
    pub documents_processed: usize,

    /// Documents omitted because no chunk produced a candidate
    pub omitted: Vec<String>,

    /// Documents abandoned by cancellation
    pub abandoned: Vec<String>,

    /// Chunk statistics across all documents
    pub chunks: ChunkStats,

    /// Model that served the run
    pub model_name: String,

    /// Wall-clock duration in milliseconds
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            "Extraction Summary".to_string(),
            "==================".to_string(),
            format!("Model: {}", self.model_name),
            format!("Documents: {}", self.documents_total),
            format!("  Processed: {}", self.documents_processed),
            format!("  Omitted: {}", self.omitted.len()),
        ];
        if !self.abandoned.is_empty() {
            lines.push(format!("  Abandoned: {}", self.abandoned.len()));
        }
        lines.push(format!("Chunks: {}", self.chunks.chunks));
        lines.push(format!(
            "  Candidates: {} ({} recovered)",
            self.chunks.candidates, self.chunks.recovered
        ));
        lines.push(format!("  Backend failures: {}", self.chunks.backend_failures));
        lines.push(format!("  Parse failures: {}", self.chunks.parse_failures));
        lines.push(format!("Elapsed: {} ms", self.elapsed_ms));

        for id in &self.omitted {
            lines.push(format!("Omitted: {}", id));
        }

        lines.join("\n")
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Result table plus run summary
#[derive(Debug, Clone)]
pub struct RunReport {
    /// One row per processed document, in input order
    pub table: ResultTable,

    /// Counts and omissions
    pub summary: RunSummary,
}

/// Shared flag requesting that a run stop at the next chunk boundary
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create a flag that is not raised
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the flag has been raised
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
