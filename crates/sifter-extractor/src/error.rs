//! Error types for the Extractor

use sifter_domain::SchemaError;
use std::time::Duration;
use thiserror::Error;

/// Errors that prevent an extractor from being built or configured
///
/// Nothing in here is raised per chunk or per document; those outcomes are
/// reported as values (see `ChunkOutcome` and `DocumentOutcome`).
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema violates its invariants
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Prompt template is unusable
    #[error("Prompt template error: {0}")]
    Prompt(String),
}

/// Failure of a single backend call; scoped to one chunk
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The call did not finish within the configured deadline
    #[error("Backend call timed out after {0:?}")]
    Timeout(Duration),

    /// The backend reported an error or could not be reached
    #[error("Backend error: {0}")]
    Provider(String),

    /// The blocking task running the call was lost
    #[error("Backend task failed: {0}")]
    Join(String),
}
