//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
///
/// Everything here is fatal for a run. Chunk and document failures never
/// reach this type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Document source unavailable
    #[error("Source error: {0}")]
    Source(String),

    /// Output sink unavailable
    #[error("Output error: {0}")]
    Sink(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Backend could not be set up
    #[error("Backend error: {0}")]
    Backend(#[from] sifter_llm::LlmError),

    /// Extractor rejected its configuration
    #[error(transparent)]
    Extractor(#[from] sifter_extractor::ExtractorError),

    /// Schema violates its invariants
    #[error("Schema error: {0}")]
    Schema(#[from] sifter_domain::SchemaError),
}
