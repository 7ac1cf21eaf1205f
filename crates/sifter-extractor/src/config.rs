//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Maximum chunk size (characters)
    pub max_chunk_size: usize,

    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,

    /// Maximum time for a single backend call (seconds)
    pub extraction_timeout_secs: u64,

    /// Extra attempts per chunk after a backend failure
    pub max_retries: u32,

    /// Delay before the first retry (milliseconds); doubles on each retry
    pub retry_backoff_ms: u64,

    /// Documents processed concurrently
    pub document_concurrency: usize,

    /// Remove markup delimiters from document text before chunking
    pub strip_delimiters: bool,

    /// Prompt template override; must contain `{text}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
}

impl ExtractorConfig {
    /// Get the extraction timeout as a Duration
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_secs(self.extraction_timeout_secs)
    }

    /// Backoff before retry number `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(factor))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.max_chunk_size == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_size must be greater than 0".to_string(),
            ));
        }
        if self.chunk_overlap >= self.max_chunk_size {
            return Err(ExtractorError::Config(format!(
                "chunk_overlap ({}) must be smaller than max_chunk_size ({})",
                self.chunk_overlap, self.max_chunk_size
            )));
        }
        if self.extraction_timeout_secs == 0 {
            return Err(ExtractorError::Config(
                "extraction_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.document_concurrency == 0 {
            return Err(ExtractorError::Config(
                "document_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractorConfig {
    /// Default configuration: 2000-character chunks with 200 characters of overlap
    fn default() -> Self {
        Self {
            max_chunk_size: 2_000,
            chunk_overlap: 200,
            extraction_timeout_secs: 120,
            max_retries: 0,
            retry_backoff_ms: 1_000,
            document_concurrency: 1,
            strip_delimiters: false,
            prompt_template: None,
        }
    }
}

impl ExtractorConfig {
    /// Compact preset: 1000-character chunks for small-context models
    pub fn compact() -> Self {
        Self {
            max_chunk_size: 1_000,
            chunk_overlap: 100,
            ..Self::default()
        }
    }

    /// Fine-grained preset: 500-character chunks, shorter timeout
    pub fn fine_grained() -> Self {
        Self {
            max_chunk_size: 500,
            chunk_overlap: 50,
            extraction_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ExtractorError> {
        toml::from_str(toml_str)
            .map_err(|e| ExtractorError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ExtractorError> {
        toml::to_string_pretty(self)
            .map_err(|e| ExtractorError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}
