//! Per-document extraction: chunk, invoke, parse, normalize, score, select

use crate::chunking::{strip_delimiters, TextChunk, TextChunker};
use crate::config::ExtractorConfig;
use crate::error::{BackendError, ExtractorError};
use crate::invoker::ModelInvoker;
use crate::parser::{parse_llm_response, ParseOutcome, ParseStage};
use crate::prompt::PromptBuilder;
use crate::types::{CancellationFlag, ChunkOutcome, ChunkStats, DocumentExtraction, DocumentOutcome};
use sifter_domain::traits::LlmProvider;
use sifter_domain::{completeness_score, Candidate, Document, Record, Schema};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Holder of the best candidate seen so far for one document
///
/// Replacement requires a strictly greater score, so on a tie the candidate
/// offered first (lowest chunk index) is kept. The initial best score is 0,
/// so an all-sentinel candidate is never selected.
#[derive(Debug, Default)]
pub struct BestCandidate {
    best: Option<(usize, usize, Candidate)>,
}

impl BestCandidate {
    /// Create an empty holder
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate; returns true if it became the new best
    pub fn offer(&mut self, chunk_index: usize, score: usize, candidate: Candidate) -> bool {
        let best_score = self.best.as_ref().map_or(0, |(_, s, _)| *s);
        if score > best_score {
            self.best = Some((chunk_index, score, candidate));
            true
        } else {
            false
        }
    }

    /// Score of the current best, 0 if none
    pub fn score(&self) -> usize {
        self.best.as_ref().map_or(0, |(_, s, _)| *s)
    }

    /// Turn the winner into a record for `document_id`
    pub fn into_record(self, document_id: &str) -> Option<Record> {
        self.best
            .map(|(chunk_index, score, candidate)| Record::new(document_id, chunk_index, score, candidate))
    }
}

/// Extracts one record per document from a text-generation backend
///
/// # Examples
///
/// ```
/// use sifter_domain::{presets, Document};
/// use sifter_extractor::{CancellationFlag, DocumentExtractor, DocumentOutcome, ExtractorConfig};
/// use sifter_llm::MockProvider;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let llm = MockProvider::new(r#"{"title": "Tandem cells", "year": "2023"}"#);
/// let extractor = DocumentExtractor::new(llm, presets::photovoltaic()?, ExtractorConfig::default())?;
///
/// let document = Document::new("paper.txt", "Tandem cells ... 2023 ...");
/// let extraction = extractor.extract(&document, &CancellationFlag::new()).await;
///
/// if let DocumentOutcome::Extracted(record) = extraction.outcome {
///     assert_eq!(record.candidate.get("year"), Some("2023"));
/// }
/// # Ok(())
/// # }
/// ```
pub struct DocumentExtractor<L> {
    invoker: ModelInvoker<L>,
    prompt: PromptBuilder,
    schema: Schema,
    config: ExtractorConfig,
}

impl<L> DocumentExtractor<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create a new DocumentExtractor
    ///
    /// # Errors
    /// Returns error if the configuration or prompt template is invalid
    pub fn new(llm_provider: L, schema: Schema, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::with_shared_provider(Arc::new(llm_provider), schema, config)
    }

    /// Create a DocumentExtractor around an already shared provider
    pub fn with_shared_provider(
        llm_provider: Arc<L>,
        schema: Schema,
        config: ExtractorConfig,
    ) -> Result<Self, ExtractorError> {
        config.validate()?;

        let prompt = match &config.prompt_template {
            Some(template) => PromptBuilder::new(&schema).with_template(template.as_str())?,
            None => PromptBuilder::new(&schema),
        };

        Ok(Self {
            invoker: ModelInvoker::new(llm_provider, config.extraction_timeout()),
            prompt,
            schema,
            config,
        })
    }

    /// Schema records are conformed to
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Model name reported by the provider
    pub fn model_name(&self) -> &str {
        self.invoker.model_name()
    }

    /// Extract the best record from one document
    ///
    /// Chunk failures are logged and skipped; they never abort the document.
    /// `cancel` is checked before every chunk.
    pub async fn extract(&self, document: &Document, cancel: &CancellationFlag) -> DocumentExtraction {
        let text = if self.config.strip_delimiters {
            Cow::Owned(strip_delimiters(&document.text))
        } else {
            Cow::Borrowed(document.text.as_str())
        };

        let chunks = TextChunker::new(self.config.max_chunk_size, self.config.chunk_overlap)
            .chunk_document(&document.id, &text);
        let mut stats = ChunkStats {
            chunks: chunks.len(),
            ..ChunkStats::default()
        };

        info!(
            "Extracting '{}': {} chars in {} chunks",
            document.id,
            text.chars().count(),
            chunks.len()
        );

        let mut best = BestCandidate::new();
        for chunk in &chunks {
            if cancel.is_cancelled() {
                info!("Abandoning '{}' before chunk {}", document.id, chunk.index);
                return DocumentExtraction {
                    document_id: document.id.clone(),
                    outcome: DocumentOutcome::Abandoned,
                    stats,
                };
            }

            let outcome = self.process_chunk(chunk).await;
            stats.record(&outcome);

            match outcome {
                ChunkOutcome::Candidate { candidate, score, .. } => {
                    if best.offer(chunk.index, score, candidate) {
                        debug!("'{}' chunk {} is the new best ({} fields)", document.id, chunk.index, score);
                    }
                }
                ChunkOutcome::BackendFailed(error) => {
                    warn!("Skipping '{}' chunk {}: {}", document.id, chunk.index, error);
                }
                ChunkOutcome::ParseFailed { raw, reason } => {
                    warn!(
                        "Skipping '{}' chunk {}: unparseable reply ({})\nRaw output:\n{}",
                        document.id, chunk.index, reason, raw
                    );
                }
            }
        }

        let outcome = match best.into_record(&document.id) {
            Some(record) => {
                info!(
                    "Selected chunk {} for '{}' ({}/{} fields)",
                    record.chunk_index,
                    document.id,
                    record.score,
                    self.schema.len()
                );
                DocumentOutcome::Extracted(record)
            }
            None => DocumentOutcome::NoExtraction,
        };

        DocumentExtraction {
            document_id: document.id.clone(),
            outcome,
            stats,
        }
    }

    /// Run one chunk through invoke → parse → normalize → score
    pub async fn process_chunk(&self, chunk: &TextChunk) -> ChunkOutcome {
        debug!(
            "Processing '{}' chunk {} ({} chars)",
            chunk.document_id,
            chunk.index,
            chunk.char_len()
        );

        let raw = match self.invoke_with_retry(chunk).await {
            Ok(raw) => raw,
            Err(error) => return ChunkOutcome::BackendFailed(error),
        };

        debug!("LLM response length: {} chars", raw.len());

        match parse_llm_response(&raw) {
            ParseOutcome::Parsed { fields, stage } => {
                let candidate = self.schema.normalize(&fields);
                let score = completeness_score(&candidate, self.schema.sentinel());
                ChunkOutcome::Candidate {
                    candidate,
                    score,
                    recovered: stage == ParseStage::Recovered,
                }
            }
            ParseOutcome::Failure { raw, reason } => ChunkOutcome::ParseFailed { raw, reason },
        }
    }

    /// Invoke the backend, retrying with exponential backoff per the config
    async fn invoke_with_retry(&self, chunk: &TextChunk) -> Result<String, BackendError> {
        let mut attempt = 0;
        loop {
            match self.invoker.invoke(&chunk.text, &self.prompt).await {
                Ok(raw) => return Ok(raw),
                Err(error) if attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay(attempt);
                    warn!(
                        "'{}' chunk {} attempt {} failed: {}; retrying in {:?}",
                        chunk.document_id, chunk.index, attempt, error, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sifter_domain::FieldDescriptor;
    use sifter_llm::MockProvider;

    fn schema() -> Schema {
        Schema::new(
            vec![
                FieldDescriptor::new("a", "A"),
                FieldDescriptor::new("b", "B"),
                FieldDescriptor::new("c", "C"),
            ],
            "N/A",
        )
        .unwrap()
    }

    fn candidate(schema: &Schema, value: serde_json::Value) -> Candidate {
        schema.normalize(value.as_object().unwrap())
    }

    #[test]
    fn test_best_candidate_prefers_strictly_higher() {
        let schema = schema();
        let mut best = BestCandidate::new();

        assert!(best.offer(0, 1, candidate(&schema, serde_json::json!({"a": "x"}))));
        assert!(best.offer(1, 2, candidate(&schema, serde_json::json!({"a": "y", "b": "y"}))));
        assert!(!best.offer(2, 2, candidate(&schema, serde_json::json!({"a": "z", "c": "z"}))));

        let record = best.into_record("doc").unwrap();
        assert_eq!(record.chunk_index, 1);
        assert_eq!(record.score, 2);
        assert_eq!(record.candidate.get("a"), Some("y"));
    }

    #[test]
    fn test_best_candidate_ignores_all_sentinel() {
        let schema = schema();
        let mut best = BestCandidate::new();

        assert!(!best.offer(0, 0, schema.empty_candidate()));
        assert_eq!(best.score(), 0);
        assert!(best.into_record("doc").is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = ExtractorConfig::default();
        config.chunk_overlap = config.max_chunk_size;

        let result = DocumentExtractor::new(MockProvider::default(), schema(), config);
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_invalid_template_rejected() {
        let config = ExtractorConfig {
            prompt_template: Some("no placeholder".to_string()),
            ..ExtractorConfig::default()
        };

        let result = DocumentExtractor::new(MockProvider::default(), schema(), config);
        assert!(matches!(result, Err(ExtractorError::Prompt(_))));
    }

    #[tokio::test]
    async fn test_process_chunk_scores_candidate() {
        let llm = MockProvider::new(r#"{"a": "1", "b": "N/A", "c": "3", "extra": "dropped"}"#);
        let extractor = DocumentExtractor::new(llm, schema(), ExtractorConfig::default()).unwrap();
        let chunk = TextChunker::new(100, 10).chunk("short").remove(0);

        match extractor.process_chunk(&chunk).await {
            ChunkOutcome::Candidate { candidate, score, recovered } => {
                assert_eq!(score, 2);
                assert!(!recovered);
                assert_eq!(candidate.len(), 3);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let llm = MockProvider::default()
            .then_error("busy")
            .then_reply(r#"{"a": "1"}"#);
        let config = ExtractorConfig {
            max_retries: 2,
            retry_backoff_ms: 1,
            ..ExtractorConfig::default()
        };
        let extractor = DocumentExtractor::new(llm, schema(), config).unwrap();

        let extraction = extractor
            .extract(&Document::new("doc", "text"), &CancellationFlag::new())
            .await;

        assert!(matches!(extraction.outcome, DocumentOutcome::Extracted(_)));
        assert_eq!(extraction.stats.backend_failures, 0);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let llm = MockProvider::default()
            .then_error("busy")
            .then_reply(r#"{"a": "1"}"#);
        let extractor = DocumentExtractor::new(llm.clone(), schema(), ExtractorConfig::default()).unwrap();

        let extraction = extractor
            .extract(&Document::new("doc", "text"), &CancellationFlag::new())
            .await;

        assert_eq!(extraction.outcome, DocumentOutcome::NoExtraction);
        assert_eq!(extraction.stats.backend_failures, 1);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_strip_delimiters_applies_before_prompting() {
        let llm = MockProvider::new(r#"{"a": "1"}"#);
        let config = ExtractorConfig {
            strip_delimiters: true,
            ..ExtractorConfig::default()
        };
        let extractor = DocumentExtractor::new(llm.clone(), schema(), config).unwrap();

        extractor
            .extract(&Document::new("doc", "| cell | value |"), &CancellationFlag::new())
            .await;

        let prompt = &llm.prompts()[0];
        assert!(prompt.contains(" cell  value "));
        assert!(!prompt.contains("| cell |"));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_abandoned() {
        let llm = MockProvider::new(r#"{"a": "1"}"#);
        let extractor = DocumentExtractor::new(llm.clone(), schema(), ExtractorConfig::default()).unwrap();
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let extraction = extractor.extract(&Document::new("doc", "text"), &cancel).await;

        assert_eq!(extraction.outcome, DocumentOutcome::Abandoned);
        assert_eq!(llm.call_count(), 0);
    }
}
