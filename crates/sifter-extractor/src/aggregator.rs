//! Run a document set through the extractor and assemble the result table

use crate::extractor::DocumentExtractor;
use crate::types::{CancellationFlag, DocumentOutcome, RunReport, RunSummary};
use futures::stream::{self, StreamExt};
use sifter_domain::traits::LlmProvider;
use sifter_domain::{Document, ResultTable};
use std::time::Instant;
use tracing::{info, warn};

/// Drives a [`DocumentExtractor`] over many documents
///
/// Up to `document_concurrency` documents are in flight at once, but results
/// are collected in input order, so the table and the omission list never
/// depend on completion order.
pub struct Aggregator<L> {
    extractor: DocumentExtractor<L>,
    cancel: CancellationFlag,
}

impl<L> Aggregator<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an aggregator that stops when `cancel` is raised
    pub fn new(extractor: DocumentExtractor<L>, cancel: CancellationFlag) -> Self {
        Self { extractor, cancel }
    }

    /// Extract every document and build the result table
    ///
    /// Never fails as a whole: documents without a usable candidate are
    /// listed as omitted, documents cut short by cancellation as abandoned.
    pub async fn run(&self, documents: Vec<Document>) -> RunReport {
        let started = Instant::now();
        let concurrency = self.extractor.config().document_concurrency.max(1);
        let extractor = &self.extractor;
        let cancel = &self.cancel;

        let mut summary = RunSummary {
            documents_total: documents.len(),
            model_name: extractor.model_name().to_string(),
            ..RunSummary::default()
        };

        info!(
            "Starting extraction of {} documents with {} (concurrency {})",
            documents.len(),
            summary.model_name,
            concurrency
        );

        let extractions: Vec<_> = stream::iter(documents)
            .map(|document| async move { extractor.extract(&document, cancel).await })
            .buffered(concurrency)
            .collect()
            .await;

        let mut table = ResultTable::new(extractor.schema());
        for extraction in extractions {
            summary.chunks.merge(&extraction.stats);
            match extraction.outcome {
                DocumentOutcome::Extracted(record) => {
                    table.push(&record);
                    summary.documents_processed += 1;
                }
                DocumentOutcome::NoExtraction => {
                    warn!("No usable extraction for '{}'; omitting it", extraction.document_id);
                    summary.omitted.push(extraction.document_id);
                }
                DocumentOutcome::Abandoned => {
                    summary.abandoned.push(extraction.document_id);
                }
            }
        }

        summary.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if self.cancel.is_cancelled() {
            warn!(
                "Run cancelled: {} documents abandoned, {} records kept",
                summary.abandoned.len(),
                table.len()
            );
        }
        info!(
            "Extraction finished: {}/{} documents processed, {} omitted in {} ms",
            summary.documents_processed,
            summary.documents_total,
            summary.omitted.len(),
            summary.elapsed_ms
        );

        RunReport { table, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExtractorConfig;
    use sifter_domain::{FieldDescriptor, Schema};
    use sifter_llm::MockProvider;

    fn schema() -> Schema {
        Schema::new(
            vec![FieldDescriptor::new("a", "Alpha"), FieldDescriptor::new("b", "Beta")],
            "N/A",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_input_gives_empty_report() {
        let extractor = DocumentExtractor::new(MockProvider::default(), schema(), ExtractorConfig::default()).unwrap();
        let report = Aggregator::new(extractor, CancellationFlag::new()).run(Vec::new()).await;

        assert!(report.table.is_empty());
        assert_eq!(report.table.columns(), ["Alpha", "Beta"]);
        assert_eq!(report.summary.documents_total, 0);
        assert_eq!(report.summary.model_name, "mock");
    }

    #[tokio::test]
    async fn test_omitted_documents_are_listed_in_order() {
        let mut llm = MockProvider::new(r#"{"a": "x"}"#);
        llm.add_error("doc two");
        llm.add_error("doc four");
        let extractor = DocumentExtractor::new(llm, schema(), ExtractorConfig::default()).unwrap();

        let documents = vec![
            Document::new("1", "doc one"),
            Document::new("2", "doc two"),
            Document::new("3", "doc three"),
            Document::new("4", "doc four"),
        ];
        let report = Aggregator::new(extractor, CancellationFlag::new()).run(documents).await;

        assert_eq!(report.summary.documents_processed, 2);
        assert_eq!(report.summary.omitted, vec!["2".to_string(), "4".to_string()]);
        let ids: Vec<_> = report.table.rows().iter().map(|r| r.document_id.as_str()).collect();
        assert_eq!(ids, ["1", "3"]);
    }
}
