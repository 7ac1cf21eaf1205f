//! Backend invocation for a single chunk

use crate::error::BackendError;
use crate::prompt::PromptBuilder;
use sifter_domain::traits::LlmProvider;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Sends one chunk to the backend and returns the raw reply
///
/// One call per `invoke`, no retries. The provider is synchronous, so the
/// call runs on tokio's blocking pool under a deadline. A call that misses
/// the deadline is reported as [`BackendError::Timeout`]; its thread is left
/// to finish in the background.
pub struct ModelInvoker<L> {
    provider: Arc<L>,
    deadline: Duration,
}

impl<L> ModelInvoker<L>
where
    L: LlmProvider + Send + Sync + 'static,
    L::Error: std::fmt::Display,
{
    /// Create an invoker with a per-call deadline
    pub fn new(provider: Arc<L>, deadline: Duration) -> Self {
        Self { provider, deadline }
    }

    /// Model name reported by the provider
    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Render the prompt for `chunk_text` and call the backend once
    pub async fn invoke(
        &self,
        chunk_text: &str,
        instructions: &PromptBuilder,
    ) -> Result<String, BackendError> {
        let prompt = instructions.build(chunk_text);
        let llm = Arc::clone(&self.provider);

        // Call in a blocking context since LlmProvider is not async
        let call = tokio::task::spawn_blocking(move || {
            llm.generate(&prompt)
                .map_err(|e| BackendError::Provider(e.to_string()))
        });

        match timeout(self.deadline, call).await {
            Err(_) => Err(BackendError::Timeout(self.deadline)),
            Ok(Err(join_error)) => Err(BackendError::Join(join_error.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sifter_domain::{FieldDescriptor, Schema};
    use sifter_llm::MockProvider;

    struct SlowProvider;

    impl LlmProvider for SlowProvider {
        type Error = String;

        fn generate(&self, _prompt: &str) -> Result<String, Self::Error> {
            std::thread::sleep(Duration::from_millis(500));
            Ok("{}".to_string())
        }
    }

    fn prompt() -> PromptBuilder {
        let schema = Schema::new(vec![FieldDescriptor::new("doi", "DOI")], "N/A").unwrap();
        PromptBuilder::new(&schema)
    }

    #[tokio::test]
    async fn test_invoke_returns_raw_reply() {
        let provider = Arc::new(MockProvider::new("{\"doi\": \"x\"}"));
        let invoker = ModelInvoker::new(Arc::clone(&provider), Duration::from_secs(5));

        let reply = invoker.invoke("chunk body", &prompt()).await.unwrap();
        assert_eq!(reply, "{\"doi\": \"x\"}");

        let prompts = provider.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("chunk body"));
        assert!(prompts[0].contains("\"doi\""));
    }

    #[tokio::test]
    async fn test_provider_error_becomes_backend_error() {
        let provider = Arc::new(MockProvider::default().then_error("connection refused"));
        let invoker = ModelInvoker::new(provider, Duration::from_secs(5));

        let result = invoker.invoke("chunk", &prompt()).await;
        assert!(matches!(result, Err(BackendError::Provider(msg)) if msg.contains("connection refused")));
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let invoker = ModelInvoker::new(Arc::new(SlowProvider), Duration::from_millis(50));

        let result = invoker.invoke("chunk", &prompt()).await;
        assert_eq!(result, Err(BackendError::Timeout(Duration::from_millis(50))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Backend call timed out after 50ms"
        );
    }
}
