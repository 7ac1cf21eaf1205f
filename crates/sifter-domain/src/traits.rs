//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// Trait for text-generation backends
///
/// Implemented by the infrastructure layer (sifter-llm). A call is a single
/// blocking request/response; retry and timeout policy belong to the caller.
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for `prompt`
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;

    /// Name of the model behind this provider, for logs and summaries
    fn model_name(&self) -> &str {
        "llm"
    }
}
