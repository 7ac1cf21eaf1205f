//! Sifter LLM Provider Layer
//!
//! Pluggable text-generation backends behind the `LlmProvider` trait.
//!
//! # Architecture
//!
//! This crate provides implementations of the `LlmProvider` trait from `sifter-domain`.
//! The extraction pipeline only ever sees that trait, so backends are interchangeable.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic, scriptable mock for testing
//! - `OllamaProvider`: Local Ollama API integration
//!
//! # Examples
//!
//! ```
//! use sifter_llm::MockProvider;
//! use sifter_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new("Hello from LLM!");
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, "Hello from LLM!");
//! ```

#![warn(missing_docs)]

pub mod ollama;

use sifter_domain::traits::LlmProvider as LlmProviderTrait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

pub use ollama::{OllamaProvider, OllamaSettings};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Request exceeded the client timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error(String),
}

impl MockReply {
    fn into_result(self) -> Result<String, LlmError> {
        match self {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(message) => Err(LlmError::Other(message)),
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    rules: Vec<(String, MockReply)>,
    script: VecDeque<MockReply>,
    prompts: Vec<String>,
}

/// Mock LLM provider for deterministic testing
///
/// This provider returns pre-configured responses without making any network calls.
/// Replies are chosen in this order:
///
/// 1. The first rule whose fragment appears in the prompt
/// 2. The next entry of the scripted sequence
/// 3. The default response
///
/// # Examples
///
/// ```
/// use sifter_llm::MockProvider;
/// use sifter_domain::traits::LlmProvider;
///
/// // Simple fixed response
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.generate("any prompt").unwrap(), "Fixed response");
///
/// // Responses keyed by prompt content
/// let mut provider = MockProvider::default();
/// provider.add_response("chunk one", "response1");
/// provider.add_response("chunk two", "response2");
/// assert_eq!(provider.generate("... chunk one ...").unwrap(), "response1");
/// assert_eq!(provider.generate("... chunk two ...").unwrap(), "response2");
///
/// // One reply per call, in order
/// let provider = MockProvider::default().with_script(["first", "second"]);
/// assert_eq!(provider.generate("x").unwrap(), "first");
/// assert_eq!(provider.generate("x").unwrap(), "second");
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    state: Arc<Mutex<MockState>>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue replies returned one per call, in order
    pub fn with_script<I, S>(self, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lock()
            .script
            .extend(replies.into_iter().map(|r| MockReply::Text(r.into())));
        self
    }

    /// Queue a failing call at the end of the script
    pub fn then_error(self, message: impl Into<String>) -> Self {
        self.lock().script.push_back(MockReply::Error(message.into()));
        self
    }

    /// Queue a successful reply at the end of the script
    pub fn then_reply(self, reply: impl Into<String>) -> Self {
        self.lock().script.push_back(MockReply::Text(reply.into()));
        self
    }

    /// Reply with `response` whenever the prompt contains `fragment`
    pub fn add_response(&mut self, fragment: impl Into<String>, response: impl Into<String>) {
        self.lock()
            .rules
            .push((fragment.into(), MockReply::Text(response.into())));
    }

    /// Fail whenever the prompt contains `fragment`
    pub fn add_error(&mut self, fragment: impl Into<String>) {
        self.lock()
            .rules
            .push((fragment.into(), MockReply::Error("Mock error".to_string())));
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.lock().prompts.len()
    }

    /// Every prompt received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.lock().prompts.clone()
    }

    /// Forget recorded prompts
    pub fn reset_call_count(&self) {
        self.lock().prompts.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not wedge the other callers
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        let mut state = self.lock();
        state.prompts.push(prompt.to_string());

        let ruled = state
            .rules
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        let reply = ruled
            .or_else(|| state.script.pop_front())
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()));

        reply.into_result()
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let result = provider.generate("any prompt");
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "Test response");
    }

    #[test]
    fn test_mock_provider_specific_responses() {
        let mut provider = MockProvider::default();
        provider.add_response("hello", "world");
        provider.add_response("foo", "bar");

        assert_eq!(provider.generate("say hello").unwrap(), "world");
        assert_eq!(provider.generate("foo").unwrap(), "bar");
        assert_eq!(provider.generate("unknown").unwrap(), "Default mock response");
    }

    #[test]
    fn test_mock_provider_script_then_default() {
        let provider = MockProvider::new("fallback")
            .with_script(["one"])
            .then_error("backend down")
            .then_reply("three");

        assert_eq!(provider.generate("p").unwrap(), "one");
        assert!(matches!(provider.generate("p"), Err(LlmError::Other(_))));
        assert_eq!(provider.generate("p").unwrap(), "three");
        assert_eq!(provider.generate("p").unwrap(), "fallback");
    }

    #[test]
    fn test_mock_provider_rules_take_priority_over_script() {
        let mut provider = MockProvider::default().with_script(["scripted"]);
        provider.add_response("special", "ruled");

        assert_eq!(provider.generate("special prompt").unwrap(), "ruled");
        assert_eq!(provider.generate("plain prompt").unwrap(), "scripted");
    }

    #[test]
    fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");

        assert_eq!(provider.call_count(), 0);

        provider.generate("prompt1").unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.generate("prompt2").unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts(), vec!["prompt1", "prompt2"]);

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_mock_provider_error() {
        let mut provider = MockProvider::default();
        provider.add_error("bad prompt");

        let result = provider.generate("a bad prompt");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LlmError::Other(_)));
    }

    #[test]
    fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.generate("test").unwrap();

        // Both should share the same call count due to Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
