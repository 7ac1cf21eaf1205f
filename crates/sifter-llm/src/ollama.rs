//! Ollama Provider Implementation
//!
//! Provides integration with Ollama's local LLM API.
//!
//! # Features
//!
//! - HTTP communication with the Ollama generate API
//! - Configurable endpoint, model and timeout
//! - Optional JSON mode (`"format": "json"`)
//!
//! A call is a single request. Retries belong to the extraction orchestrator.
//!
//! # Examples
//!
//! ```no_run
//! use sifter_llm::OllamaProvider;
//! use sifter_domain::traits::LlmProvider;
//!
//! let provider = OllamaProvider::default_endpoint("gemma3:4b").unwrap();
//! let reply = provider.generate("Say hello").unwrap();
//! ```

use crate::LlmError;
use serde::{Deserialize, Serialize};
use sifter_domain::traits::LlmProvider as LlmProviderTrait;
use std::time::Duration;
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for LLM requests; local models are slow on long chunks
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Connection settings for an Ollama instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaSettings {
    /// API endpoint (e.g., "http://localhost:11434")
    pub endpoint: String,

    /// Model to use (e.g., "gemma3:4b", "llama3.2:1b")
    pub model: String,

    /// HTTP timeout per request (seconds)
    pub timeout_secs: u64,

    /// Ask Ollama to constrain output to JSON
    pub json_mode: bool,
}

impl OllamaSettings {
    /// Settings for `model` on the default endpoint
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            json_mode: false,
        }
    }
}

/// Ollama API provider for local LLM inference
///
/// This provider communicates with a local Ollama instance to generate text.
pub struct OllamaProvider {
    settings: OllamaSettings,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(settings: OllamaSettings) -> Result<Self, LlmError> {
        // Each blocking call drives its own short-lived runtime, so pooled
        // connections would outlive the runtime that opened them
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    /// Create a new Ollama provider on `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(OllamaSettings::for_model(model))
    }

    /// Connection settings in use
    pub fn settings(&self) -> &OllamaSettings {
        &self.settings
    }

    /// Generate text using Ollama API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Ollama is not running
    /// - Model is not available
    /// - The request times out
    /// - Response format is invalid
    pub async fn generate_async(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.settings.endpoint.trim_end_matches('/'));

        let request_body = OllamaGenerateRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
            format: self.settings.json_mode.then_some("json"),
        };

        debug!("POST {} (model {}, prompt {} chars)", url, self.settings.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout(self.settings.timeout_secs)
                } else {
                    LlmError::Communication(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.settings.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::Communication(format!("HTTP {}: {}", status, error_text)));
        }

        response
            .json::<OllamaGenerateResponse>()
            .await
            .map(|r| r.response)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

impl LlmProviderTrait for OllamaProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<String, Self::Error> {
        // Blocking wrapper for the async call; callers run this off the async
        // executor (e.g. via spawn_blocking)
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to start runtime: {}", e)))?;

        runtime.block_on(self.generate_async(prompt))
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
