//! Backend selection.

use crate::config::{BackendKind, SifterConfig};
use crate::error::Result;
use sifter_domain::traits::LlmProvider;
use sifter_llm::{LlmError, MockProvider, OllamaProvider};
use tracing::info;

/// Reply of the mock backend when the config does not set one
const DEFAULT_MOCK_REPLY: &str = "{}";

/// The backend chosen by configuration.
pub enum Backend {
    /// Local Ollama instance
    Ollama(OllamaProvider),
    /// Fixed reply
    Mock(MockProvider),
}

impl Backend {
    /// Build the backend described by `config`.
    pub fn from_config(config: &SifterConfig) -> Result<Self> {
        let backend = match config.backend.kind {
            BackendKind::Ollama => Backend::Ollama(OllamaProvider::new(config.ollama_settings())?),
            BackendKind::Mock => Backend::Mock(MockProvider::new(
                config
                    .backend
                    .mock_reply
                    .as_deref()
                    .unwrap_or(DEFAULT_MOCK_REPLY),
            )),
        };

        info!("Using {:?} backend ({})", config.backend.kind, backend.model_name());
        Ok(backend)
    }
}

impl LlmProvider for Backend {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> std::result::Result<String, Self::Error> {
        match self {
            Backend::Ollama(provider) => provider.generate(prompt),
            Backend::Mock(provider) => provider.generate(prompt),
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Backend::Ollama(provider) => provider.model_name(),
            Backend::Mock(provider) => provider.model_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_backend_from_config() {
        let mut config = SifterConfig::default();
        config.backend.kind = BackendKind::Mock;
        config.backend.mock_reply = Some(r#"{"doi": "x"}"#.to_string());

        let backend = Backend::from_config(&config).unwrap();
        assert_eq!(backend.model_name(), "mock");
        assert_eq!(backend.generate("anything").unwrap(), r#"{"doi": "x"}"#);
    }

    #[test]
    fn test_ollama_backend_reports_model() {
        let mut config = SifterConfig::default();
        config.backend.model = "gemma3:4b".to_string();

        let backend = Backend::from_config(&config).unwrap();
        assert!(matches!(backend, Backend::Ollama(_)));
        assert_eq!(backend.model_name(), "gemma3:4b");
    }
}
