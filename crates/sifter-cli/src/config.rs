//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use sifter_domain::{presets, FieldDescriptor, Schema, DEFAULT_SENTINEL};
use sifter_extractor::ExtractorConfig;
use sifter_llm::ollama::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
use sifter_llm::OllamaSettings;
use std::fs;
use std::path::{Path, PathBuf};

/// Model used when neither the config file nor the command line names one
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

/// CLI configuration, one TOML table per concern.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SifterConfig {
    /// Chunking, timeouts, retries and concurrency
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Text-generation backend
    #[serde(default)]
    pub backend: BackendConfig,

    /// Output schema
    #[serde(default)]
    pub schema: SchemaConfig,

    /// Prompt override
    #[serde(default)]
    pub prompt: PromptConfig,

    /// Document discovery
    #[serde(default)]
    pub source: SourceConfig,

    /// Result destination
    #[serde(default)]
    pub output: OutputConfig,
}

/// Which backend serves the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Local Ollama instance
    Ollama,
    /// Fixed reply, for dry runs
    Mock,
}

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend kind
    #[serde(default = "default_kind")]
    pub kind: BackendKind,

    /// Ollama API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP timeout per request (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Ask the backend to constrain output to JSON
    #[serde(default)]
    pub json_mode: bool,

    /// Reply returned by the mock backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock_reply: Option<String>,
}

/// Schema settings. An empty field list selects the photovoltaic preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Value meaning "not extracted"
    #[serde(default = "default_sentinel")]
    pub sentinel: String,

    /// Output fields, in column order
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// Prompt settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Template with `{text}` and optionally `{format_instructions}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Document source settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// File extensions to read, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// CSV file to write; stdout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl SifterConfig {
    /// Get the default configuration file path.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".sifter").join("config.toml"))
    }

    /// Load configuration from `path`, or the default path.
    ///
    /// A missing file at the default path yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::default_path()?, false),
        };

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            Self::from_toml(&contents)
        } else if explicit {
            Err(CliError::Config(format!("Config file not found: {}", path.display())))
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: SifterConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Save configuration to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Build the schema this configuration describes.
    pub fn build_schema(&self) -> Result<Schema> {
        let fields = if self.schema.fields.is_empty() {
            presets::photovoltaic_fields()
        } else {
            self.schema.fields.clone()
        };
        Ok(Schema::new(fields, self.schema.sentinel.as_str())?)
    }

    /// Extractor settings with the prompt override folded in.
    pub fn extractor_config(&self) -> Result<ExtractorConfig> {
        let mut config = self.extractor.clone();
        if let Some(template) = &self.prompt.template {
            config.prompt_template = Some(template.clone());
        }
        config.validate()?;
        Ok(config)
    }

    /// Ollama connection settings.
    pub fn ollama_settings(&self) -> OllamaSettings {
        OllamaSettings {
            endpoint: self.backend.endpoint.clone(),
            model: self.backend.model.clone(),
            timeout_secs: self.backend.timeout_secs,
            json_mode: self.backend.json_mode,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            json_mode: false,
            mock_reply: None,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            sentinel: default_sentinel(),
            fields: Vec::new(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_kind() -> BackendKind {
    BackendKind::Ollama
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_sentinel() -> String {
    DEFAULT_SENTINEL.to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["txt".to_string(), "pdf".to_string()]
}
