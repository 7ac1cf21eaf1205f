//! CLI command definitions and argument parsing.

use crate::config::SifterConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sifter - Extract one structured record per document with a local LLM.
#[derive(Debug, Parser)]
#[command(name = "sifter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.sifter/config.toml)
    #[arg(short, long, global = true, env = "SIFTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log debug output (per-chunk progress)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract records from every document in a directory
    Extract(ExtractArgs),

    /// Write the default configuration file
    InitConfig(InitConfigArgs),
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Directory containing the documents
    pub input: PathBuf,

    /// CSV file to write (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Ollama API endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Documents processed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Maximum chunk size in characters
    #[arg(long)]
    pub max_chunk: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    pub overlap: Option<usize>,

    /// Extra attempts per chunk after a backend failure
    #[arg(long)]
    pub retries: Option<u32>,

    /// File extensions to read (repeatable)
    #[arg(short = 'e', long = "ext")]
    pub extensions: Vec<String>,

    /// Remove markup delimiters before chunking
    #[arg(long)]
    pub strip_delimiters: bool,
}

/// Arguments for the init-config command.
#[derive(Debug, Parser)]
pub struct InitConfigArgs {
    /// Overwrite an existing file
    #[arg(short, long)]
    pub force: bool,
}

impl ExtractArgs {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply(&self, config: &mut SifterConfig) {
        if let Some(output) = &self.output {
            config.output.path = Some(output.clone());
        }
        if let Some(model) = &self.model {
            config.backend.model = model.clone();
        }
        if let Some(endpoint) = &self.endpoint {
            config.backend.endpoint = endpoint.clone();
        }
        if let Some(concurrency) = self.concurrency {
            config.extractor.document_concurrency = concurrency;
        }
        if let Some(max_chunk) = self.max_chunk {
            config.extractor.max_chunk_size = max_chunk;
        }
        if let Some(overlap) = self.overlap {
            config.extractor.chunk_overlap = overlap;
        }
        if let Some(retries) = self.retries {
            config.extractor.max_retries = retries;
        }
        if !self.extensions.is_empty() {
            config.source.extensions = self.extensions.clone();
        }
        if self.strip_delimiters {
            config.extractor.strip_delimiters = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::parse_from([
            "sifter", "-v", "extract", "papers", "-o", "out.csv", "--model", "gemma3:4b",
            "--max-chunk", "1500", "--overlap", "150", "-e", "txt", "-e", "md",
        ]);

        assert!(cli.verbose);
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(args.input, PathBuf::from("papers"));
        assert_eq!(args.extensions, vec!["txt".to_string(), "md".to_string()]);

        let mut config = SifterConfig::default();
        args.apply(&mut config);
        assert_eq!(config.output.path, Some(PathBuf::from("out.csv")));
        assert_eq!(config.backend.model, "gemma3:4b");
        assert_eq!(config.extractor.max_chunk_size, 1500);
        assert_eq!(config.extractor.chunk_overlap, 150);
        assert_eq!(config.extractor.document_concurrency, 1);
    }

    #[test]
    fn test_parse_init_config() {
        let cli = Cli::parse_from(["sifter", "init-config", "--force"]);
        assert!(matches!(cli.command, Command::InitConfig(InitConfigArgs { force: true })));
    }
}
