//! Sifter CLI - extract structured records from a directory of documents.

use clap::Parser;
use sifter_cli::cli::{ExtractArgs, InitConfigArgs};
use sifter_cli::{Backend, Cli, CliError, Command, CsvSink, DirectorySource, SifterConfig};
use sifter_extractor::{Aggregator, CancellationFlag, DocumentExtractor};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr so CSV on stdout stays clean
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn run(cli: Cli) -> sifter_cli::Result<()> {
    match cli.command {
        Command::Extract(args) => extract(cli.config.as_deref(), args).await,
        Command::InitConfig(args) => init_config(cli.config.as_deref(), args),
    }
}

async fn extract(config_path: Option<&Path>, args: ExtractArgs) -> sifter_cli::Result<()> {
    let mut config = SifterConfig::load(config_path)?;
    args.apply(&mut config);

    let schema = config.build_schema()?;
    let extractor_config = config.extractor_config()?;
    let backend = Backend::from_config(&config)?;
    let extractor = DocumentExtractor::new(backend, schema, extractor_config)?;

    let documents = DirectorySource::new(&args.input, &config.source.extensions).load()?;
    if documents.is_empty() {
        eprintln!(
            "No records produced: no documents found in {}",
            args.input.display()
        );
        return Ok(());
    }

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; finishing the current chunk and keeping completed records");
            on_interrupt.cancel();
        }
    });

    let report = Aggregator::new(extractor, cancel).run(documents).await;
    eprintln!("{}", report.summary);

    if report.table.is_empty() {
        eprintln!(
            "No records produced: all {} documents omitted or abandoned",
            report.summary.documents_total
        );
        return Ok(());
    }

    CsvSink::new(config.output.path.clone()).write(&report.table)
}

fn init_config(config_path: Option<&Path>, args: InitConfigArgs) -> sifter_cli::Result<()> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => SifterConfig::default_path()?,
    };

    if path.exists() && !args.force {
        return Err(CliError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    SifterConfig::default().save(&path)?;
    info!("Wrote default configuration to {}", path.display());
    println!("{}", path.display());
    Ok(())
}
