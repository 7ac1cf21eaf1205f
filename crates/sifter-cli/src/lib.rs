//! Sifter CLI library.
//!
//! Everything around the extraction core that touches the outside world:
//! argument parsing, configuration files, backend selection, reading
//! documents from disk and writing the result table as CSV.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod sink;
pub mod source;

pub use backend::Backend;
pub use cli::{Cli, Command};
pub use config::SifterConfig;
pub use error::{CliError, Result};
pub use sink::CsvSink;
pub use source::DirectorySource;
