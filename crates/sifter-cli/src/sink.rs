//! CSV output for the result table.

use crate::error::{CliError, Result};
use csv::WriterBuilder;
use sifter_domain::ResultTable;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{error, info};

/// Write `table` as CSV: a header of display names, then one line per row.
pub fn write_csv<W: Write>(table: &ResultTable, writer: W) -> Result<()> {
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(table.columns())?;
    for row in table.rows() {
        csv.write_record(&row.values)?;
    }
    csv.flush()?;
    Ok(())
}

/// Destination for the final table: a file, or stdout.
#[derive(Debug, Clone, Default)]
pub struct CsvSink {
    path: Option<PathBuf>,
}

impl CsvSink {
    /// Create a sink writing to `path`, or stdout when `None`
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Write the table once, to the file or else to stdout.
    ///
    /// If the file cannot be written and the table has rows, the CSV goes to
    /// stdout before the error is returned.
    pub fn write(&self, table: &ResultTable) -> Result<()> {
        self.write_with_fallback(table, io::stdout().lock())
    }

    /// Like [`CsvSink::write`], with `fallback` standing in for stdout
    pub fn write_with_fallback<W: Write>(&self, table: &ResultTable, fallback: W) -> Result<()> {
        let Some(path) = &self.path else {
            return write_csv(table, fallback);
        };

        let written = File::create(path)
            .map_err(CliError::from)
            .and_then(|file| write_csv(table, file));

        match written {
            Ok(()) => {
                info!("Wrote {} rows to {}", table.len(), path.display());
                Ok(())
            }
            Err(e) => {
                if !table.is_empty() {
                    error!("Could not write {}: {}; writing results to stdout", path.display(), e);
                    write_csv(table, fallback)?;
                }
                Err(CliError::Sink(format!("Failed to write {}: {}", path.display(), e)))
            }
        }
    }
}
