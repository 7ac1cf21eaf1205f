//! ResultTable - one row per selected record, columns in schema display order

use crate::candidate::Record;
use crate::schema::Schema;

/// One row of the result table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// Document the row was extracted from
    pub document_id: String,

    /// Cell values, aligned with [`ResultTable::columns`]
    pub values: Vec<String>,
}

/// Ordered records conformed to a schema's column layout
///
/// Internal keys are rewritten to display names here and nowhere earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    columns: Vec<String>,
    keys: Vec<String>,
    sentinel: String,
    rows: Vec<TableRow>,
}

impl ResultTable {
    /// Create an empty table laid out after `schema`
    pub fn new(schema: &Schema) -> Self {
        Self {
            columns: schema.display_names().map(String::from).collect(),
            keys: schema.keys().map(String::from).collect(),
            sentinel: schema.sentinel().to_string(),
            rows: Vec::new(),
        }
    }

    /// Append a record as the next row
    pub fn push(&mut self, record: &Record) {
        let values = self
            .keys
            .iter()
            .map(|key| {
                record
                    .candidate
                    .get(key)
                    .unwrap_or(self.sentinel.as_str())
                    .to_string()
            })
            .collect();

        self.rows.push(TableRow {
            document_id: record.document_id.clone(),
            values,
        });
    }

    /// Column headers (schema display names, schema order)
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in insertion order
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if no record has been added
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
