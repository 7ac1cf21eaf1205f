//! Schema module - the fixed set of fields every record carries

use crate::candidate::Candidate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Sentinel used when a schema does not configure its own
pub const DEFAULT_SENTINEL: &str = "N/A";

/// Errors raised when a schema violates its invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Schema declares no fields
    #[error("Schema must declare at least one field")]
    EmptySchema,

    /// A field has an empty key
    #[error("Field at position {0} has an empty key")]
    EmptyKey(usize),

    /// Two fields share a key
    #[error("Duplicate field key: {0}")]
    DuplicateKey(String),

    /// A field has an empty display name
    #[error("Field '{0}' has an empty display name")]
    EmptyDisplayName(String),

    /// Two fields share a display name
    #[error("Duplicate display name: {0}")]
    DuplicateDisplayName(String),

    /// The sentinel is empty
    #[error("Sentinel value cannot be empty")]
    EmptySentinel,
}

/// One declared output field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Stable internal identifier, used in prompts and model output
    pub key: String,

    /// Column name used in the final table
    pub display: String,

    /// What the model should put in this field
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl FieldDescriptor {
    /// Create a field descriptor without a description
    pub fn new(key: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display: display.into(),
            description: String::new(),
        }
    }

    /// Attach a description used when instructing the model
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Ordered set of output fields plus the "not extracted" sentinel
///
/// A `Schema` can only be obtained through [`Schema::new`], so every instance
/// has unique non-empty keys, unique non-empty display names, and a non-empty
/// sentinel. It is the single owner of the key to display-name mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
    sentinel: String,
}

impl Schema {
    /// Create a validated schema
    ///
    /// # Errors
    /// Returns error if any schema invariant is violated
    pub fn new(fields: Vec<FieldDescriptor>, sentinel: impl Into<String>) -> Result<Self, SchemaError> {
        let sentinel = sentinel.into();
        if sentinel.is_empty() {
            return Err(SchemaError::EmptySentinel);
        }
        if fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        let mut keys = HashSet::new();
        let mut displays = HashSet::new();
        for (idx, field) in fields.iter().enumerate() {
            if field.key.trim().is_empty() {
                return Err(SchemaError::EmptyKey(idx));
            }
            if !keys.insert(field.key.as_str()) {
                return Err(SchemaError::DuplicateKey(field.key.clone()));
            }
            if field.display.trim().is_empty() {
                return Err(SchemaError::EmptyDisplayName(field.key.clone()));
            }
            if !displays.insert(field.display.as_str()) {
                return Err(SchemaError::DuplicateDisplayName(field.display.clone()));
            }
        }

        Ok(Self { fields, sentinel })
    }

    /// Declared fields in output order
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Field keys in output order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }

    /// Display names in output order
    pub fn display_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.display.as_str())
    }

    /// The "not extracted" marker
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a validated schema
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up the display name for a key
    pub fn display_name(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.display.as_str())
    }

    /// Conform a raw decoded object to this schema
    ///
    /// Total: every declared key ends up present, undeclared keys are dropped,
    /// absent or null values become the sentinel, and every other value is
    /// kept as text.
    pub fn normalize(&self, raw: &Map<String, Value>) -> Candidate {
        let fields = self
            .fields
            .iter()
            .map(|field| {
                let value = raw
                    .get(&field.key)
                    .and_then(coerce_to_text)
                    .unwrap_or_else(|| self.sentinel.clone());
                (field.key.clone(), value)
            })
            .collect();

        Candidate::new(fields)
    }

    /// A candidate with every field set to the sentinel
    pub fn empty_candidate(&self) -> Candidate {
        self.normalize(&Map::new())
    }
}

/// Render a JSON value as field text; `None` means "use the sentinel"
///
/// Only null maps to `None`. An empty string is a value the model chose to
/// give and is kept.
fn coerce_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.iter().all(is_scalar) => Some(
            items
                .iter()
                .filter_map(coerce_to_text)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            ".{0,12}".prop_map(Value::String),
        ]
    }

    proptest! {
        /// Property: normalize yields exactly the declared keys in order, and a
        /// value is the sentinel only when it was absent or null
        #[test]
        fn test_normalize_is_total(
            entries in proptest::collection::vec(("[a-z]{1,6}", arb_value()), 0..8)
        ) {
            let schema = Schema::new(
                vec![
                    FieldDescriptor::new("doi", "DOI"),
                    FieldDescriptor::new("year", "Year"),
                ],
                "N/A",
            ).unwrap();
            let raw: Map<String, Value> = entries.into_iter().collect();

            let candidate = schema.normalize(&raw);
            prop_assert_eq!(candidate.keys().collect::<Vec<_>>(), vec!["doi", "year"]);
            for (key, value) in candidate.iter() {
                let missing = raw.get(key).map_or(true, Value::is_null);
                if missing {
                    prop_assert_eq!(value, "N/A");
                }
            }
        }
    }
}
