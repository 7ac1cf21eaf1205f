//! Source documents handed to the extraction pipeline

/// A decoded source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Stable identifier, e.g. a path relative to the input root
    pub id: String,

    /// Full decoded text
    pub text: String,
}

impl Document {
    /// Create a new document
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}
