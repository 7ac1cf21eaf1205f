//! Candidate and Record - per-chunk extractions and the per-document winner

/// A schema-conformant field mapping derived from exactly one chunk
///
/// Built only by [`crate::Schema::normalize`], so every declared key is
/// present, in schema order. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    fields: Vec<(String, String)>,
}

impl Candidate {
    pub(crate) fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    /// Value for a key, if the key is declared
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Keys in schema order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Values in schema order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    /// (key, value) pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if the candidate carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The candidate selected for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Identifier of the source document
    pub document_id: String,

    /// Index of the chunk the candidate came from
    pub chunk_index: usize,

    /// Completeness score of the candidate
    pub score: usize,

    /// The selected field values
    pub candidate: Candidate,
}

impl Record {
    /// Create a record from a selected candidate
    pub fn new(
        document_id: impl Into<String>,
        chunk_index: usize,
        score: usize,
        candidate: Candidate,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            chunk_index,
            score,
            candidate,
        }
    }
}
