//! Completeness scoring for candidates

use crate::candidate::Candidate;

/// Count the fields of `candidate` that are not the sentinel
///
/// Used only as a ranking key between candidates of the same document.
///
/// # Examples
///
/// ```
/// use sifter_domain::{completeness_score, FieldDescriptor, Schema};
///
/// let schema = Schema::new(
///     vec![FieldDescriptor::new("doi", "DOI"), FieldDescriptor::new("year", "Year")],
///     "N/A",
/// ).unwrap();
/// let raw = serde_json::json!({"doi": "10.1000/xyz", "year": "N/A"});
/// let candidate = schema.normalize(raw.as_object().unwrap());
///
/// assert_eq!(completeness_score(&candidate, schema.sentinel()), 1);
/// ```
pub fn completeness_score(candidate: &Candidate, sentinel: &str) -> usize {
    candidate.values().filter(|v| *v != sentinel).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDescriptor, Schema};
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new(
            vec![
                FieldDescriptor::new("a", "A"),
                FieldDescriptor::new("b", "B"),
                FieldDescriptor::new("c", "C"),
            ],
            "N/A",
        )
        .unwrap()
    }

    #[test]
    fn test_all_sentinel_scores_zero() {
        let schema = schema();
        assert_eq!(completeness_score(&schema.empty_candidate(), schema.sentinel()), 0);
    }

    #[test]
    fn test_fully_populated_scores_field_count() {
        let schema = schema();
        let raw = json!({"a": "1", "b": "2", "c": "3"});
        let candidate = schema.normalize(raw.as_object().unwrap());
        assert_eq!(completeness_score(&candidate, schema.sentinel()), schema.len());
    }

    #[test]
    fn test_explicit_sentinel_values_do_not_count() {
        let schema = schema();
        let raw = json!({"a": "N/A", "b": "present", "c": null});
        let candidate = schema.normalize(raw.as_object().unwrap());
        assert_eq!(completeness_score(&candidate, schema.sentinel()), 1);
    }
}
