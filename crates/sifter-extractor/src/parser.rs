//! Parse LLM output into raw field mappings
//!
//! Two stages, tried in order:
//!
//! 1. **Strict**: strip code fences and decode the whole reply as JSON
//! 2. **Recovery**: take the outermost `{ ... }` span, drop `//` comments,
//!    and decode again
//!
//! In both stages a JSON array is reduced to its first element.

use serde_json::{Map, Value};

/// Which stage produced a mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// The reply decoded directly (after fence stripping)
    Strict,
    /// The reply needed brace extraction and comment removal
    Recovered,
}

/// Result of parsing one model reply
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// A JSON object was recovered
    Parsed {
        /// Decoded fields, not yet conformed to the schema
        fields: Map<String, Value>,
        /// Stage that succeeded
        stage: ParseStage,
    },
    /// Neither stage produced a JSON object
    Failure {
        /// The reply exactly as received
        raw: String,
        /// Why the recovery stage gave up
        reason: String,
    },
}

impl ParseOutcome {
    /// True if a mapping was produced
    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed { .. })
    }
}

/// Parse a model reply into a field mapping
pub fn parse_llm_response(raw: &str) -> ParseOutcome {
    if let Ok(fields) = decode_object(strip_code_fences(raw)) {
        return ParseOutcome::Parsed {
            fields,
            stage: ParseStage::Strict,
        };
    }

    let recovered = extract_braced(raw)
        .ok_or_else(|| "no JSON object found".to_string())
        .and_then(|span| decode_object(&strip_line_comments(span)));

    match recovered {
        Ok(fields) => ParseOutcome::Parsed {
            fields,
            stage: ParseStage::Recovered,
        },
        Err(reason) => ParseOutcome::Failure {
            raw: raw.to_string(),
            reason,
        },
    }
}

/// Remove surrounding whitespace and markdown code fences
fn strip_code_fences(response: &str) -> &str {
    let trimmed = response.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```JSON"))
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .trim_end()
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

/// Span from the first `{` to the last `}`, inclusive
fn extract_braced(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (start < end).then(|| &raw[start..=end])
}

/// Drop everything from an unquoted `//` to the end of each line
fn strip_line_comments(text: &str) -> String {
    text.lines()
        .map(|line| {
            let mut in_string = false;
            let mut escaped = false;
            let mut prev_slash = false;

            for (idx, c) in line.char_indices() {
                if in_string {
                    match c {
                        _ if escaped => escaped = false,
                        '\\' => escaped = true,
                        '"' => in_string = false,
                        _ => {}
                    }
                    continue;
                }
                match c {
                    '"' => in_string = true,
                    '/' if prev_slash => return &line[..idx - 1],
                    _ => {}
                }
                prev_slash = c == '/';
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode JSON, reducing an array to its first element, and require an object
fn decode_object(text: &str) -> Result<Map<String, Value>, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("JSON parse error: {}", e))?;

    let value = match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .ok_or_else(|| "Expected JSON object, got empty array".to_string())?,
        other => other,
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(format!("Expected JSON object, got {}", kind(&other))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
