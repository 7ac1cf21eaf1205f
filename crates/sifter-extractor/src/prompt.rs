//! LLM prompt engineering for record extraction

use crate::error::ExtractorError;
use sifter_domain::Schema;

/// Placeholder replaced by the chunk text
pub const TEXT_PLACEHOLDER: &str = "{text}";

/// Placeholder replaced by the schema-derived output contract
pub const INSTRUCTIONS_PLACEHOLDER: &str = "{format_instructions}";

/// Default template, tuned for academic articles
pub const DEFAULT_TEMPLATE: &str = r#"You are extracting structured data from academic articles.
Focus only on the most significant result reported in the article.

Article:
{text}

{format_instructions}"#;

/// Builds per-chunk prompts from a template and a schema
///
/// The output contract (field list, single-object rule, sentinel rule) is
/// rendered once and embedded in every prompt. A template without
/// `{format_instructions}` gets the contract prepended.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    template: String,
    instructions: String,
}

impl PromptBuilder {
    /// Create a prompt builder using [`DEFAULT_TEMPLATE`]
    pub fn new(schema: &Schema) -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            instructions: format_instructions(schema),
        }
    }

    /// Use a custom template
    ///
    /// # Errors
    /// Returns error if the template has no `{text}` placeholder
    pub fn with_template(mut self, template: impl Into<String>) -> Result<Self, ExtractorError> {
        let template = template.into();
        if !template.contains(TEXT_PLACEHOLDER) {
            return Err(ExtractorError::Prompt(format!(
                "template must contain the {} placeholder",
                TEXT_PLACEHOLDER
            )));
        }
        self.template = template;
        Ok(self)
    }

    /// The rendered output contract
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Build the complete prompt for one chunk
    pub fn build(&self, chunk_text: &str) -> String {
        // Substitute each side of the instructions placeholder separately so
        // placeholder-like text inside the chunk or instructions stays literal
        let (head, tail) = match self.template.split_once(INSTRUCTIONS_PLACEHOLDER) {
            Some((head, tail)) => (head, Some(tail)),
            None => (self.template.as_str(), None),
        };

        let mut prompt = String::with_capacity(
            self.template.len() + self.instructions.len() + chunk_text.len(),
        );
        let text_in_head = head.contains(TEXT_PLACEHOLDER);

        match tail {
            Some(tail) => {
                prompt.push_str(&head.replacen(TEXT_PLACEHOLDER, chunk_text, 1));
                prompt.push_str(&self.instructions);
                if text_in_head {
                    prompt.push_str(tail);
                } else {
                    prompt.push_str(&tail.replacen(TEXT_PLACEHOLDER, chunk_text, 1));
                }
            }
            None => {
                prompt.push_str(&self.instructions);
                prompt.push_str("\n\n");
                prompt.push_str(&head.replacen(TEXT_PLACEHOLDER, chunk_text, 1));
            }
        }

        prompt
    }
}

/// Render the output contract for `schema`
fn format_instructions(schema: &Schema) -> String {
    let sentinel = quote(schema.sentinel());
    let mut out = String::new();

    out.push_str("Return ONLY a single JSON object with exactly these keys, in this order:\n");
    out.push_str("{\n");
    let last = schema.len().saturating_sub(1);
    for (idx, field) in schema.fields().iter().enumerate() {
        let hint = if field.description.is_empty() {
            "string"
        } else {
            field.description.as_str()
        };
        out.push_str(&format!(
            "  {}: {}{}\n",
            quote(&field.key),
            quote(hint),
            if idx < last { "," } else { "" }
        ));
    }
    out.push_str("}\n\n");

    out.push_str("Rules:\n");
    out.push_str("- Return ALL fields listed above; every value is a string.\n");
    out.push_str(&format!(
        "- If a field is not available in the text, set its value to {}. Never omit a field.\n",
        sentinel
    ));
    out.push_str("- Return exactly one JSON object, not an array.\n");
    out.push_str("- Do not use markdown, code fences, comments, or any text outside the object.");

    out
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}
