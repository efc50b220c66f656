//! LLM prompt engineering for document analysis

use docsift_domain::{DocumentMetadata, DocumentType};

/// Builds the single-turn analysis prompt
pub struct PromptBuilder {
    text: String,
}

impl PromptBuilder {
    /// Create a new prompt builder for a document's extracted text
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Build the complete analysis prompt
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        // 1. Role and task
        prompt.push_str(ANALYSIS_INSTRUCTIONS);
        prompt.push_str("\n\n");

        // 2. Classification rules
        let categories: Vec<&str> = DocumentType::CATEGORIES.iter().map(|c| c.as_str()).collect();
        prompt.push_str(&format!(
            "Classify the document as exactly one of: {}.\n",
            categories.join(", ")
        ));
        prompt.push_str(CLASSIFICATION_RULES);
        prompt.push_str("\n\n");

        // 3. Metadata rules
        prompt.push_str(&format!(
            "Metadata keys (all required): {}.\n",
            DocumentMetadata::KNOWN_KEYS.join(", ")
        ));
        prompt.push_str(METADATA_RULES);
        prompt.push_str("\n\n");

        // 4. The text to analyze
        prompt.push_str("Text to analyze:\n");
        prompt.push_str("---\n");
        prompt.push_str(&self.text);
        prompt.push_str("\n---\n\n");

        // 5. Output format reminder
        prompt.push_str(OUTPUT_FORMAT_REMINDER);

        prompt
    }
}

const ANALYSIS_INSTRUCTIONS: &str = "You are an AI that analyzes documents.
Read the text below and produce a short summary, a document type and the key metadata.";

const CLASSIFICATION_RULES: &str = "Rules:
- Always pick the closest category, even when the document is ambiguous
- Never answer \"unknown\" or leave the type empty";

const METADATA_RULES: &str = "Rules:
- Include every key listed above
- Use a concrete string value when the text contains it, otherwise null
- Never omit a key
- Keep dates and amounts as written in the document (include the currency)
- Put any other notable detail (reference number, recipient, role) in \"other\"";

const OUTPUT_FORMAT_REMINDER: &str = r#"Output format (strict JSON object only, no markdown, no additional text):
{
  "summary": "...",
  "type": "invoice | letter | cv | report",
  "metadata": {
    "date": "... or null",
    "sender": "... or null",
    "total_amount": "... or null",
    "other": "... or null"
  }
}"#;
