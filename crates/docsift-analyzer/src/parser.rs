//! Parse LLM output into an analysis result
//!
//! Models wrap JSON in markdown fences or surround it with prose. Recovery is
//! staged: each stage only runs when the previous one did not yield something
//! that looks like JSON. Decoding itself is strict.

use crate::error::AnalysisError;
use docsift_domain::AnalysisResult;
use serde_json::Value;
use tracing::debug;

/// Message content as returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub enum RawContent {
    /// Plain string content
    Text(String),
    /// Structured content, serialized before parsing
    Structured(Value),
}

impl RawContent {
    /// String form of the content
    pub fn into_text(self) -> String {
        match self {
            RawContent::Text(text) => text,
            RawContent::Structured(Value::String(text)) => text,
            RawContent::Structured(value) => value.to_string(),
        }
    }
}

impl From<String> for RawContent {
    fn from(text: String) -> Self {
        RawContent::Text(text)
    }
}

impl From<&str> for RawContent {
    fn from(text: &str) -> Self {
        RawContent::Text(text.to_string())
    }
}

impl From<Value> for RawContent {
    fn from(value: Value) -> Self {
        RawContent::Structured(value)
    }
}

impl From<&Value> for RawContent {
    fn from(value: &Value) -> Self {
        RawContent::Structured(value.clone())
    }
}

/// Which recovery stage produced the decode candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStage {
    /// Content was JSON after trimming
    Direct,
    /// A code fence around the whole content was removed
    Fenced,
    /// The first balanced object was cut out of surrounding prose
    Embedded,
}

/// Decode candidate produced by [`recover_payload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovered<'a> {
    /// Stage that produced the payload
    pub stage: RecoveryStage,
    /// Text to hand to the JSON decoder
    pub payload: &'a str,
}

/// Parse provider content into an [`AnalysisResult`]
///
/// Never guesses: if the recovered payload does not decode, the original
/// content is returned inside [`AnalysisError::Malformed`].
pub fn parse(raw: impl Into<RawContent>) -> Result<AnalysisResult, AnalysisError> {
    let raw = raw.into().into_text();
    let recovered = recover_payload(&raw);
    debug!(
        stage = ?recovered.stage,
        payload_len = recovered.payload.len(),
        "Recovered analysis payload"
    );

    match serde_json::from_str::<AnalysisResult>(recovered.payload) {
        Ok(result) => Ok(result),
        Err(source) => Err(AnalysisError::Malformed { raw, source }),
    }
}

/// Locate the JSON payload inside raw model output
pub fn recover_payload(raw: &str) -> Recovered<'_> {
    let trimmed = raw.trim();

    let (stage, candidate) = match strip_fence(trimmed) {
        Some(inner) => (RecoveryStage::Fenced, inner),
        None => (RecoveryStage::Direct, trimmed),
    };

    if candidate.starts_with('{') || candidate.starts_with('[') {
        return Recovered {
            stage,
            payload: candidate,
        };
    }

    match first_balanced_object(candidate) {
        Some(span) => Recovered {
            stage: RecoveryStage::Embedded,
            payload: span,
        },
        None => Recovered {
            stage,
            payload: candidate,
        },
    }
}

/// Interior of a code fence wrapping the entire content, if any
///
/// The opening fence may carry a `json` language tag.
fn strip_fence(content: &str) -> Option<&str> {
    let body = content.strip_prefix("```")?.strip_suffix("```")?;

    let body = match body.find('\n') {
        Some(newline) => {
            let tag = body[..newline].trim();
            if tag.is_empty() || tag.eq_ignore_ascii_case("json") {
                &body[newline + 1..]
            } else {
                body
            }
        }
        None => body
            .strip_prefix("json")
            .or_else(|| body.strip_prefix("JSON"))
            .unwrap_or(body),
    };

    Some(body.trim())
}

/// First `{...}` span whose braces balance, ignoring braces inside strings
fn first_balanced_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in content[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}


#[cfg(test)]
mod proptests {
    use super::*;
    use docsift_domain::{DocumentMetadata, DocumentType};
    use proptest::prelude::*;

    fn arb_type() -> impl Strategy<Value = DocumentType> {
        prop_oneof![
            Just(DocumentType::Invoice),
            Just(DocumentType::Letter),
            Just(DocumentType::Cv),
            Just(DocumentType::Report),
            "x[a-z]{0,7}[A-Z]{1,4}".prop_map(DocumentType::Other),
        ]
    }

    fn arb_metadata() -> impl Strategy<Value = DocumentMetadata> {
        (
            proptest::option::of("[ -~]{0,20}"),
            proptest::option::of("[ -~]{0,20}"),
            proptest::option::of("[ -~]{0,12}"),
            proptest::option::of(".{0,20}"),
            proptest::collection::btree_map("x_[a-z]{1,6}", proptest::option::of(".{0,10}"), 0..3),
        )
            .prop_map(|(date, sender, total_amount, other, extra)| DocumentMetadata {
                date,
                sender,
                total_amount,
                other,
                extra,
            })
    }

    fn arb_result() -> impl Strategy<Value = AnalysisResult> {
        (".{0,60}", arb_type(), arb_metadata()).prop_map(|(summary, document_type, metadata)| {
            AnalysisResult {
                summary,
                document_type,
                metadata,
            }
        })
    }

    proptest! {
        #[test]
        fn parse_inverts_serialize(result in arb_result()) {
            let json = serde_json::to_string(&result).unwrap();
            prop_assert_eq!(parse(json.as_str()).unwrap(), result.clone());

            let fenced = format!("```json\n{}\n```", json);
            prop_assert_eq!(parse(fenced).unwrap(), result.clone());

            let pretty = serde_json::to_string_pretty(&result).unwrap();
            let wrapped = format!("Here is the result: {} Thanks!", pretty);
            prop_assert_eq!(parse(wrapped).unwrap(), result);
        }
    }
}
