//! Docsift Analyzer
//!
//! Turns extracted document text into a structured analysis (summary,
//! classification, metadata) through an LLM.
//!
//! # Architecture
//!
//! ```text
//! Text → PromptBuilder → LlmProvider → parse → AnalysisResult
//! ```
//!
//! The parser is pure and usable on its own:
//!
//! ```
//! use docsift_analyzer::parse;
//! use docsift_domain::DocumentType;
//!
//! let result = parse("```json\n{\"summary\":\"s\",\"type\":\"invoice\",\"metadata\":{}}\n```").unwrap();
//! assert_eq!(result.document_type, DocumentType::Invoice);
//! ```

#![warn(missing_docs)]

mod client;
mod error;
mod parser;
mod prompt;

pub use client::AnalysisClient;
pub use error::AnalysisError;
pub use parser::{parse, recover_payload, RawContent, Recovered, RecoveryStage};
pub use prompt::PromptBuilder;
