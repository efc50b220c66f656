//! Wire types for OpenAI-compatible chat completion APIs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a chat message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// End-user turn
    User,
    /// Model turn
    Assistant,
}

/// A single chat message in a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request body for a chat completion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    /// Model identifier, e.g. `openai/gpt-4o-mini`
    pub model: String,
    /// Conversation turns
    pub messages: Vec<ChatMessage>,
    /// Always false: the pipeline needs the whole completion at once
    pub stream: bool,
}

impl ChatRequest {
    /// Single-turn, non-streaming request with one user message
    pub fn single_turn(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
            stream: false,
        }
    }

    /// Text of the first user message, if any
    pub fn prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Response body of a chat completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Provider-assigned completion id
    #[serde(default)]
    pub id: Option<String>,
    /// Model that produced the completion
    #[serde(default)]
    pub model: Option<String>,
    /// Completion choices; empty when the provider returned nothing
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl ChatCompletion {
    /// Completion with a single text choice
    pub fn from_text(content: impl Into<String>) -> Self {
        Self::from_content(Value::String(content.into()))
    }

    /// Completion with a single choice carrying arbitrary JSON content
    pub fn from_content(content: Value) -> Self {
        Self {
            id: None,
            model: None,
            choices: vec![ChatChoice {
                index: 0,
                message: Some(ResponseMessage {
                    role: Some(Role::Assistant),
                    content: Some(content),
                }),
                finish_reason: Some("stop".to_string()),
            }],
        }
    }

    /// Content of the first choice's message, if any
    ///
    /// Content is kept as raw JSON: most providers send a string, some send
    /// structured parts.
    pub fn first_content(&self) -> Option<&Value> {
        self.choices
            .first()
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.as_ref())
            .filter(|v| !v.is_null())
    }
}

/// One completion choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChoice {
    /// Position in the choice list
    #[serde(default)]
    pub index: u32,
    /// Generated message
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    /// Why generation stopped
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message returned inside a choice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    /// Author role (normally assistant)
    #[serde(default)]
    pub role: Option<Role>,
    /// Message content: a string, structured parts, or null
    #[serde(default)]
    pub content: Option<Value>,
}
