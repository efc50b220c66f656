//! Docsift LLM Provider Layer
//!
//! Pluggable chat-completion providers behind a common async interface.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `OpenRouterProvider`: OpenAI-compatible chat completions over HTTP
//!
//! # Examples
//!
//! ```
//! use docsift_llm::{ChatRequest, LlmProvider, MockProvider};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let provider = MockProvider::new("Hello from LLM!");
//! let request = ChatRequest::single_turn(provider.model(), "test prompt");
//! let completion = provider.complete(&request).await.unwrap();
//! assert_eq!(*completion.first_content().unwrap(), "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openrouter;
pub mod types;

use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

pub use openrouter::OpenRouterProvider;
pub use types::{ChatChoice, ChatCompletion, ChatMessage, ChatRequest, ResponseMessage, Role};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Credentials were rejected by the provider
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A chat-completion backend
///
/// One call is one request: implementations must not retry internally.
pub trait LlmProvider: Send + Sync {
    /// Model identifier sent with each request
    fn model(&self) -> &str;

    /// Send a single non-streaming completion request
    fn complete(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatCompletion, LlmError>> + Send;
}

#[derive(Debug, Clone)]
enum MockReply {
    Content(Value),
    NoChoices,
    Fail(String),
}

/// Mock LLM provider for deterministic testing
///
/// Returns a pre-configured completion without making any network calls and
/// records every prompt it receives.
///
/// # Examples
///
/// ```
/// use docsift_llm::MockProvider;
///
/// let provider = MockProvider::new("Fixed response");
/// assert_eq!(provider.call_count(), 0);
/// assert!(provider.last_prompt().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    model: String,
    reply: MockReply,
    call_count: Arc<Mutex<usize>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockProvider {
    /// Create a new MockProvider that answers every prompt with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Content(Value::String(response.into())))
    }

    /// Answer with structured (non-string) message content
    pub fn structured(content: Value) -> Self {
        Self::with_reply(MockReply::Content(content))
    }

    /// Answer with a completion that has no choices
    pub fn empty() -> Self {
        Self::with_reply(MockReply::NoChoices)
    }

    /// Fail every call with `LlmError::Other`
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Fail(message.into()))
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            model: "mock/model".to_string(),
            reply,
            call_count: Arc::new(Mutex::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the call count
    pub fn reset_call_count(&self) {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) = 0;
    }

    /// The prompt of the most recent call
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProvider for MockProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        *self.call_count.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if let Some(prompt) = request.prompt() {
            self.prompts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(prompt.to_string());
        }

        match &self.reply {
            MockReply::Content(content) => Ok(ChatCompletion::from_content(content.clone())),
            MockReply::NoChoices => Ok(ChatCompletion::default()),
            MockReply::Fail(message) => Err(LlmError::Other(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(prompt: &str) -> ChatRequest {
        ChatRequest::single_turn("mock/model", prompt)
    }

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new("Test response");
        let completion = provider.complete(&request("any prompt")).await.unwrap();
        assert_eq!(completion.first_content(), Some(&json!("Test response")));
    }

    #[tokio::test]
    async fn test_mock_provider_structured() {
        let provider = MockProvider::structured(json!({"summary": "s"}));
        let completion = provider.complete(&request("p")).await.unwrap();
        assert_eq!(completion.first_content(), Some(&json!({"summary": "s"})));
    }

    #[tokio::test]
    async fn test_mock_provider_empty() {
        let provider = MockProvider::empty();
        let completion = provider.complete(&request("p")).await.unwrap();
        assert!(completion.choices.is_empty());
    }

    #[tokio::test]
    async fn test_mock_provider_error() {
        let provider = MockProvider::failing("boom");
        let result = provider.complete(&request("bad prompt")).await;
        assert!(matches!(result, Err(LlmError::Other(ref m)) if m == "boom"));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_provider_call_count() {
        let provider = MockProvider::new("test");
        assert_eq!(provider.call_count(), 0);

        provider.complete(&request("prompt1")).await.unwrap();
        assert_eq!(provider.call_count(), 1);

        provider.complete(&request("prompt2")).await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.last_prompt().as_deref(), Some("prompt2"));

        provider.reset_call_count();
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_mock_provider_clone() {
        let provider1 = MockProvider::new("test");
        let provider2 = provider1.clone();

        provider1.complete(&request("test")).await.unwrap();

        // Both share the same call count through the Arc
        assert_eq!(provider1.call_count(), 1);
        assert_eq!(provider2.call_count(), 1);
    }
}
