//! OpenRouter Provider Implementation
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint; OpenRouter is
//! the default.
//!
//! # Examples
//!
//! ```no_run
//! use docsift_llm::OpenRouterProvider;
//!
//! let provider = OpenRouterProvider::new("sk-or-...")
//!     .unwrap()
//!     .with_model("openai/gpt-4o-mini");
//! ```

use crate::{ChatCompletion, ChatRequest, LlmError, LlmProvider};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::{debug, warn};

/// Default OpenRouter API base URL
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";

/// Default timeout for LLM requests (60 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP provider for OpenAI-compatible chat completion APIs
///
/// Sends exactly one request per call. Retrying is left to the caller.
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Create a provider with the default endpoint, model and timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a provider whose HTTP client gives up after `timeout`
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Use a different API base URL (without the `/chat/completions` suffix)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Full URL of the completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }
}

impl LlmProvider for OpenRouterProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmError> {
        let url = self.completions_url();
        debug!(model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!(%status, "Chat completion request rejected");
            return Err(status_error(status, &request.model, body));
        }

        response
            .json::<ChatCompletion>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }
}

fn status_error(status: StatusCode, model: &str, body: String) -> LlmError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Unauthorized(body),
        StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        _ => LlmError::Communication(format!("HTTP {}: {}", status, body)),
    }
}
