//! Analysis client: prompt, single provider call, parse

use crate::error::AnalysisError;
use crate::parser;
use crate::prompt::PromptBuilder;
use docsift_domain::AnalysisResult;
use docsift_llm::{ChatRequest, LlmProvider};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Sends document text to an LLM and decodes the structured analysis
#[derive(Debug, Clone)]
pub struct AnalysisClient<L> {
    provider: L,
}

impl<L: LlmProvider> AnalysisClient<L> {
    /// Create a client over the given provider
    pub fn new(provider: L) -> Self {
        Self { provider }
    }

    /// Access the underlying provider
    pub fn provider(&self) -> &L {
        &self.provider
    }

    /// Analyze a document's text
    ///
    /// Exactly one completion request is sent. Cancelling `cancel` abandons
    /// the in-flight request and yields [`AnalysisError::Cancelled`].
    pub async fn analyze(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = PromptBuilder::new(text).build();
        let request = ChatRequest::single_turn(self.provider.model(), prompt);

        info!(
            model = %request.model,
            text_len = text.len(),
            "Requesting document analysis"
        );

        let completion = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!("Analysis cancelled before the provider answered");
                return Err(AnalysisError::Cancelled);
            }
            result = self.provider.complete(&request) => result?,
        };

        let content = completion
            .first_content()
            .ok_or(AnalysisError::NoResponse)?;

        let result = parser::parse(content)?;
        debug!(
            document_type = %result.document_type,
            summary_len = result.summary.len(),
            "Analysis decoded"
        );

        Ok(result)
    }
}
