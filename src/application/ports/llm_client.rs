use async_trait::async_trait;

/// Chat-completion capability of a hosted language model.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Single completion constrained to a JSON object, returned as raw text.
    async fn complete_json(&self, instruction: &str, input: &str)
    -> Result<String, LlmClientError>;

    /// `n` independent completions of a free-text instruction.
    async fn complete_choices(
        &self,
        instruction: &str,
        n: usize,
    ) -> Result<Vec<String>, LlmClientError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("rate limited")]
    RateLimited,
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
