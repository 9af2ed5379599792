use async_trait::async_trait;

#[async_trait]
pub trait TranscriptionEngine: Send + Sync {
    /// `file_name` carries the container extension the upstream API sniffs the format from.
    async fn transcribe(
        &self,
        audio_data: &[u8],
        file_name: &str,
    ) -> Result<String, TranscriptionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),
}
