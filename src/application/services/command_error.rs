use crate::application::ports::{
    AccountingError, LlmClientError, RepositoryError, TranscriptionError,
};
use crate::domain::CommandIntent;

use super::ParsingError;

/// Failure of any stage of the command pipeline. Each variant keeps its cause.
#[derive(Debug, thiserror::Error)]
pub enum CommandProcessingError {
    #[error("unsupported command intent: {0}")]
    UnsupportedIntent(CommandIntent),
    #[error("invalid entity `{field}`: {reason}")]
    InvalidEntity { field: String, reason: String },
    #[error("parsing: {0}")]
    Parsing(#[from] ParsingError),
    #[error("transcription: {0}")]
    Transcription(#[from] TranscriptionError),
    #[error("accounting: {0}")]
    Accounting(#[from] AccountingError),
    #[error("suggestions: {0}")]
    Suggestions(#[source] LlmClientError),
    #[error("result serialization: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("history: {0}")]
    History(#[from] RepositoryError),
}

impl CommandProcessingError {
    pub fn invalid_entity(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEntity {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
