mod accounting_capability;
mod command_history_repository;
mod llm_client;
mod repository_error;
mod transcription_engine;

pub use accounting_capability::{AccountingCapability, AccountingError};
pub use command_history_repository::{
    CommandHistoryRepository, DEFAULT_HISTORY_LIMIT, DateRange, HistoryQuery, MAX_HISTORY_LIMIT,
    MAX_HISTORY_OFFSET, Pagination,
};
pub use llm_client::{LlmClient, LlmClientError};
pub use repository_error::RepositoryError;
pub use transcription_engine::{TranscriptionEngine, TranscriptionError};
