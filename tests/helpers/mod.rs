#![allow(dead_code)]

mod mocks;
mod test_postgres;

pub use mocks::{
    FailingHistoryRepository, MockLlmClient, MockTranscriptionEngine, StubAccounting,
    balance_response, context_for, sample_account, test_settings,
};
pub use test_postgres::TestPostgres;
