use async_trait::async_trait;

use crate::domain::{
    Account, AccountUpdate, NewAccount, NewTransaction, Report, ReportConfig, Transaction,
    TransactionFilters, TransactionUpdate,
};

/// Operations offered by the backing accounting system.
#[async_trait]
pub trait AccountingCapability: Send + Sync {
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountingError>;

    async fn get_account(&self, id: &str) -> Result<Account, AccountingError>;

    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountingError>;

    async fn update_account(
        &self,
        id: &str,
        update: AccountUpdate,
    ) -> Result<Account, AccountingError>;

    async fn delete_account(&self, id: &str) -> Result<(), AccountingError>;

    async fn list_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>, AccountingError>;

    async fn get_transaction(&self, id: &str) -> Result<Transaction, AccountingError>;

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AccountingError>;

    async fn update_transaction(
        &self,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction, AccountingError>;

    async fn delete_transaction(&self, id: &str) -> Result<(), AccountingError>;

    async fn categorize_transaction(
        &self,
        id: &str,
        category: &str,
    ) -> Result<Transaction, AccountingError>;

    async fn generate_report(&self, config: &ReportConfig) -> Result<Report, AccountingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AccountingError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("operation not implemented: {0}")]
    NotImplemented(&'static str),
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
}
