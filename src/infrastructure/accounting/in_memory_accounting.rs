use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::application::ports::{AccountingCapability, AccountingError};
use crate::domain::{
    Account, AccountUpdate, NewAccount, NewTransaction, Report, ReportConfig, Transaction,
    TransactionFilters, TransactionUpdate,
};

/// Process-local accounting backend for development and tests.
///
/// Balances are stored as given; transactions do not move them.
#[derive(Default)]
pub struct InMemoryAccounting {
    state: RwLock<Ledger>,
}

#[derive(Default)]
struct Ledger {
    accounts: HashMap<String, Account>,
    transactions: HashMap<String, Transaction>,
}

impl InMemoryAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts.into_iter().map(|a| (a.id.clone(), a)).collect();
        Self {
            state: RwLock::new(Ledger {
                accounts,
                transactions: HashMap::new(),
            }),
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn account_not_found(id: &str) -> AccountingError {
    AccountingError::NotFound(format!("account {}", id))
}

fn transaction_not_found(id: &str) -> AccountingError {
    AccountingError::NotFound(format!("transaction {}", id))
}

#[async_trait]
impl AccountingCapability for InMemoryAccounting {
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountingError> {
        let state = self.state.read().await;
        let mut accounts: Vec<Account> = state.accounts.values().cloned().collect();
        accounts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(accounts)
    }

    async fn get_account(&self, id: &str) -> Result<Account, AccountingError> {
        self.state
            .read()
            .await
            .accounts
            .get(id)
            .cloned()
            .ok_or_else(|| account_not_found(id))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountingError> {
        let now = Utc::now();
        let created = Account {
            id: new_id(),
            name: account.name,
            account_type: account.account_type,
            balance: account.balance,
            currency: account.currency.trim().to_uppercase(),
            created_at: now,
            updated_at: now,
            last_updated: now.to_rfc3339(),
        };

        self.state
            .write()
            .await
            .accounts
            .insert(created.id.clone(), created.clone());
        tracing::debug!(account_id = %created.id, "Account created");
        Ok(created)
    }

    async fn update_account(
        &self,
        id: &str,
        update: AccountUpdate,
    ) -> Result<Account, AccountingError> {
        let mut state = self.state.write().await;
        let account = state
            .accounts
            .get_mut(id)
            .ok_or_else(|| account_not_found(id))?;

        let now = Utc::now();
        if let Some(name) = update.name {
            account.name = name;
        }
        if let Some(account_type) = update.account_type {
            account.account_type = account_type;
        }
        if let Some(balance) = update.balance {
            account.balance = balance;
            account.last_updated = now.to_rfc3339();
        }
        if let Some(currency) = update.currency {
            account.currency = currency.trim().to_uppercase();
        }
        account.updated_at = now;

        Ok(account.clone())
    }

    async fn delete_account(&self, id: &str) -> Result<(), AccountingError> {
        let mut state = self.state.write().await;
        if state.transactions.values().any(|t| t.account_id == id) {
            return Err(AccountingError::InvalidRequest(format!(
                "account {} still has transactions",
                id
            )));
        }
        state
            .accounts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| account_not_found(id))
    }

    async fn list_transactions(
        &self,
        filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>, AccountingError> {
        let state = self.state.read().await;
        let mut transactions: Vec<Transaction> = state
            .transactions
            .values()
            .filter(|t| filters.matches(t))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(transactions)
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction, AccountingError> {
        self.state
            .read()
            .await
            .transactions
            .get(id)
            .cloned()
            .ok_or_else(|| transaction_not_found(id))
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AccountingError> {
        let mut state = self.state.write().await;
        if !state.accounts.contains_key(&transaction.account_id) {
            return Err(account_not_found(&transaction.account_id));
        }

        let now = Utc::now();
        let created = Transaction {
            id: new_id(),
            transaction_type: transaction.transaction_type,
            amount: transaction.amount,
            description: transaction.description,
            category: transaction.category,
            date: transaction.date,
            account_id: transaction.account_id,
            status: transaction.status,
            metadata: transaction.metadata,
            created_at: now,
            updated_at: now,
        };
        state
            .transactions
            .insert(created.id.clone(), created.clone());
        tracing::debug!(transaction_id = %created.id, "Transaction created");
        Ok(created)
    }

    async fn update_transaction(
        &self,
        id: &str,
        update: TransactionUpdate,
    ) -> Result<Transaction, AccountingError> {
        let mut state = self.state.write().await;
        if let Some(account_id) = update.account_id.as_deref() {
            if !state.accounts.contains_key(account_id) {
                return Err(account_not_found(account_id));
            }
        }
        let transaction = state
            .transactions
            .get_mut(id)
            .ok_or_else(|| transaction_not_found(id))?;

        if let Some(kind) = update.transaction_type {
            transaction.transaction_type = kind;
        }
        if let Some(amount) = update.amount {
            transaction.amount = amount;
        }
        if let Some(description) = update.description {
            transaction.description = description;
        }
        if let Some(category) = update.category {
            transaction.category = category;
        }
        if let Some(date) = update.date {
            transaction.date = date;
        }
        if let Some(account_id) = update.account_id {
            transaction.account_id = account_id;
        }
        if let Some(status) = update.status {
            transaction.status = status;
        }
        transaction.updated_at = Utc::now();

        Ok(transaction.clone())
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), AccountingError> {
        self.state
            .write()
            .await
            .transactions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| transaction_not_found(id))
    }

    async fn categorize_transaction(
        &self,
        id: &str,
        category: &str,
    ) -> Result<Transaction, AccountingError> {
        self.update_transaction(
            id,
            TransactionUpdate {
                category: Some(category.to_string()),
                ..TransactionUpdate::default()
            },
        )
        .await
    }

    async fn generate_report(&self, _config: &ReportConfig) -> Result<Report, AccountingError> {
        Err(AccountingError::NotImplemented("generate_report"))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{AccountType, TransactionStatus, TransactionType};

    fn checking() -> NewAccount {
        NewAccount {
            name: "Operating".to_string(),
            account_type: AccountType::Checking,
            balance: 100.0,
            currency: "usd".to_string(),
        }
    }

    fn expense(account_id: &str, amount: f64, day: u32) -> NewTransaction {
        NewTransaction {
            transaction_type: TransactionType::Expense,
            amount,
            description: "Supplies".to_string(),
            category: "office".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            account_id: account_id.to_string(),
            status: TransactionStatus::Pending,
            metadata: None,
        }
    }

    #[tokio::test]
    async fn given_created_account_when_fetching_then_currency_is_normalized() {
        let ledger = InMemoryAccounting::new();
        let created = ledger.create_account(checking()).await.unwrap();

        let fetched = ledger.get_account(&created.id).await.unwrap();

        assert_eq!(fetched.currency, "USD");
        assert_eq!(fetched.balance, 100.0);
    }

    #[tokio::test]
    async fn given_padded_currency_when_creating_and_updating_then_stored_trimmed() {
        let ledger = InMemoryAccounting::new();
        let created = ledger
            .create_account(NewAccount {
                currency: " usd ".to_string(),
                ..checking()
            })
            .await
            .unwrap();
        assert_eq!(created.currency, "USD");

        let updated = ledger
            .update_account(
                &created.id,
                AccountUpdate {
                    currency: Some(" eur\n".to_string()),
                    ..AccountUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.currency, "EUR");
    }

    #[tokio::test]
    async fn given_unknown_account_when_creating_transaction_then_not_found() {
        let ledger = InMemoryAccounting::new();

        let result = ledger.create_transaction(expense("missing", 5.0, 1)).await;

        assert!(matches!(result, Err(AccountingError::NotFound(_))));
    }

    #[tokio::test]
    async fn given_transactions_when_filtering_by_amount_then_newest_first() {
        let ledger = InMemoryAccounting::new();
        let account = ledger.create_account(checking()).await.unwrap();
        ledger.create_transaction(expense(&account.id, 5.0, 1)).await.unwrap();
        ledger.create_transaction(expense(&account.id, 50.0, 2)).await.unwrap();
        ledger.create_transaction(expense(&account.id, 80.0, 3)).await.unwrap();

        let filters = TransactionFilters {
            min_amount: Some(10.0),
            ..TransactionFilters::default()
        };
        let found = ledger.list_transactions(&filters).await.unwrap();

        let amounts: Vec<f64> = found.iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![80.0, 50.0]);
    }

    #[tokio::test]
    async fn given_account_with_transactions_when_deleting_then_rejected() {
        let ledger = InMemoryAccounting::new();
        let account = ledger.create_account(checking()).await.unwrap();
        ledger.create_transaction(expense(&account.id, 5.0, 1)).await.unwrap();

        let result = ledger.delete_account(&account.id).await;

        assert!(matches!(result, Err(AccountingError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn given_transaction_when_categorizing_then_only_category_changes() {
        let ledger = InMemoryAccounting::new();
        let account = ledger.create_account(checking()).await.unwrap();
        let created = ledger
            .create_transaction(expense(&account.id, 5.0, 1))
            .await
            .unwrap();

        let updated = ledger
            .categorize_transaction(&created.id, "travel")
            .await
            .unwrap();

        assert_eq!(updated.category, "travel");
        assert_eq!(updated.amount, created.amount);
    }
}
