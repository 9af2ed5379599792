use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub account_id: String,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
    pub account_id: String,
    #[serde(default = "default_new_status")]
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

fn default_new_status() -> TransactionStatus {
    TransactionStatus::Pending
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub account_id: Option<String>,
    pub status: Option<TransactionStatus>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilters {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub account_id: Option<String>,
    pub category: Option<String>,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub status: Option<TransactionStatus>,
}

impl TransactionFilters {
    pub fn matches(&self, transaction: &Transaction) -> bool {
        self.start_date.is_none_or(|d| transaction.date >= d)
            && self.end_date.is_none_or(|d| transaction.date <= d)
            && self
                .account_id
                .as_deref()
                .is_none_or(|id| transaction.account_id == id)
            && self
                .category
                .as_deref()
                .is_none_or(|c| transaction.category.eq_ignore_ascii_case(c))
            && self.min_amount.is_none_or(|m| transaction.amount >= m)
            && self.max_amount.is_none_or(|m| transaction.amount <= m)
            && self.status.is_none_or(|s| transaction.status == s)
    }
}
