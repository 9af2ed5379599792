use std::sync::Arc;

use serde::Serialize;
use serde_json::{Value, json};

use crate::application::ports::AccountingCapability;
use crate::domain::{
    AccountBalance, CommandIntent, CommandResult, NewTransaction, ParsedCommand, ReportConfig,
    ReportFormat, ReportPeriod, TransactionFilters, TransactionStatus, TransactionUpdate,
};

use super::{CommandProcessingError, Entities};

const TRANSACTION_ID_KEYS: &[&str] = &["transactionId", "id"];

/// Maps each intent to exactly one accounting call and wraps the outcome.
pub struct CommandDispatcher {
    accounting: Arc<dyn AccountingCapability>,
}

impl CommandDispatcher {
    pub fn new(accounting: Arc<dyn AccountingCapability>) -> Self {
        Self { accounting }
    }

    #[tracing::instrument(skip(self, command), fields(intent = %command.intent))]
    pub async fn execute(
        &self,
        command: ParsedCommand,
    ) -> Result<CommandResult, CommandProcessingError> {
        tracing::info!("Executing command");

        let entities = Entities::new(&command.entities);
        let data = match command.intent {
            CommandIntent::GetTransactions => self.get_transactions(&entities).await?,
            CommandIntent::GetAccountBalance => self.get_account_balance(&entities).await?,
            CommandIntent::CreateTransaction => {
                self.create_transaction(&entities, &command).await?
            }
            CommandIntent::UpdateTransaction => self.update_transaction(&entities).await?,
            CommandIntent::DeleteTransaction => self.delete_transaction(&entities).await?,
            CommandIntent::GenerateReport => self.generate_report(&entities).await?,
            CommandIntent::TaxQuery => {
                tracing::warn!("Rejecting intent without an accounting operation");
                return Err(CommandProcessingError::UnsupportedIntent(command.intent));
            }
        };

        Ok(CommandResult::completed(command, data))
    }

    async fn get_transactions(
        &self,
        entities: &Entities<'_>,
    ) -> Result<Value, CommandProcessingError> {
        let filters = TransactionFilters {
            start_date: entities.optional_date("startDate")?,
            end_date: entities.optional_date("endDate")?,
            account_id: entities.optional_str("accountId")?,
            category: entities.optional_str("category")?,
            min_amount: entities.optional_amount("minAmount")?,
            max_amount: entities.optional_amount("maxAmount")?,
            status: entities.optional_enum::<TransactionStatus>(&["status"])?,
        };
        if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
            if start > end {
                return Err(CommandProcessingError::invalid_entity(
                    "startDate",
                    "must not be after endDate",
                ));
            }
        }
        if let (Some(min), Some(max)) = (filters.min_amount, filters.max_amount) {
            if min > max {
                return Err(CommandProcessingError::invalid_entity(
                    "minAmount",
                    "must not exceed maxAmount",
                ));
            }
        }

        let transactions = self.accounting.list_transactions(&filters).await?;
        to_data(&transactions)
    }

    async fn get_account_balance(
        &self,
        entities: &Entities<'_>,
    ) -> Result<Value, CommandProcessingError> {
        let account_id = entities.required_str(&["accountId"])?;

        let account = self.accounting.get_account(&account_id).await?;
        to_data(&AccountBalance::from(account))
    }

    async fn create_transaction(
        &self,
        entities: &Entities<'_>,
        command: &ParsedCommand,
    ) -> Result<Value, CommandProcessingError> {
        let transaction = NewTransaction {
            transaction_type: entities.required_enum(&["type", "transactionType"])?,
            amount: positive_amount(entities.required_amount("amount")?)?,
            description: entities
                .optional_str("description")?
                .unwrap_or_else(|| command.original_text.clone()),
            category: entities
                .optional_str("category")?
                .unwrap_or_else(|| "uncategorized".to_string()),
            date: entities
                .optional_date("date")?
                .unwrap_or_else(|| command.context.timestamp.date_naive()),
            account_id: entities.required_str(&["accountId"])?,
            status: entities
                .optional_enum(&["status"])?
                .unwrap_or(TransactionStatus::Pending),
            metadata: entities.optional_object("metadata"),
        };

        let created = self.accounting.create_transaction(transaction).await?;
        to_data(&created)
    }

    async fn update_transaction(
        &self,
        entities: &Entities<'_>,
    ) -> Result<Value, CommandProcessingError> {
        let id = entities.required_str(TRANSACTION_ID_KEYS)?;
        let update = TransactionUpdate {
            transaction_type: entities.optional_enum(&["type", "transactionType"])?,
            amount: entities
                .optional_amount("amount")?
                .map(positive_amount)
                .transpose()?,
            description: entities.optional_str("description")?,
            category: entities.optional_str("category")?,
            date: entities.optional_date("date")?,
            account_id: entities.optional_str("accountId")?,
            status: entities.optional_enum(&["status"])?,
        };
        if update.is_empty() {
            return Err(CommandProcessingError::invalid_entity(
                "transactionId",
                "no fields to update",
            ));
        }

        let updated = self.accounting.update_transaction(&id, update).await?;
        to_data(&updated)
    }

    async fn delete_transaction(
        &self,
        entities: &Entities<'_>,
    ) -> Result<Value, CommandProcessingError> {
        let id = entities.required_str(TRANSACTION_ID_KEYS)?;

        self.accounting.delete_transaction(&id).await?;
        Ok(json!({ "transactionId": id, "deleted": true }))
    }

    async fn generate_report(
        &self,
        entities: &Entities<'_>,
    ) -> Result<Value, CommandProcessingError> {
        let period = ReportPeriod {
            start: entities.required_date("startDate")?,
            end: entities.required_date("endDate")?,
        };
        if period.start > period.end {
            return Err(CommandProcessingError::invalid_entity(
                "startDate",
                "must not be after endDate",
            ));
        }
        let config = ReportConfig {
            report_type: entities.required_enum(&["reportType", "type"])?,
            period,
            format: entities
                .optional_enum(&["format"])?
                .unwrap_or(ReportFormat::Json),
            filters: entities.optional_object("filters"),
        };

        let report = self.accounting.generate_report(&config).await?;
        to_data(&report)
    }
}

fn positive_amount(amount: f64) -> Result<f64, CommandProcessingError> {
    if amount <= 0.0 {
        return Err(CommandProcessingError::invalid_entity(
            "amount",
            "must be a positive number",
        ));
    }
    Ok(amount)
}

fn to_data<T: Serialize>(value: &T) -> Result<Value, CommandProcessingError> {
    Ok(serde_json::to_value(value)?)
}
