use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use crate::domain::{
    Account, AccountBalance, AccountUpdate, NewAccount, Transaction, TransactionFilters,
};
use crate::presentation::error::ApiError;
use crate::presentation::extract::{ApiResponse, json_body, require_non_empty};
use crate::presentation::state::AppState;

pub async fn list_accounts_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Account>>>, ApiError> {
    let accounts = state.accounting.list_accounts().await?;
    Ok(ApiResponse::ok(accounts))
}

pub async fn get_account_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let account = state.accounting.get_account(&id).await?;
    Ok(ApiResponse::ok(account))
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_account_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewAccount>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Account>>), ApiError> {
    let new_account = json_body(payload)?;
    require_non_empty("name", &new_account.name)?;
    require_currency(&new_account.currency)?;

    let account = state.accounting.create_account(new_account).await?;
    tracing::info!(account_id = %account.id, "Account created");

    Ok((StatusCode::CREATED, ApiResponse::ok(account)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn update_account_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AccountUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<Account>>, ApiError> {
    let update = json_body(payload)?;
    if update == AccountUpdate::default() {
        return Err(ApiError::validation("At least one field must be updated"));
    }
    if let Some(name) = &update.name {
        require_non_empty("name", name)?;
    }
    if let Some(currency) = &update.currency {
        require_currency(currency)?;
    }

    let account = state.accounting.update_account(&id, update).await?;
    Ok(ApiResponse::ok(account))
}

#[tracing::instrument(skip(state))]
pub async fn delete_account_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.accounting.delete_account(&id).await?;
    tracing::info!(account_id = %id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn account_transactions_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    // 404 for an unknown account rather than an empty list
    state.accounting.get_account(&id).await?;

    let filters = TransactionFilters {
        account_id: Some(id),
        ..TransactionFilters::default()
    };
    let transactions = state.accounting.list_transactions(&filters).await?;
    Ok(ApiResponse::ok(transactions))
}

pub async fn account_balance_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<AccountBalance>>, ApiError> {
    let account = state.accounting.get_account(&id).await?;
    Ok(ApiResponse::ok(AccountBalance::from(account)))
}

fn require_currency(currency: &str) -> Result<(), ApiError> {
    let currency = currency.trim();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ApiError::validation(
            "`currency` must be a three-letter ISO 4217 code",
        ));
    }
    Ok(())
}
