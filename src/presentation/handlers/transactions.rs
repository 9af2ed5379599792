use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use crate::domain::{NewTransaction, Transaction, TransactionFilters, TransactionUpdate};
use crate::presentation::error::ApiError;
use crate::presentation::extract::{ApiResponse, json_body, query_params, require_non_empty};
use crate::presentation::state::AppState;

#[derive(Deserialize)]
pub struct CategorizeRequest {
    pub category: String,
}

pub async fn list_transactions_handler(
    State(state): State<AppState>,
    filters: Result<Query<TransactionFilters>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Transaction>>>, ApiError> {
    let filters = query_params(filters)?;
    validate_filters(&filters)?;

    let transactions = state.accounting.list_transactions(&filters).await?;
    Ok(ApiResponse::ok(transactions))
}

pub async fn get_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let transaction = state.accounting.get_transaction(&id).await?;
    Ok(ApiResponse::ok(transaction))
}

#[tracing::instrument(skip(state, payload))]
pub async fn create_transaction_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Transaction>>), ApiError> {
    let new_transaction = json_body(payload)?;
    require_non_empty("accountId", &new_transaction.account_id)?;
    require_non_empty("description", &new_transaction.description)?;
    require_finite_amount(new_transaction.amount)?;

    let transaction = state.accounting.create_transaction(new_transaction).await?;
    tracing::info!(transaction_id = %transaction.id, "Transaction created");

    Ok((StatusCode::CREATED, ApiResponse::ok(transaction)))
}

#[tracing::instrument(skip(state, payload))]
pub async fn update_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TransactionUpdate>, JsonRejection>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let update = json_body(payload)?;
    if update.is_empty() {
        return Err(ApiError::validation("At least one field must be updated"));
    }
    if let Some(amount) = update.amount {
        require_finite_amount(amount)?;
    }

    let transaction = state.accounting.update_transaction(&id, update).await?;
    Ok(ApiResponse::ok(transaction))
}

#[tracing::instrument(skip(state))]
pub async fn delete_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.accounting.delete_transaction(&id).await?;
    tracing::info!(transaction_id = %id, "Transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[tracing::instrument(skip(state, payload))]
pub async fn categorize_transaction_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CategorizeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Transaction>>, ApiError> {
    let request = json_body(payload)?;
    require_non_empty("category", &request.category)?;

    let transaction = state
        .accounting
        .categorize_transaction(&id, request.category.trim())
        .await?;
    Ok(ApiResponse::ok(transaction))
}

fn validate_filters(filters: &TransactionFilters) -> Result<(), ApiError> {
    if let (Some(start), Some(end)) = (filters.start_date, filters.end_date) {
        if start > end {
            return Err(ApiError::validation("`startDate` must not be after `endDate`"));
        }
    }
    if let (Some(min), Some(max)) = (filters.min_amount, filters.max_amount) {
        if min > max {
            return Err(ApiError::validation("`minAmount` must not exceed `maxAmount`"));
        }
    }
    Ok(())
}

fn require_finite_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() {
        return Err(ApiError::validation("`amount` must be a finite number"));
    }
    Ok(())
}
