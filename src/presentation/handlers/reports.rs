use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::domain::{Report, ReportConfig};
use crate::presentation::error::ApiError;
use crate::presentation::extract::{ApiResponse, json_body};
use crate::presentation::state::AppState;

#[tracing::instrument(skip(state, payload))]
pub async fn generate_report_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportConfig>, JsonRejection>,
) -> Result<Json<ApiResponse<Report>>, ApiError> {
    let config = json_body(payload)?;
    if config.period.start > config.period.end {
        return Err(ApiError::validation(
            "`period.start` must not be after `period.end`",
        ));
    }

    let report = state.accounting.generate_report(&config).await?;
    Ok(ApiResponse::ok(report))
}
