use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::application::ports::{DateRange, HistoryQuery, Pagination};
use crate::domain::{CommandContext, CommandHistoryEntry, CommandResult};
use crate::infrastructure::observability::sanitize_command_text;
use crate::presentation::error::ApiError;
use crate::presentation::extract::{ApiResponse, json_body, query_params, require_non_empty};
use crate::presentation::state::AppState;

pub const MAX_COMMAND_CHARS: usize = 1000;
const DEFAULT_AUDIO_FILE_NAME: &str = "audio.wav";

#[derive(Deserialize)]
pub struct ProcessCommandRequest {
    pub text: String,
    pub context: CommandContext,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsParams {
    pub user_id: Option<String>,
    pub context: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    pub user_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[tracing::instrument(skip(state, payload))]
pub async fn process_command_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProcessCommandRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CommandResult>>, ApiError> {
    let request = json_body(payload)?;
    require_non_empty("text", &request.text)?;
    require_non_empty("context.userId", &request.context.user_id)?;
    require_non_empty("context.sessionId", &request.context.session_id)?;
    if request.text.chars().count() > MAX_COMMAND_CHARS {
        return Err(ApiError::validation(format!(
            "`text` must be at most {} characters",
            MAX_COMMAND_CHARS
        )));
    }

    tracing::info!(text = %sanitize_command_text(&request.text), "Text command received");

    let result = state
        .command_processor
        .process_text(&request.text, request.context)
        .await?;

    Ok(ApiResponse::ok(result))
}

#[tracing::instrument(skip(state, multipart))]
pub async fn voice_command_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<CommandResult>>, ApiError> {
    let mut multipart = multipart
        .map_err(|e| ApiError::validation(format!("Expected a multipart body: {}", e)))?;

    let mut audio = None;
    let mut audio_fields = 0usize;
    let mut metadata = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Failed to read multipart: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                audio_fields += 1;
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_AUDIO_FILE_NAME)
                    .to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::validation(format!("Failed to read audio file: {}", e))
                })?;
                audio = Some((file_name, data));
            }
            Some("metadata") => {
                let raw = field.text().await.map_err(|e| {
                    ApiError::validation(format!("Failed to read metadata: {}", e))
                })?;
                metadata = parse_metadata(&raw)?;
            }
            _ => {}
        }
    }

    if audio_fields > 1 {
        return Err(ApiError::validation("Only one audio file may be uploaded"));
    }
    let Some((file_name, data)) = audio else {
        return Err(ApiError::validation("Audio file is required"));
    };
    if data.is_empty() {
        return Err(ApiError::validation("Audio file is empty"));
    }

    tracing::info!(file_name = %file_name, bytes = data.len(), "Voice command received");

    let result = state
        .command_processor
        .process_voice(&data, &file_name, metadata)
        .await?;

    Ok(ApiResponse::ok(result))
}

#[tracing::instrument(skip(state, params))]
pub async fn suggestions_handler(
    State(state): State<AppState>,
    params: Result<Query<SuggestionsParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let params = query_params(params)?;
    let user_id = required_user_id(params.user_id)?;
    let limit = params
        .limit
        .unwrap_or(state.settings.commands.default_suggestion_limit);

    let suggestions = state
        .command_processor
        .suggestions(&user_id, params.context.as_deref(), limit)
        .await?;

    Ok(ApiResponse::ok(suggestions))
}

#[tracing::instrument(skip(state, params))]
pub async fn history_handler(
    State(state): State<AppState>,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<CommandHistoryEntry>>>, ApiError> {
    let params = query_params(params)?;
    let user_id = required_user_id(params.user_id)?;

    let date_range = DateRange {
        start: params
            .start_date
            .as_deref()
            .map(|s| parse_bound("startDate", s, NaiveTime::MIN))
            .transpose()?,
        end: params
            .end_date
            .as_deref()
            .map(|s| parse_bound("endDate", s, end_of_day()))
            .transpose()?,
    };
    if let (Some(start), Some(end)) = (date_range.start, date_range.end) {
        if start > end {
            return Err(ApiError::validation("`startDate` must not be after `endDate`"));
        }
    }

    let query = HistoryQuery {
        user_id,
        date_range,
        pagination: Pagination::new(params.limit, params.offset),
    };
    let entries = state.command_processor.history(&query).await?;

    Ok(ApiResponse::ok(entries))
}

fn required_user_id(user_id: Option<String>) -> Result<String, ApiError> {
    let user_id = user_id.unwrap_or_default();
    require_non_empty("userId", &user_id)?;
    Ok(user_id.trim().to_string())
}

fn parse_metadata(raw: &str) -> Result<Option<Map<String, Value>>, ApiError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(ApiError::validation("`metadata` must be a JSON object")),
        Err(e) => Err(ApiError::validation(format!(
            "`metadata` is not valid JSON: {}",
            e
        ))),
    }
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD`, which is pinned to `time_of_day` UTC.
fn parse_bound(field: &str, value: &str, time_of_day: NaiveTime) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(time_of_day).and_utc())
        })
        .ok_or_else(|| ApiError::validation(format!("`{}` is not a valid date: {}", field, value)))
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}
