use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::application::ports::{AccountingError, TranscriptionError};
use crate::application::services::{CommandProcessingError, ParsingError};

#[derive(Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

/// Every failure leaving the HTTP layer, rendered as
/// `{"success": false, "error": {"code", "message", "details"}}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
    retry_after_secs: Option<u64>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
            retry_after_secs: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "UNAUTHORIZED",
            "Authentication required",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn feature_disabled(feature: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "FEATURE_DISABLED",
            format!("The {} feature is currently disabled", feature),
        )
    }

    pub fn rate_limited(retry_after_secs: u64) -> Self {
        let mut error = Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMITED",
            "Too many requests from this client, please try again later",
        );
        error.retry_after_secs = Some(retry_after_secs);
        error
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An unexpected error occurred",
        )
    }

    fn command_processing(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "COMMAND_PROCESSING_ERROR", message)
    }
}

impl From<AccountingError> for ApiError {
    fn from(e: AccountingError) -> Self {
        match &e {
            AccountingError::NotFound(what) => Self::not_found(format!("{} not found", what)),
            AccountingError::InvalidRequest(reason) => Self::validation(reason.clone()),
            AccountingError::NotImplemented(_) | AccountingError::ApiRequestFailed(_) => {
                tracing::error!(error = %e, "Accounting backend failure");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "ACCOUNTING_SOFTWARE_ERROR",
                    e.to_string(),
                )
            }
        }
    }
}

impl From<CommandProcessingError> for ApiError {
    fn from(e: CommandProcessingError) -> Self {
        match e {
            CommandProcessingError::UnsupportedIntent(intent) => Self::new(
                StatusCode::BAD_REQUEST,
                "UNSUPPORTED_INTENT",
                format!("Unsupported command intent: {}", intent),
            )
            .with_details(json!({ "intent": intent })),
            CommandProcessingError::InvalidEntity { field, reason } => {
                Self::command_processing(format!("Invalid `{}`: {}", field, reason))
                    .with_details(json!({ "field": field, "reason": reason }))
            }
            CommandProcessingError::Parsing(ParsingError::Upstream(cause)) => {
                tracing::error!(error = %cause, "Language model unavailable while parsing");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "PARSING_ERROR",
                    format!("Failed to parse command: {}", cause),
                )
            }
            CommandProcessingError::Parsing(cause) => Self::command_processing(cause.to_string()),
            CommandProcessingError::Transcription(TranscriptionError::TranscriptionFailed(
                reason,
            )) => Self::command_processing(format!("Could not transcribe audio: {}", reason)),
            CommandProcessingError::Transcription(cause) => {
                tracing::error!(error = %cause, "Transcription service unavailable");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "TRANSCRIPTION_ERROR",
                    format!("Failed to transcribe audio: {}", cause),
                )
            }
            CommandProcessingError::Accounting(cause) => cause.into(),
            CommandProcessingError::Suggestions(cause) => {
                tracing::error!(error = %cause, "Language model unavailable for suggestions");
                Self::new(
                    StatusCode::SERVICE_UNAVAILABLE,
                    "LANGUAGE_MODEL_ERROR",
                    format!("Failed to generate suggestions: {}", cause),
                )
            }
            CommandProcessingError::Serialization(cause) => {
                tracing::error!(error = %cause, "Failed to serialize command result");
                Self::internal()
            }
            CommandProcessingError::History(cause) => {
                tracing::error!(error = %cause, "Command history store failure");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_client_error() {
            tracing::warn!(
                status = %self.status,
                code = self.code,
                message = %self.message,
                "Request rejected"
            );
        }

        let retry_after = self.retry_after_secs;
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code,
                message: self.message,
                details: self.details,
            },
        };

        let mut response = (self.status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
