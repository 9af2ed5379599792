use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::presentation::error::ApiError;

/// A switchable route group, toggled from `features.*` settings.
#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub name: &'static str,
    pub enabled: bool,
}

impl Feature {
    pub fn new(name: &'static str, enabled: bool) -> Self {
        Self { name, enabled }
    }
}

/// Answers `404 FEATURE_DISABLED` for every request when the feature is off.
pub async fn feature_gate(
    State(feature): State<Feature>,
    request: Request,
    next: Next,
) -> Response {
    if !feature.enabled {
        tracing::debug!(feature = feature.name, "Request to disabled feature");
        return ApiError::feature_disabled(feature.name).into_response();
    }
    next.run(request).await
}
