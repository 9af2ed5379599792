use axum::extract::Request;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::presentation::error::ApiError;

/// Rejects requests without an `Authorization` header.
///
/// Credentials are not verified yet; the header only has to be present.
pub async fn require_auth(request: Request, next: Next) -> Response {
    let present = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| !v.trim().is_empty());

    if !present {
        return ApiError::unauthorized().into_response();
    }

    next.run(request).await
}
