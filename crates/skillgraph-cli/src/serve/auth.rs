//! Bearer-key check for write endpoints.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::error::ApiError;
use super::AppState;

/// Rejects requests without `Authorization: Bearer <key>` (401) or with the
/// wrong key (403).
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(rejection) = check_bearer(request.headers(), &state.api_key) {
        return rejection.into_response();
    }
    next.run(request).await
}

fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<(), ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    if token != expected {
        return Err(ApiError::Forbidden("Invalid API key".to_string()));
    }
    Ok(())
}
