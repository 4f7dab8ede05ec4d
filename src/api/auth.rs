//! Static API-key gate for the generation routes.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, state::AppState, utils::constant_time_eq};

/// Header carrying the server API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests whose `x-api-key` header does not match the configured key
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorized = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|key| constant_time_eq(key.as_bytes(), state.config.server_api_key.as_bytes()));

    if !authorized {
        tracing::warn!(path = %request.uri().path(), "rejected request without a valid api key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(request).await)
}
