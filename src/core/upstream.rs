//! Shared handling of upstream HTTP responses

#[cfg(feature = "watermark")]
use bytes::Bytes;
use serde_json::Value;

use crate::error::{AppError, Result};

/// Fields checked, in order, for a human readable error in a JSON body
const MESSAGE_FIELDS: [&str; 3] = ["error", "message", "detail"];

/// Pass a 2xx response through, turn anything else into [`AppError::Upstream`]
pub(crate) async fn ensure_success(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("no response body").to_string());

    tracing::warn!(service, status = status.as_u16(), %message, "upstream call failed");
    Err(AppError::upstream(service, status.as_u16(), message))
}

/// Download a resource, failing on non-2xx
#[cfg(feature = "watermark")]
pub(crate) async fn fetch_bytes(
    http: &reqwest::Client,
    service: &'static str,
    url: &str,
) -> Result<Bytes> {
    let response = http.get(url).send().await?;
    let response = ensure_success(service, response).await?;
    Ok(response.bytes().await?)
}

fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => MESSAGE_FIELDS
            .iter()
            .find_map(|field| match value.get(field) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            })
            .or_else(|| Some(value.to_string())),
        Err(_) => Some(trimmed.to_string()),
    }
}
