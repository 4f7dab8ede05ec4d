#[cfg(feature = "api")]
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Main error type for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or wrong `x-api-key` header
    #[error("Unauthorized")]
    Unauthorized,

    /// An upstream API answered with a non-2xx status
    #[error("{service} returned {status}: {message}")]
    Upstream {
        /// Which upstream service failed.
        service: &'static str,
        /// The HTTP status it answered with.
        status: u16,
        /// The message it supplied, or its raw body.
        message: String,
    },

    /// A generation job reached the `FAILURE` status
    #[error("Failure to generate image: {reason}")]
    JobFailed {
        /// The upstream job id.
        job_id: String,
        /// The error message reported by the upstream API.
        reason: String,
    },

    /// A generation job was still pending after the last allowed poll
    #[error("Job {job_id} still pending after {attempts} polls")]
    PollTimeout {
        /// The upstream job id.
        job_id: String,
        /// Number of status polls issued.
        attempts: u32,
    },

    /// Transport-level HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding and encoding errors
    #[cfg(feature = "watermark")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Country list parsing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error body returned for everything except authentication failures
#[derive(Serialize)]
#[derive(Debug)]
pub struct ErrorResponse {
    /// Human readable error message
    pub error: String,
}

/// Error body returned by the API-key gate
#[derive(Serialize)]
#[derive(Debug)]
pub struct UnauthorizedResponse {
    /// Always `"Unauthorized"`
    pub message: &'static str,
}

impl AppError {
    /// Shorthand for an [`AppError::Upstream`] value
    pub fn upstream(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            service,
            status,
            message: message.into(),
        }
    }

    #[cfg(feature = "api")]
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert the error to its JSON body
    pub fn to_json(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

#[cfg(feature = "api")]
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            Self::Unauthorized => {
                (status, Json(UnauthorizedResponse { message: "Unauthorized" })).into_response()
            }
            other => {
                tracing::error!(status = status.as_u16(), error = %other, "request failed");
                (status, Json(other.to_json())).into_response()
            }
        }
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Task join error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Extension trait for working with Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error if the result is an error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| AppError::Internal(format!("{}: {}", context, e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let context = f();
            AppError::Internal(format!("{}: {}", context, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_failure_message_embeds_upstream_reason() {
        let err = AppError::JobFailed {
            job_id: "abc".to_string(),
            reason: "face not detected".to_string(),
        };
        assert_eq!(err.to_json().error, "Failure to generate image: face not detected");
    }

    #[test]
    fn upstream_message_names_service_and_status() {
        let err = AppError::upstream("generation", 502, "bad gateway");
        assert_eq!(err.to_string(), "generation returned 502: bad gateway");
    }

    #[cfg(feature = "api")]
    #[test]
    fn status_codes() {
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::PollTimeout { job_id: "x".into(), attempts: 3 }.status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::upstream("fulfillment", 404, "nope").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::InvalidInput("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn context_wraps_as_internal() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        let err = res.context("reading watermark").unwrap_err();
        assert!(matches!(err, AppError::Internal(ref m) if m == "reading watermark: boom"));
    }
}
