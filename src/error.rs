use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use std::path::PathBuf;
use std::time::Duration;

/// Whether a rejected delivery is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// The endpoint is gone or invalid and should be evicted.
    Permanent,
    /// Network trouble, timeouts and gateway errors.
    Transient,
    /// The gateway refused this message. The endpoint is fine, but sending
    /// the same bytes again will fail the same way.
    Rejected,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Permanent => f.write_str("permanent"),
            FailureKind::Transient => f.write_str("transient"),
            FailureKind::Rejected => f.write_str("rejected"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} transport failure: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Permanent,
            message: message.into(),
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transient,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Rejected,
            message: message.into(),
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self::transient(format!("no acknowledgment within {}ms", after.as_millis()))
    }

    pub fn is_permanent(&self) -> bool {
        self.kind == FailureKind::Permanent
    }

    pub fn is_retryable(&self) -> bool {
        self.kind == FailureKind::Transient
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("subscription not found")]
    NotFound,

    #[error("push transport rejected message: {0}")]
    TransportRejected(#[from] TransportError),

    #[error("payload of {size} bytes exceeds the {limit} byte push limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

impl DispatchError {
    /// True only for transport rejections that mark the endpoint as gone.
    pub fn is_permanent(&self) -> bool {
        matches!(self, DispatchError::TransportRejected(err) if err.is_permanent())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid utc offset '{0}'; expected +HH:MM or -HH:MM")]
    InvalidOffset(String),

    #[error("send timeout must be greater than 0")]
    InvalidTimeout,

    #[error("max payload bytes must be between 1 and {max}, got {got}")]
    InvalidPayloadLimit { got: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("network unavailable: {0}")]
pub struct NetworkError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("notification display failed: {0}")]
pub struct DisplayError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("window client operation failed: {0}")]
pub struct WindowError(pub String);

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Push notifications are not configured.")]
    PushUnavailable,

    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NotFound => AppError::NotFound("Subscription not found".to_string()),
            DispatchError::PayloadTooLarge { .. } => AppError::BadRequest(err.to_string()),
            other => AppError::Delivery(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PushUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Delivery(msg) => {
                tracing::error!("Error sending notification: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send notification".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
