use std::fmt::Write as _;

use axum::{
    Json,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TtsError>;

/// Relay errors, each rendered as a client-facing error envelope
#[derive(Debug, Error)]
pub enum TtsError {
    /// One or more required request fields were absent or empty
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    /// Request body could not be used as given
    #[error("{0}")]
    InvalidRequest(String),

    /// Request body exceeded the configured limit
    #[error("Request body is too large, limit is {0} bytes")]
    PayloadTooLarge(usize),

    /// Provider answered with a non-success status
    #[error("{message}")]
    Upstream {
        provider: &'static str,
        status: StatusCode,
        message: String,
        /// Whitelisted provider headers to pass along (retry-after, request ids)
        headers: HeaderMap,
    },

    /// No usable response was received from the provider
    #[error("Failed to reach {provider}")]
    Transport { provider: &'static str, detail: String },

    /// Provider answered 2xx with a body that is not what the relay promised
    #[error("{provider} returned an unreadable response")]
    MalformedResponse { provider: &'static str, detail: String },

    /// Internal failure; details are logged, never returned
    #[error("Internal server error")]
    Internal,
}

impl TtsError {
    /// Build a transport error from any error, keeping its source chain
    pub fn transport(provider: &'static str, err: &(dyn std::error::Error + 'static)) -> Self {
        let detail = error_chain(err);
        tracing::warn!(provider, error = %detail, "provider call did not complete");
        Self::Transport { provider, detail }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameters(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upstream { status, .. } => *status,
            Self::Transport { .. } | Self::MalformedResponse { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Rejected before any provider call was attempted
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingParameters(_) | Self::InvalidRequest(_) | Self::PayloadTooLarge(_)
        )
    }

    /// Text for the envelope's `detail.originalError`
    fn original_error(&self) -> String {
        match self {
            Self::Upstream { status, .. } => status_failure(*status),
            Self::Transport { detail, .. } | Self::MalformedResponse { detail, .. } => detail.clone(),
            Self::MissingParameters(_) | Self::InvalidRequest(_) | Self::PayloadTooLarge(_) | Self::Internal => {
                self.to_string()
            }
        }
    }
}

/// Full error envelope
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    detail: ErrorDetail,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorDetail {
    message: String,
    status: u16,
    original_error: String,
}

/// Envelope for requests rejected before any provider call
#[derive(Debug, Serialize)]
struct ValidationResponse {
    error: String,
}

impl IntoResponse for TtsError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();

        if self.is_validation() {
            return (status, Json(ValidationResponse { error: message })).into_response();
        }

        let body = ErrorResponse {
            error: message.clone(),
            detail: ErrorDetail {
                message,
                status: status.as_u16(),
                original_error: self.original_error(),
            },
        };

        let mut response = (status, Json(body)).into_response();

        if let Self::Upstream { headers, .. } = self {
            response.headers_mut().extend(headers);
        }

        response
    }
}

/// Generic description of a failed status, used when the provider says nothing useful
pub fn status_failure(status: StatusCode) -> String {
    format!("Request failed with status code {}", status.as_u16())
}

/// Pull a human readable message out of a provider error body
///
/// Structured messages win, in the order `detail.message`, `detail`,
/// `error.message`, `error`, `message`. Only a body that is not JSON falls
/// back to its raw text. JSON without such a field and an empty body yield
/// `None`, leaving the caller to use [`status_failure`].
pub fn upstream_message(body: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();

    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(text) {
        Ok(json) => structured_message(&json).map(str::to_string),
        Err(_) => Some(text.to_string()),
    }
}

fn structured_message(json: &Value) -> Option<&str> {
    non_empty(json.pointer("/detail/message"))
        .or_else(|| non_empty(json.get("detail")))
        .or_else(|| non_empty(json.pointer("/error/message")))
        .or_else(|| non_empty(json.get("error")))
        .or_else(|| non_empty(json.get("message")))
}

fn non_empty(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

/// Render an error with every source joined by `: `
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        // reqwest and hyper often repeat the inner message in the outer one
        if !out.contains(&cause_text) {
            let _ = write!(out, ": {cause_text}");
        }
        source = cause.source();
    }

    out
}
