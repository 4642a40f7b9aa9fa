use std::sync::Arc;

use axum::body::Body;
use serde::de::DeserializeOwned;

use crate::{Server, error::TtsError};

/// Extractor for JSON relay bodies
///
/// Enforces the JSON content type and the configured body limit. Any
/// rejection is a validation error, so no provider is ever contacted.
pub struct ExtractPayload<T>(pub T);

impl<T: DeserializeOwned> axum::extract::FromRequest<Arc<Server>> for ExtractPayload<T> {
    type Rejection = TtsError;

    async fn from_request(request: http::Request<Body>, server: &Arc<Server>) -> Result<Self, Self::Rejection> {
        let (parts, body) = request.into_parts();

        if !is_json(parts.headers.get(http::header::CONTENT_TYPE)) {
            return Err(TtsError::InvalidRequest(
                "Unsupported Content-Type, expected: 'Content-Type: application/json'".to_string(),
            ));
        }

        let limit = server.body_limit();

        let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
            if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>()) {
                TtsError::PayloadTooLarge(limit)
            } else {
                TtsError::InvalidRequest(format!("Failed to read request body: {err}"))
            }
        })?;

        serde_json::from_slice::<T>(&bytes)
            .map(Self)
            .map_err(|e| TtsError::InvalidRequest(format!("Failed to parse request body: {e}")))
    }
}

/// `application/json`, with or without parameters such as `charset`
fn is_json(content_type: Option<&http::HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}
