//! Response relay strategies
//!
//! Every provider call is relayed by exactly one strategy, picked by what the
//! call is expected to return: audio is streamed through as `audio/mpeg`,
//! JSON is buffered, checked and forwarded with whitelisted headers.

use std::time::Duration;

use axum::{BoxError, body::Body, response::Response};
use bytes::Bytes;
use futures_util::TryStream;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header};

use crate::error::{Result, TtsError, status_failure, upstream_message};

/// How a successful provider response reaches the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relay {
    /// Stream the body through as `audio/mpeg`
    Audio,
    /// Buffer, verify JSON, forward status, body and whitelisted headers
    Json,
}

impl Relay {
    /// Bound on the whole call, headers and body
    ///
    /// Buffered JSON must arrive within `timeout`. Audio has no overall bound
    /// since a long synthesis keeps streaming; the client's per-read timeout
    /// still cuts off a stalled provider.
    pub const fn call_timeout(self, timeout: Duration) -> Option<Duration> {
        match self {
            Self::Audio => None,
            Self::Json => Some(timeout),
        }
    }

    /// Relay a provider response, translating non-success statuses into errors
    pub async fn relay(
        self,
        provider: &'static str,
        response: reqwest::Response,
        forward: &ForwardHeaders,
    ) -> Result<Response> {
        let status = response.status();

        if !status.is_success() {
            return Err(upstream_error(provider, response, forward).await);
        }

        match self {
            Self::Audio => {
                let headers = forward.select(response.headers(), Entity::Drop);
                Ok(audio_response(headers, response.bytes_stream()))
            }
            Self::Json => json_response(provider, response, forward).await,
        }
    }
}

/// Build a streaming `audio/mpeg` response
///
/// The body is pulled from `stream` as the caller reads it; dropping the
/// response drops the stream and with it the provider connection.
pub fn audio_response<S>(headers: HeaderMap, stream: S) -> Response
where
    S: TryStream + Send + 'static,
    S::Ok: Into<Bytes>,
    S::Error: Into<BoxError>,
{
    let mut response = Response::new(Body::from_stream(stream));
    *response.headers_mut() = headers;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    response
}

async fn json_response(
    provider: &'static str,
    response: reqwest::Response,
    forward: &ForwardHeaders,
) -> Result<Response> {
    let status = response.status();
    let mut headers = forward.select(response.headers(), Entity::Keep);

    let body = response.bytes().await.map_err(|e| TtsError::transport(provider, &e.without_url()))?;

    if let Err(e) = serde_json::from_slice::<serde::de::IgnoredAny>(&body) {
        tracing::warn!(provider, error = %e, body_len = body.len(), "provider returned non-JSON success body");
        return Err(TtsError::MalformedResponse {
            provider,
            detail: format!("expected a JSON body: {e}"),
        });
    }

    headers
        .entry(header::CONTENT_TYPE)
        .or_insert_with(|| HeaderValue::from_static("application/json"));

    let mut relayed = Response::new(Body::from(body));
    *relayed.status_mut() = status;
    *relayed.headers_mut() = headers;

    Ok(relayed)
}

async fn upstream_error(provider: &'static str, response: reqwest::Response, forward: &ForwardHeaders) -> TtsError {
    let status = response.status();
    let headers = forward.select(response.headers(), Entity::Drop);

    // an unreadable error body is treated like an empty one
    let body = response.bytes().await.unwrap_or_default();
    let message = upstream_message(&body).unwrap_or_else(|| status_failure(status));

    tracing::warn!(provider, status = status.as_u16(), %message, "provider rejected the request");

    TtsError::Upstream {
        provider,
        status: normalize_status(status),
        message,
        headers,
    }
}

/// Informational and redirect statuses cannot be replayed as an error response
fn normalize_status(status: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() {
        status
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// Whether body-describing headers are copied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    /// The body is forwarded unchanged, so its length and type still hold
    Keep,
    /// The body is replaced or re-framed
    Drop,
}

/// Whitelist of provider response headers copied onto the relayed response
#[derive(Debug, Clone)]
pub struct ForwardHeaders(Vec<HeaderName>);

impl ForwardHeaders {
    /// Build from configured names; matching is case-insensitive
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_ref().trim().as_bytes()).map_err(|e| {
                    tracing::error!(header = name.as_ref(), error = %e, "invalid forwarded header name");
                    TtsError::Internal
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Copy whitelisted headers out of `source`
    pub fn select(&self, source: &HeaderMap, entity: Entity) -> HeaderMap {
        let mut selected = HeaderMap::new();

        for name in &self.0 {
            if entity == Entity::Drop && (name == header::CONTENT_TYPE || name == header::CONTENT_LENGTH) {
                continue;
            }

            for value in source.get_all(name) {
                selected.append(name.clone(), value.clone());
            }
        }

        selected
    }
}
