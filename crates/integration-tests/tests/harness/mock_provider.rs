//! Mock TTS provider for integration tests
//!
//! Answers every request with one canned response and records what it
//! received. Because routing is by path only, the same server also works as
//! a plain HTTP forward proxy: absolute-form requests sent through it are
//! answered directly and marked as proxied.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::response::Response;
use bytes::Bytes;
use futures_util::StreamExt;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

/// Response the mock returns for every request
#[derive(Clone)]
pub struct Canned {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    delay: Option<Duration>,
    chunk_interval: Option<Duration>,
}

impl Canned {
    /// `200 audio/mpeg` with the given bytes
    pub fn audio(bytes: &[u8]) -> Self {
        Self::raw(StatusCode::OK, "audio/mpeg", Bytes::copy_from_slice(bytes))
    }

    /// JSON body with the given status
    pub fn json(status: StatusCode, body: &Value) -> Self {
        Self::raw(status, "application/json", Bytes::from(body.to_string()))
    }

    /// Plain-text body with the given status
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::raw(status, "text/plain", Bytes::from(body.to_owned()))
    }

    /// Status only, no body
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            delay: None,
            chunk_interval: None,
        }
    }

    fn raw(status: StatusCode, content_type: &'static str, body: Bytes) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Self {
            status,
            headers,
            body,
            delay: None,
            chunk_interval: None,
        }
    }

    /// Add a response header
    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers
            .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        self
    }

    /// Wait before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Send the body one byte at a time, pausing `interval` before each byte
    pub fn with_chunk_interval(mut self, interval: Duration) -> Self {
        self.chunk_interval = Some(interval);
        self
    }
}

/// One request as the mock saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    /// Path exactly as received, percent-encoding intact
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
    /// The request arrived in absolute form, i.e. through a proxy
    pub proxied: bool,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("recorded body is JSON")
    }

    /// Decoded value of a query parameter
    pub fn query_param(&self, name: &str) -> Option<String> {
        let url = reqwest::Url::parse(&format!("http://mock{}?{}", self.path, self.query.as_deref()?)).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

struct MockState {
    canned: Canned,
    requests: Mutex<Vec<Recorded>>,
}

/// Mock provider that answers every request with the same canned response
pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

impl MockProvider {
    /// Start the mock server, returning immediately
    pub async fn start(canned: Canned) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            canned,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as an ElevenLabs or Google endpoint
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Root URL, used as a Polly endpoint override or as a proxy URL
    pub fn root_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of requests received
    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// Number of requests received in absolute form
    pub fn proxied_count(&self) -> usize {
        self.requests().iter().filter(|request| request.proxied).count()
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().expect("mock state poisoned").clone()
    }

    /// Most recent request
    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("mock received no request")
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle(State(state): State<Arc<MockState>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    state.requests.lock().expect("mock state poisoned").push(Recorded {
        method: parts.method,
        path: parts.uri.path().to_owned(),
        query: parts.uri.query().map(str::to_owned),
        proxied: parts.uri.authority().is_some(),
        headers: parts.headers,
        body,
    });

    let canned = state.canned.clone();

    if let Some(delay) = canned.delay {
        tokio::time::sleep(delay).await;
    }

    let body = match canned.chunk_interval {
        Some(interval) => trickle(canned.body, interval),
        None => Body::from(canned.body),
    };

    let mut response = Response::new(body);
    *response.status_mut() = canned.status;
    *response.headers_mut() = canned.headers;
    response
}

fn trickle(body: Bytes, interval: Duration) -> Body {
    let chunks = (0..body.len()).map(move |i| body.slice(i..=i));

    Body::from_stream(futures_util::stream::iter(chunks).then(move |chunk| async move {
        tokio::time::sleep(interval).await;
        Ok::<_, std::convert::Infallible>(chunk)
    }))
}
