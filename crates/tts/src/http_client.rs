use std::time::Duration;

use axum::http;
use reqwest::{Client, ClientBuilder};
use url::Url;

use crate::{
    error::{Result, TtsError},
    proxy::display_proxy,
};

/// Outbound HTTP clients
///
/// Direct calls share one pooled client. A proxied call gets a client of its
/// own because the proxy is chosen per request by the caller.
#[derive(Debug, Clone)]
pub struct HttpClients {
    direct: Client,
    timeout: Duration,
}

impl HttpClients {
    pub fn new(timeout: Duration) -> Result<Self> {
        // environment proxies are ignored; routing is decided per request
        let direct = base_builder(timeout).no_proxy().build().map_err(|e| {
            tracing::error!(error = %e, "failed to build HTTP client");
            TtsError::Internal
        })?;

        Ok(Self { direct, timeout })
    }

    /// Client routing through `proxy`, or the shared direct client
    pub fn client(&self, proxy: Option<&Url>) -> Result<Client> {
        let Some(proxy) = proxy else {
            return Ok(self.direct.clone());
        };

        let proxy_config = reqwest::Proxy::all(proxy.as_str())
            .map_err(|e| TtsError::InvalidRequest(format!("Invalid proxy URL: {e}")))?;

        base_builder(self.timeout).proxy(proxy_config).build().map_err(|e| {
            tracing::error!(proxy = %display_proxy(proxy), error = %e, "failed to build proxied HTTP client");
            TtsError::Internal
        })
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

fn base_builder(timeout: Duration) -> ClientBuilder {
    let mut headers = http::HeaderMap::new();
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    // No whole-response timeout here: audio bodies stream for as long as the
    // provider keeps sending. Each connect and each read is bounded instead.
    Client::builder()
        .connect_timeout(timeout)
        .read_timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
}
