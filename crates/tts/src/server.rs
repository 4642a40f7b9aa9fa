use axum::response::Response;
use url::Url;
use voxrelay_config::RelayConfig;

use crate::{
    error::{Result, TtsError},
    http_client::HttpClients,
    provider::{
        Endpoints, OutboundCall,
        polly::{self, PollySettings},
    },
    proxy::{ProxySelection, display_proxy},
    relay::ForwardHeaders,
    types::PollySpeech,
};

/// Relay state shared by all handlers
///
/// Holds only configuration and pooled connections. Credentials and proxy
/// choices arrive with each request and are never stored here.
pub struct Server {
    clients: HttpClients,
    endpoints: Endpoints,
    forward_headers: ForwardHeaders,
    polly: PollySettings,
    body_limit: usize,
}

impl Server {
    /// Send one outbound call and relay the provider's answer
    ///
    /// validate (already done by the caller) → select proxy → call → relay.
    /// Nothing is retried.
    pub async fn relay<C: OutboundCall>(&self, call: &C) -> Result<Response> {
        let proxy = choose_proxy(call.proxy());
        let client = self.clients.client(proxy.as_ref())?;
        let mut request = call.build(&client, &self.endpoints)?;

        *request.timeout_mut() = C::RELAY.call_timeout(self.clients.timeout());

        tracing::info!(
            provider = C::PROVIDER,
            method = %request.method(),
            path = request.url().path(),
            proxy = proxy.as_ref().map_or_else(|| "none".to_string(), display_proxy),
            "calling provider"
        );

        let response = client
            .execute(request)
            .await
            // request URLs may carry the caller's key in the query
            .map_err(|e| TtsError::transport(C::PROVIDER, &e.without_url()))?;

        tracing::debug!(provider = C::PROVIDER, status = response.status().as_u16(), "provider responded");

        C::RELAY.relay(C::PROVIDER, response, &self.forward_headers).await
    }

    /// Synthesize through Amazon Polly
    pub async fn synthesize_polly(&self, speech: PollySpeech) -> Result<Response> {
        polly::synthesize(speech, &self.polly).await
    }

    pub const fn body_limit(&self) -> usize {
        self.body_limit
    }
}

/// Pick this request's proxy with the thread-local RNG
fn choose_proxy(selection: &ProxySelection) -> Option<Url> {
    selection.choose(&mut rand::rng()).cloned()
}

/// Builder for constructing the relay server from configuration
pub struct TtsServerBuilder<'a> {
    config: &'a RelayConfig,
}

impl<'a> TtsServerBuilder<'a> {
    pub const fn new(config: &'a RelayConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Result<Server> {
        let timeout = self.config.timeout_duration().map_err(|e| {
            tracing::error!(error = %e, "invalid relay timeout");
            TtsError::Internal
        })?;

        let clients = HttpClients::new(timeout)?;
        let forward_headers = ForwardHeaders::new(&self.config.forward_headers)?;

        let endpoints = Endpoints {
            elevenlabs: self.config.elevenlabs.base_url.clone(),
            elevenlabs_default_model: self.config.elevenlabs.default_model.clone(),
            google: self.config.google.base_url.clone(),
        };

        tracing::debug!(
            elevenlabs = %endpoints.elevenlabs,
            google = %endpoints.google,
            polly_endpoint = self.config.amazon.endpoint_url.as_ref().map_or("regional", Url::as_str),
            timeout_secs = timeout.as_secs(),
            "relay initialized"
        );

        Ok(Server {
            polly: PollySettings {
                endpoint_url: self.config.amazon.endpoint_url.clone(),
                timeout: clients.timeout(),
            },
            clients,
            endpoints,
            forward_headers,
            body_limit: self.config.body_limit,
        })
    }
}
