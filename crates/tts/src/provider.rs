pub mod elevenlabs;
pub mod google;
pub mod polly;

use reqwest::Client;
use url::Url;

use crate::{
    error::{Result, TtsError},
    proxy::ProxySelection,
    relay::Relay,
};

/// Provider endpoints and defaults resolved from configuration
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub elevenlabs: Url,
    pub elevenlabs_default_model: String,
    pub google: Url,
}

/// One outbound HTTP call to a provider
///
/// Implementors only describe the request; sending it, proxy routing and
/// relaying the answer are shared by every provider.
pub trait OutboundCall: Send + Sync {
    /// Provider name used in logs and error messages
    const PROVIDER: &'static str;

    /// Strategy used to hand a successful response back to the caller
    const RELAY: Relay;

    /// Routing requested by the caller
    fn proxy(&self) -> &ProxySelection;

    /// Build the provider request, credentials included
    fn build(&self, client: &Client, endpoints: &Endpoints) -> Result<reqwest::Request>;
}

/// Append path segments to a base URL, percent-encoding each one
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();

    url.path_segments_mut()
        .map_err(|()| {
            tracing::error!(%base, "provider base URL cannot carry a path");
            TtsError::Internal
        })?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

/// Map a request-builder failure (bad header value, unserializable body)
pub(crate) fn build_error(provider: &'static str, err: &reqwest::Error) -> TtsError {
    TtsError::InvalidRequest(format!("Could not build {provider} request: {err}"))
}
