use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::{Endpoints, OutboundCall, build_error, endpoint};
use crate::{error::Result, proxy::ProxySelection, relay::Relay, types::GoogleSynthesize};

/// `text:synthesize` body, passed through as the caller shaped it
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: &'a Value,
    voice: &'a Value,
    audio_config: &'a Value,
}

impl OutboundCall for GoogleSynthesize {
    const PROVIDER: &'static str = "Google Cloud TTS";
    const RELAY: Relay = Relay::Json;

    fn proxy(&self) -> &ProxySelection {
        &self.proxy
    }

    fn build(&self, client: &Client, endpoints: &Endpoints) -> Result<reqwest::Request> {
        let mut url = endpoint(&endpoints.google, &["text:synthesize"])?;
        url.query_pairs_mut().append_pair("key", self.api_key.expose_secret());

        let body = SynthesizeRequest {
            input: &self.input,
            voice: &self.voice,
            audio_config: &self.audio_config,
        };

        client
            .post(url)
            .json(&body)
            .build()
            .map_err(|e| build_error(Self::PROVIDER, &e))
    }
}
