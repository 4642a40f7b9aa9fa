use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

use super::{Endpoints, OutboundCall, build_error, endpoint};
use crate::{
    error::Result,
    proxy::ProxySelection,
    relay::Relay,
    types::{AccountResource, ElevenLabsAccount, ElevenLabsSpeech},
};

const API_KEY_HEADER: &str = "xi-api-key";

#[derive(Serialize)]
struct ElevenLabsRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice_settings: Option<&'a Value>,
}

impl OutboundCall for ElevenLabsSpeech {
    const PROVIDER: &'static str = "ElevenLabs";
    const RELAY: Relay = Relay::Audio;

    fn proxy(&self) -> &ProxySelection {
        &self.proxy
    }

    fn build(&self, client: &Client, endpoints: &Endpoints) -> Result<reqwest::Request> {
        let mut url = endpoint(&endpoints.elevenlabs, &["text-to-speech", &self.voice_id])?;

        if let Some(format) = &self.output_format {
            url.query_pairs_mut().append_pair("output_format", format);
        }

        let model_id = self.model_id.as_deref().unwrap_or(&endpoints.elevenlabs_default_model);

        tracing::debug!(
            voice_id = %self.voice_id,
            model_id,
            text_len = self.text.len(),
            has_voice_settings = self.voice_settings.is_some(),
            "building ElevenLabs speech request"
        );

        let body = ElevenLabsRequest {
            text: &self.text,
            model_id,
            voice_settings: self.voice_settings.as_ref(),
        };

        client
            .post(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(http::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .build()
            .map_err(|e| build_error(Self::PROVIDER, &e))
    }
}

impl OutboundCall for ElevenLabsAccount {
    const PROVIDER: &'static str = "ElevenLabs";
    const RELAY: Relay = Relay::Json;

    fn proxy(&self) -> &ProxySelection {
        &self.proxy
    }

    fn build(&self, client: &Client, endpoints: &Endpoints) -> Result<reqwest::Request> {
        let segment = match self.resource {
            AccountResource::Voices => "voices",
            AccountResource::User => "user",
        };

        let url = endpoint(&endpoints.elevenlabs, &[segment])?;

        client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.expose_secret())
            .header(http::header::ACCEPT, "application/json")
            .build()
            .map_err(|e| build_error(Self::PROVIDER, &e))
    }
}
