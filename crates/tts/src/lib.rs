#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod error;
mod http_client;
mod provider;
mod proxy;
mod relay;
mod request;
mod server;
mod types;

use std::sync::Arc;

use axum::{Router, extract::State, response::Response, routing::post};

pub use error::{Result, TtsError};
pub use proxy::{ProxyList, ProxySelection, pick};
pub use relay::{ForwardHeaders, Relay};
pub use server::{Server, TtsServerBuilder};
pub use types::{
    AccountResource, ElevenLabsAccountPayload, ElevenLabsSpeechPayload, GoogleSynthesizePayload, PollySpeechPayload,
};
use request::ExtractPayload;

/// Build the relay server from configuration
pub fn build_server(config: &voxrelay_config::Config) -> anyhow::Result<Arc<Server>> {
    let server = Arc::new(
        TtsServerBuilder::new(&config.relay)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to initialize TTS relay: {e}"))?,
    );
    Ok(server)
}

/// Create the endpoint router for the relay
pub fn endpoint_router() -> Router<Arc<Server>> {
    Router::new()
        .route("/api/elevenlabs", post(elevenlabs_speech))
        .route("/api/generate", post(elevenlabs_speech))
        .route("/api/voices", post(elevenlabs_voices))
        .route("/api/user/balance", post(elevenlabs_balance))
        .route("/api/google", post(google_synthesize))
        .route("/api/amazon", post(amazon_synthesize))
}

async fn elevenlabs_speech(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<ElevenLabsSpeechPayload>,
) -> Result<Response> {
    tracing::debug!(
        has_api_key = payload.api_key.is_some(),
        text_len = payload.text.as_ref().map_or(0, String::len),
        voice_id = payload.voice_id.as_deref().unwrap_or_default(),
        model_id = payload.model_id.as_deref().unwrap_or_default(),
        has_proxy = payload.proxy.is_some() || payload.proxies.is_some(),
        "ElevenLabs speech request received"
    );

    let speech = payload.validate().inspect_err(log_rejection)?;
    server.relay(&speech).await
}

async fn elevenlabs_voices(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<ElevenLabsAccountPayload>,
) -> Result<Response> {
    let account = payload.validate(AccountResource::Voices).inspect_err(log_rejection)?;
    server.relay(&account).await
}

async fn elevenlabs_balance(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<ElevenLabsAccountPayload>,
) -> Result<Response> {
    let account = payload.validate(AccountResource::User).inspect_err(log_rejection)?;
    server.relay(&account).await
}

async fn google_synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<GoogleSynthesizePayload>,
) -> Result<Response> {
    let synthesize = payload.validate().inspect_err(log_rejection)?;
    server.relay(&synthesize).await
}

async fn amazon_synthesize(
    State(server): State<Arc<Server>>,
    ExtractPayload(payload): ExtractPayload<PollySpeechPayload>,
) -> Result<Response> {
    let speech = payload.validate().inspect_err(log_rejection)?;
    server.synthesize_polly(speech).await
}

fn log_rejection(err: &TtsError) {
    tracing::info!(error = %err, "rejected relay request");
}
