//! Amazon Polly `SynthesizeSpeech`
//!
//! Polly calls need `SigV4` signing, so they go through the AWS SDK instead of
//! the shared reqwest clients. A client is built per request from the
//! caller's credentials and region; nothing is cached between requests.

use std::time::Duration;

use aws_sdk_polly::{
    Client,
    config::{BehaviorVersion, Credentials, Region, retry::RetryConfig, timeout::TimeoutConfig},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::synthesize_speech::SynthesizeSpeechError,
    types::{Engine, OutputFormat, TextType, VoiceId},
};
use axum::response::Response;
use http::{HeaderMap, StatusCode};
use secrecy::ExposeSecret;
use url::Url;

use crate::{
    error::{Result, TtsError, status_failure},
    relay::audio_response,
    types::PollySpeech,
};

const PROVIDER: &str = "Amazon Polly";

/// Settings shared by every Polly call
#[derive(Debug, Clone)]
pub struct PollySettings {
    /// Endpoint override; the regional endpoint is used otherwise
    pub endpoint_url: Option<Url>,
    pub timeout: Duration,
}

/// Synthesize speech and stream the MP3 back
pub async fn synthesize(speech: PollySpeech, settings: &PollySettings) -> Result<Response> {
    tracing::debug!(
        region = %speech.region,
        voice_id = %speech.voice_id,
        text_len = speech.text.len(),
        engine = speech.engine.as_deref().unwrap_or("default"),
        "calling Amazon Polly"
    );

    let client = client_for(&speech, settings);

    let mut request = client
        .synthesize_speech()
        .output_format(OutputFormat::Mp3)
        .text(speech.text)
        .voice_id(VoiceId::from(speech.voice_id.as_str()));

    if let Some(engine) = speech.engine.as_deref() {
        request = request.engine(Engine::from(engine));
    }

    if let Some(text_type) = speech.text_type.as_deref() {
        request = request.text_type(TextType::from(text_type));
    }

    let output = request.send().await.map_err(polly_error)?;

    let stream = futures_util::stream::unfold(output.audio_stream, |mut body| async move {
        body.next().await.map(|chunk| (chunk, body))
    });

    Ok(audio_response(HeaderMap::new(), stream))
}

fn client_for(speech: &PollySpeech, settings: &PollySettings) -> Client {
    let credentials = Credentials::new(
        speech.access_key_id.expose_secret(),
        speech.secret_access_key.expose_secret(),
        None,
        None,
        "voxrelay-request",
    );

    let mut config = aws_sdk_polly::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(speech.region.clone()))
        .credentials_provider(credentials)
        .retry_config(RetryConfig::disabled())
        .timeout_config(TimeoutConfig::builder().operation_timeout(settings.timeout).build());

    if let Some(endpoint) = &settings.endpoint_url {
        config = config.endpoint_url(endpoint.as_str().trim_end_matches('/'));
    }

    Client::from_conf(config.build())
}

fn polly_error(err: SdkError<SynthesizeSpeechError>) -> TtsError {
    match &err {
        SdkError::ServiceError(context) => {
            let status = StatusCode::from_u16(context.raw().status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let message = context
                .err()
                .message()
                .filter(|m| !m.trim().is_empty())
                .map_or_else(|| status_failure(status), str::to_string);

            tracing::warn!(
                provider = PROVIDER,
                status = status.as_u16(),
                code = context.err().code().unwrap_or("unknown"),
                %message,
                "provider rejected the request"
            );

            TtsError::Upstream {
                provider: PROVIDER,
                status,
                message,
                headers: HeaderMap::new(),
            }
        }
        SdkError::ConstructionFailure(_) => {
            TtsError::InvalidRequest(format!("Could not build {PROVIDER} request: {}", DisplayErrorContext(&err)))
        }
        _ => TtsError::transport(PROVIDER, &err),
    }
}
