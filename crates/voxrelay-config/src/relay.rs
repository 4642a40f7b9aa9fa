use std::time::Duration;

use serde::Deserialize;
use url::Url;

const DEFAULT_ELEVENLABS_URL: &str = "https://api.elevenlabs.io/v1";
const DEFAULT_GOOGLE_URL: &str = "https://texttospeech.googleapis.com/v1";
const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

/// Outbound relay configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Upper bound for a single provider call, e.g. "120s" or "2m"
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Maximum accepted inbound JSON body in bytes
    #[serde(default = "default_body_limit")]
    pub body_limit: usize,
    /// Provider response headers copied onto the relayed response
    #[serde(default = "default_forward_headers")]
    pub forward_headers: Vec<String>,
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
    #[serde(default)]
    pub google: GoogleConfig,
    #[serde(default)]
    pub amazon: AmazonConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            body_limit: default_body_limit(),
            forward_headers: default_forward_headers(),
            elevenlabs: ElevenLabsConfig::default(),
            google: GoogleConfig::default(),
            amazon: AmazonConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Parse the configured timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the duration string is malformed
    pub fn timeout_duration(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.timeout).map_err(|e| anyhow::anyhow!("invalid relay.timeout '{}': {e}", self.timeout))
    }
}

/// `ElevenLabs` endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ElevenLabsConfig {
    #[serde(default = "default_elevenlabs_url")]
    pub base_url: Url,
    /// Model used when the caller omits `modelId`
    #[serde(default = "default_elevenlabs_model")]
    pub default_model: String,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: default_elevenlabs_url(),
            default_model: default_elevenlabs_model(),
        }
    }
}

/// Google Cloud Text-to-Speech endpoint settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    #[serde(default = "default_google_url")]
    pub base_url: Url,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: default_google_url(),
        }
    }
}

/// Amazon Polly settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmazonConfig {
    /// Endpoint override (`LocalStack`, test stubs); the regional endpoint is used otherwise
    #[serde(default)]
    pub endpoint_url: Option<Url>,
}

fn default_timeout() -> String {
    "120s".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_body_limit() -> usize {
    2 << 20
}

fn default_forward_headers() -> Vec<String> {
    [
        "content-type",
        "content-length",
        "request-id",
        "x-request-id",
        "retry-after",
        "x-goog-request-id",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

fn default_elevenlabs_url() -> Url {
    Url::parse(DEFAULT_ELEVENLABS_URL).expect("valid default URL")
}

fn default_google_url() -> Url {
    Url::parse(DEFAULT_GOOGLE_URL).expect("valid default URL")
}

fn default_elevenlabs_model() -> String {
    DEFAULT_ELEVENLABS_MODEL.to_string()
}
