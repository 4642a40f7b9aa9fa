//! Inbound request bodies and their validated forms
//!
//! Each payload deserializes leniently (every field optional) and is then
//! turned into a validated request by `validate`. A validated request can
//! only exist when every required field is present, so no provider call is
//! ever built from an incomplete body.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{Result, TtsError},
    proxy::{ProxyList, ProxySelection},
};

/// Body of `POST /api/elevenlabs` and `POST /api/generate`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevenLabsSpeechPayload {
    pub api_key: Option<SecretString>,
    pub text: Option<String>,
    pub voice_id: Option<String>,
    #[serde(alias = "model_id")]
    pub model_id: Option<String>,
    #[serde(alias = "voice_settings")]
    pub voice_settings: Option<Value>,
    /// ElevenLabs `output_format` query value, e.g. `mp3_44100_128`
    #[serde(alias = "output_format")]
    pub output_format: Option<String>,
    pub proxy: Option<String>,
    pub proxies: Option<ProxyList>,
}

/// Body of `POST /api/voices` and `POST /api/user/balance`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElevenLabsAccountPayload {
    pub api_key: Option<SecretString>,
    pub proxy: Option<String>,
    pub proxies: Option<ProxyList>,
}

/// Body of `POST /api/google`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSynthesizePayload {
    pub api_key: Option<SecretString>,
    pub input: Option<Value>,
    pub voice: Option<Value>,
    pub audio_config: Option<Value>,
    pub proxy: Option<String>,
    pub proxies: Option<ProxyList>,
}

/// Body of `POST /api/amazon`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollySpeechPayload {
    pub access_key_id: Option<SecretString>,
    pub secret_access_key: Option<SecretString>,
    pub region: Option<String>,
    pub text: Option<String>,
    pub voice_id: Option<String>,
    /// `standard`, `neural`, `long-form` or `generative`
    pub engine: Option<String>,
    /// `text` or `ssml`
    pub text_type: Option<String>,
}

/// Validated `ElevenLabs` text-to-speech request
#[derive(Debug)]
pub struct ElevenLabsSpeech {
    pub api_key: SecretString,
    pub text: String,
    pub voice_id: String,
    pub model_id: Option<String>,
    pub voice_settings: Option<Value>,
    pub output_format: Option<String>,
    pub proxy: ProxySelection,
}

/// Which `ElevenLabs` account resource to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountResource {
    /// `GET /voices`
    Voices,
    /// `GET /user`, subscription and character balance
    User,
}

/// Validated `ElevenLabs` account lookup
#[derive(Debug)]
pub struct ElevenLabsAccount {
    pub api_key: SecretString,
    pub resource: AccountResource,
    pub proxy: ProxySelection,
}

/// Validated Google Cloud synthesize request
#[derive(Debug)]
pub struct GoogleSynthesize {
    pub api_key: SecretString,
    pub input: Value,
    pub voice: Value,
    pub audio_config: Value,
    pub proxy: ProxySelection,
}

/// Validated Amazon Polly request
#[derive(Debug)]
pub struct PollySpeech {
    pub access_key_id: SecretString,
    pub secret_access_key: SecretString,
    pub region: String,
    pub text: String,
    pub voice_id: String,
    pub engine: Option<String>,
    pub text_type: Option<String>,
}

impl ElevenLabsSpeechPayload {
    pub fn validate(self) -> Result<ElevenLabsSpeech> {
        let mut missing = Missing::default();
        let api_key = missing.check("apiKey", self.api_key);
        let text = missing.check("text", self.text);
        let voice_id = missing.check("voiceId", self.voice_id);

        let (Some(api_key), Some(text), Some(voice_id)) = (api_key, text, voice_id) else {
            return Err(missing.into_error());
        };

        Ok(ElevenLabsSpeech {
            api_key,
            text,
            voice_id,
            model_id: self.model_id.filter(|m| !m.is_blank()),
            voice_settings: self.voice_settings.filter(|v| !v.is_blank()),
            output_format: self.output_format.filter(|f| !f.is_blank()),
            proxy: ProxySelection::from_fields(self.proxy.as_deref(), self.proxies.as_ref())?,
        })
    }
}

impl ElevenLabsAccountPayload {
    /// Account lookups require a `proxies` entry
    pub fn validate(self, resource: AccountResource) -> Result<ElevenLabsAccount> {
        let mut missing = Missing::default();
        let api_key = missing.check("apiKey", self.api_key);
        let proxies = missing.check("proxies", self.proxies);

        let (Some(api_key), Some(proxies)) = (api_key, proxies) else {
            return Err(missing.into_error());
        };

        Ok(ElevenLabsAccount {
            api_key,
            resource,
            proxy: ProxySelection::from_fields(self.proxy.as_deref(), Some(&proxies))?,
        })
    }
}

impl GoogleSynthesizePayload {
    pub fn validate(self) -> Result<GoogleSynthesize> {
        let mut missing = Missing::default();
        let api_key = missing.check("apiKey", self.api_key);
        let input = missing.check("input", self.input);
        let voice = missing.check("voice", self.voice);
        let audio_config = missing.check("audioConfig", self.audio_config);

        let (Some(api_key), Some(input), Some(voice), Some(audio_config)) = (api_key, input, voice, audio_config)
        else {
            return Err(missing.into_error());
        };

        Ok(GoogleSynthesize {
            api_key,
            input,
            voice,
            audio_config,
            proxy: ProxySelection::from_fields(self.proxy.as_deref(), self.proxies.as_ref())?,
        })
    }
}

impl PollySpeechPayload {
    pub fn validate(self) -> Result<PollySpeech> {
        let mut missing = Missing::default();
        let access_key_id = missing.check("accessKeyId", self.access_key_id);
        let secret_access_key = missing.check("secretAccessKey", self.secret_access_key);
        let region = missing.check("region", self.region);
        let text = missing.check("text", self.text);
        let voice_id = missing.check("voiceId", self.voice_id);

        let (Some(access_key_id), Some(secret_access_key), Some(region), Some(text), Some(voice_id)) =
            (access_key_id, secret_access_key, region, text, voice_id)
        else {
            return Err(missing.into_error());
        };

        Ok(PollySpeech {
            access_key_id,
            secret_access_key,
            region,
            text,
            voice_id,
            engine: self.engine.filter(|e| !e.is_blank()),
            text_type: self.text_type.filter(|t| !t.is_blank()),
        })
    }
}

/// Names of required fields found absent or blank, in declaration order
#[derive(Default)]
struct Missing(Vec<&'static str>);

impl Missing {
    fn check<T: Blank>(&mut self, name: &'static str, value: Option<T>) -> Option<T> {
        let value = value.filter(|v| !v.is_blank());
        if value.is_none() {
            self.0.push(name);
        }
        value
    }

    fn into_error(self) -> TtsError {
        TtsError::MissingParameters(self.0)
    }
}

/// Values a client can send that still count as "not provided"
trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for SecretString {
    fn is_blank(&self) -> bool {
        self.expose_secret().is_empty()
    }
}

impl Blank for Value {
    fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl Blank for ProxyList {
    fn is_blank(&self) -> bool {
        Self::is_blank(self)
    }
}
