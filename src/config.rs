//! Relay configuration read from the environment.
//!
//! Secrets and provider selection come from environment variables; the bind
//! address and static directory are command-line flags of the binary.

use crate::gemini::{DEFAULT_GEMINI_MODEL, GeminiClient};
use crate::remote::{DEFAULT_REMOTE_TIMEOUT, RemoteFetcher};
use crate::speech::{
    DEFAULT_ELEVENLABS_MODEL, DEFAULT_ELEVENLABS_VOICE, ElevenLabsTts, GoogleTts, SpeechBackend,
    SpeechClient,
};
use std::time::Duration;

pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
    #[error("unknown speech provider {0:?} (expected google, elevenlabs or none)")]
    UnknownSpeechProvider(String),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Which voice provider, if any, the deployment uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechConfig {
    Disabled,
    Google {
        api_key: String,
    },
    ElevenLabs {
        api_key: String,
        voice_id: String,
        model_id: String,
    },
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: Option<String>,
    pub speech: SpeechConfig,
    /// When set, `/fetch-arduino-image` proxies this URL instead of serving uploads.
    pub remote_camera_url: Option<String>,
    pub provider_timeout: Duration,
    pub remote_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let gemini_api_key = get("GEMINI_API_KEY").ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        Ok(Self {
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL"),
            speech: speech_config(&get)?,
            remote_camera_url: get("ARDUINO_CAMERA_URL"),
            provider_timeout: parse_secs(&get, "PROVIDER_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT),
            remote_timeout: parse_secs(&get, "REMOTE_FETCH_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_REMOTE_TIMEOUT),
            max_upload_bytes: match get("MAX_UPLOAD_BYTES") {
                Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                    var: "MAX_UPLOAD_BYTES",
                    value,
                })?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }

    pub fn gemini_client(&self) -> Result<GeminiClient, ConfigError> {
        let client = GeminiClient::new(
            self.gemini_api_key.clone(),
            self.gemini_model.clone(),
            self.provider_timeout,
        )?;

        Ok(match &self.gemini_base_url {
            Some(base_url) => client.with_base_url(base_url.clone()),
            None => client,
        })
    }

    pub fn speech_client(&self) -> Result<SpeechClient, ConfigError> {
        Ok(match &self.speech {
            SpeechConfig::Disabled => SpeechClient::disabled(),
            SpeechConfig::Google { api_key } => SpeechClient::new(SpeechBackend::Google(
                GoogleTts::new(api_key.clone(), self.provider_timeout)?,
            )),
            SpeechConfig::ElevenLabs {
                api_key,
                voice_id,
                model_id,
            } => SpeechClient::new(SpeechBackend::ElevenLabs(
                ElevenLabsTts::new(api_key.clone(), self.provider_timeout)?
                    .with_voice(voice_id.clone(), model_id.clone()),
            )),
        })
    }

    pub fn remote_fetcher(&self) -> Result<Option<RemoteFetcher>, ConfigError> {
        self.remote_camera_url
            .as_ref()
            .map(|url| RemoteFetcher::new(url.clone(), self.remote_timeout))
            .transpose()
            .map_err(ConfigError::from)
    }
}

fn speech_config(get: &impl Fn(&str) -> Option<String>) -> Result<SpeechConfig, ConfigError> {
    let google = || get("GOOGLE_TTS_API_KEY").map(|api_key| SpeechConfig::Google { api_key });
    let elevenlabs = || {
        get("ELEVENLABS_API_KEY").map(|api_key| SpeechConfig::ElevenLabs {
            api_key,
            voice_id: get("ELEVENLABS_VOICE_ID")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_VOICE.to_string()),
            model_id: get("ELEVENLABS_MODEL")
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_MODEL.to_string()),
        })
    };

    let selected = match get("SPEECH_PROVIDER").map(|p| p.to_ascii_lowercase()) {
        None => elevenlabs().or_else(google),
        Some(provider) => match provider.as_str() {
            "none" | "off" | "browser" => None,
            "google" => google(),
            "elevenlabs" => elevenlabs(),
            other => return Err(ConfigError::UnknownSpeechProvider(other.to_string())),
        },
    };

    Ok(selected.unwrap_or(SpeechConfig::Disabled))
}

fn parse_secs(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    get(var)
        .map(|value| match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::Invalid { var, value }),
        })
        .transpose()
}
