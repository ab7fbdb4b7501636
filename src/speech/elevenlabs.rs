use super::{SpeechError, SpeechSynthesizer, status_error};
use serde::Serialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

pub const DEFAULT_ELEVENLABS_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

/// ElevenLabs streaming synthesis with one multilingual voice for every language.
pub struct ElevenLabsTts {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsTts {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            voice_id: DEFAULT_ELEVENLABS_VOICE.to_string(),
            model_id: DEFAULT_ELEVENLABS_MODEL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_voice(mut self, voice_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        self.voice_id = voice_id.into();
        self.model_id = model_id.into();
        self
    }
}

#[derive(Serialize)]
struct StreamRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

impl SpeechSynthesizer for ElevenLabsTts {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>, SpeechError> {
        let mut response = self
            .http
            .post(format!(
                "{}/v1/text-to-speech/{}/stream",
                self.base_url, self.voice_id
            ))
            .query(&[("output_format", OUTPUT_FORMAT)])
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&StreamRequest {
                text,
                model_id: &self.model_id,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        // chunks are appended in arrival order
        let mut audio = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            audio.extend_from_slice(&chunk);
        }

        Ok(audio)
    }
}
