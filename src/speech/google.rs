use super::{SpeechError, SpeechSynthesizer, status_error};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";
const DEFAULT_VOICE_LANGUAGE: &str = "en-US";

const VOICE_LANGUAGES: &[(&str, &str)] = &[
    ("en", "en-US"),
    ("es", "es-ES"),
    ("fr", "fr-FR"),
    ("de", "de-DE"),
    ("it", "it-IT"),
    ("pt", "pt-BR"),
    ("zh", "cmn-CN"),
    ("ja", "ja-JP"),
    ("ko", "ko-KR"),
    ("ar", "ar-XA"),
    ("hi", "hi-IN"),
    ("ru", "ru-RU"),
    ("nl", "nl-NL"),
    ("sv", "sv-SE"),
    ("pl", "pl-PL"),
    ("tr", "tr-TR"),
    ("vi", "vi-VN"),
    ("th", "th-TH"),
    ("id", "id-ID"),
    ("he", "he-IL"),
];

/// Maps a request language code to the BCP-47 code of a synthesis voice.
pub fn voice_language_code(language: &str) -> &'static str {
    let primary = language
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    VOICE_LANGUAGES
        .iter()
        .find(|(code, _)| *code == primary)
        .map(|(_, voice)| *voice)
        .unwrap_or(DEFAULT_VOICE_LANGUAGE)
}

/// Google Cloud Text-to-Speech, voice chosen by language with neutral gender.
pub struct GoogleTts {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleTts {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    ssml_gender: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

impl SpeechSynthesizer for GoogleTts {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        let body = SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: voice_language_code(language),
                ssml_gender: "NEUTRAL",
            },
            audio_config: AudioConfig {
                audio_encoding: "MP3",
            },
        };

        let response = self
            .http
            .post(format!("{}/v1/text:synthesize", self.base_url))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let parsed = response.json::<SynthesizeResponse>().await?;
        general_purpose::STANDARD
            .decode(parsed.audio_content)
            .map_err(|e| SpeechError::InvalidAudio(e.to_string()))
    }
}
