//! Text-to-speech backends.
//!
//! Audio is an optional enhancement: [`SpeechClient::speak`] never fails. When
//! no backend is configured, or the backend call fails, it yields `None` and the
//! caller answers with text only.

mod elevenlabs;
mod google;

pub use elevenlabs::{DEFAULT_ELEVENLABS_MODEL, DEFAULT_ELEVENLABS_VOICE, ElevenLabsTts};
pub use google::{GoogleTts, voice_language_code};

use std::future::Future;

#[derive(Debug, thiserror::Error)]
pub enum SpeechError {
    #[error("speech request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("speech provider returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("speech provider returned invalid audio: {0}")]
    InvalidAudio(String),
    #[error("speech provider returned no audio")]
    EmptyAudio,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioEncoding {
    Mp3,
}

/// Synthesized audio for one description.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpeechResult {
    pub audio: Vec<u8>,
    pub encoding: AudioEncoding,
}

/// A voice provider that turns text into MP3 audio.
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// Short backend identifier used in logs and health output.
    fn name(&self) -> &'static str;

    fn synthesize(
        &self,
        text: &str,
        language: &str,
    ) -> impl Future<Output = Result<Vec<u8>, SpeechError>> + Send;
}

/// The backend picked at deployment time.
pub enum SpeechBackend {
    Google(GoogleTts),
    ElevenLabs(ElevenLabsTts),
}

impl SpeechSynthesizer for SpeechBackend {
    fn name(&self) -> &'static str {
        match self {
            SpeechBackend::Google(backend) => backend.name(),
            SpeechBackend::ElevenLabs(backend) => backend.name(),
        }
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        match self {
            SpeechBackend::Google(backend) => backend.synthesize(text, language).await,
            SpeechBackend::ElevenLabs(backend) => backend.synthesize(text, language).await,
        }
    }
}

/// Wraps an optional backend and applies the text-only fallback policy.
pub struct SpeechClient<S = SpeechBackend> {
    backend: Option<S>,
}

impl<S: SpeechSynthesizer> SpeechClient<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.as_ref().map_or("none", |backend| backend.name())
    }

    /// Synthesizes `text`, or returns `None` when audio cannot be produced.
    pub async fn speak(&self, text: &str, language: &str) -> Option<SpeechResult> {
        let backend = self.backend.as_ref()?;

        let audio = match backend.synthesize(text, language).await {
            Ok(audio) if audio.is_empty() => Err(SpeechError::EmptyAudio),
            other => other,
        };

        match audio {
            Ok(audio) => {
                log::debug!("{} produced {} bytes of audio", backend.name(), audio.len());
                Some(SpeechResult {
                    audio,
                    encoding: AudioEncoding::Mp3,
                })
            }
            Err(e) => {
                log::warn!("{} synthesis failed, answering with text only: {e}", backend.name());
                None
            }
        }
    }
}

/// Reads an error body for a failed provider call.
async fn status_error(response: reqwest::Response) -> SpeechError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    SpeechError::Status { status, message }
}
