use crate::messages::AnalyzeResponse;
use crate::model::{DescribeError, DescribeRequest, DescriptionModel};
use crate::prompt::{Mode, select_prompt};
use crate::speech::{SpeechClient, SpeechResult, SpeechSynthesizer};
use base64::{Engine as _, engine::general_purpose};
use std::time::Instant;

/// A decoded image together with the caller's language and mode.
pub struct DescriptionRequest {
    pub image: Vec<u8>,
    pub language: String,
    pub mode: Mode,
}

/// The description produced for one request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptionResult {
    pub text: String,
    pub language: String,
}

/// Builds the reply, leaving `audio` out when no speech was produced.
pub fn assemble_response(
    description: DescriptionResult,
    speech: Option<SpeechResult>,
) -> AnalyzeResponse {
    AnalyzeResponse {
        audio: speech.map(|speech| general_purpose::STANDARD.encode(speech.audio)),
        text: description.text,
        language: description.language,
    }
}

/// Image → prompt → description → speech → response.
pub struct Pipeline<D, S> {
    describer: D,
    speech: SpeechClient<S>,
}

impl<D: DescriptionModel, S: SpeechSynthesizer> Pipeline<D, S> {
    pub fn new(describer: D, speech: SpeechClient<S>) -> Self {
        Self { describer, speech }
    }

    pub fn speech_backend(&self) -> &'static str {
        self.speech.backend_name()
    }

    pub async fn run(&self, request: DescriptionRequest) -> Result<AnalyzeResponse, DescribeError> {
        let prompt = select_prompt(&request.language, request.mode);
        let start_time = Instant::now();

        let response = self
            .describer
            .describe(DescribeRequest {
                prompt,
                image: request.image,
            })
            .await?;

        log::info!(
            "Described image ({}, {}) in {:?}",
            request.mode.as_str(),
            request.language,
            start_time.elapsed()
        );

        let description = DescriptionResult {
            text: response.text,
            language: request.language,
        };

        let speech = self
            .speech
            .speak(&description.text, &description.language)
            .await;

        Ok(assemble_response(description, speech))
    }
}
