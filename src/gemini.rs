use crate::model::{
    DescribeError, DescribeRequest, DescribeResponse, DescriptionModel, IMAGE_MIME_TYPE,
};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Points the client at another host, e.g. a gateway or a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData { inline_data: InlineData<'a> },
    Text { text: &'a str },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    }
}

impl DescriptionModel for GeminiClient {
    async fn describe(&self, request: DescribeRequest) -> Result<DescribeResponse, DescribeError> {
        let body = GenerateContentRequest {
            contents: [Content {
                parts: [
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: IMAGE_MIME_TYPE,
                            data: general_purpose::STANDARD.encode(&request.image),
                        },
                    },
                    RequestPart::Text {
                        text: &request.prompt,
                    },
                ],
            }],
        };

        log::debug!(
            "Requesting description from {} ({} image bytes)",
            self.model,
            request.image.len()
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| DescribeError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DescribeError::Provider(format!("{status}: {message}")));
        }

        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| DescribeError::Provider(e.to_string()))?;

        let text = parsed.into_text().ok_or(DescribeError::NoDescription)?;
        Ok(DescribeResponse { text })
    }
}
