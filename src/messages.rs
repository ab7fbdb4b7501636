use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnalyzeRequest {
    /// Base64 image or data URL.
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AnalyzeResponse {
    /// Base64 MP3, absent when the client has to speak the text itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    pub text: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchImageResponse {
    pub success: bool,
    /// Data URL of the frame.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UploadImageRequest {
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub message: String,
    pub size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayHealth {
    pub status: String,
    pub speech: String,
    pub remote_camera: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraHealth {
    pub status: String,
    pub camera: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestResponse {
    pub message: String,
}
