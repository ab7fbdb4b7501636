use crate::decode::encode_data_url;
use crate::model::IMAGE_MIME_TYPE;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use std::time::Duration;

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum RemoteFetchError {
    #[error("Remote camera timed out")]
    Timeout,
    #[error("Cannot reach remote camera: {0}")]
    Unreachable(String),
    #[error("Remote camera returned status {code}")]
    Status { code: u16 },
    #[error("Failed to read remote camera response: {0}")]
    Body(String),
}

impl From<reqwest::Error> for RemoteFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteFetchError::Timeout
        } else if err.is_connect() {
            RemoteFetchError::Unreachable(err.to_string())
        } else {
            RemoteFetchError::Body(err.to_string())
        }
    }
}

/// Pulls the current image from a remote camera server.
pub struct RemoteFetcher {
    http: reqwest::Client,
    url: String,
}

impl RemoteFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: reqwest::Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the remote image and returns it as a data URL.
    pub async fn fetch(&self) -> Result<String, RemoteFetchError> {
        let response = self
            .http
            .get(&self.url)
            // tunnels such as ngrok serve an HTML interstitial without this
            .header("ngrok-skip-browser-warning", "true")
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(RemoteFetchError::Status {
                code: response.status().as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| IMAGE_MIME_TYPE.to_string());

        let body = response.bytes().await?;
        log::debug!("Fetched {} bytes ({content_type}) from {}", body.len(), self.url);

        Ok(encode_data_url(&content_type, &body))
    }
}
