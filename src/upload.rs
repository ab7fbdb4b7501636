use crate::decode::{DecodeError, decode_image_payload};
use crate::error::ApiError;
use crate::messages::UploadImageRequest;
use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};

/// Multipart field that carries the uploaded image.
pub const IMAGE_FIELD: &str = "image";

/// The three accepted shapes of an uploaded frame, resolved from the request
/// content type before any handler code runs.
#[derive(Debug)]
pub enum UploadPayload {
    /// `multipart/form-data` with an `image` file field.
    Multipart(Bytes),
    /// Any other content type: the body is the image.
    Raw(Bytes),
    /// `application/json` of the form `{"image": "<base64 or data URL>"}`.
    Json(String),
}

impl UploadPayload {
    pub fn source(&self) -> &'static str {
        match self {
            UploadPayload::Multipart(_) => "multipart",
            UploadPayload::Raw(_) => "raw body",
            UploadPayload::Json(_) => "json",
        }
    }

    pub fn into_image(self) -> Result<Vec<u8>, DecodeError> {
        match self {
            UploadPayload::Multipart(bytes) | UploadPayload::Raw(bytes) => Ok(bytes.to_vec()),
            UploadPayload::Json(encoded) => decode_image_payload(&encoded),
        }
    }
}

impl<S: Send + Sync> FromRequest<S> for UploadPayload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::Input(e.body_text()))?;

            while let Some(field) = multipart
                .next_field()
                .await
                .map_err(|e| ApiError::Input(e.body_text()))?
            {
                if field.name() != Some(IMAGE_FIELD) {
                    continue;
                }

                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Input(e.body_text()))?;

                if bytes.is_empty() {
                    return Err(ApiError::NoImageData);
                }
                return Ok(UploadPayload::Multipart(bytes));
            }

            return Err(ApiError::NoImageData);
        }

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<UploadImageRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::Input(e.body_text()))?;

            return body
                .image
                .filter(|image| !image.trim().is_empty())
                .map(UploadPayload::Json)
                .ok_or(ApiError::NoImageData);
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::Input(e.body_text()))?;

        if body.is_empty() {
            return Err(ApiError::NoImageData);
        }
        Ok(UploadPayload::Raw(body))
    }
}
