use crate::decode::DecodeError;
use crate::messages::ErrorResponse;
use crate::model::DescribeError;
use crate::remote::RemoteFetchError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors surfaced by the relay's HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Input(String),
    #[error("No image data provided")]
    NoImageData,
    #[error("Invalid image data: {0}")]
    Decode(#[from] DecodeError),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Description(#[from] DescribeError),
    #[error(transparent)]
    Remote(#[from] RemoteFetchError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Input(_) | ApiError::NoImageData | ApiError::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Remote(RemoteFetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Remote(_) => StatusCode::BAD_GATEWAY,
            ApiError::Description(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{status}: {self:?}");
        } else {
            log::debug!("{status}: {self}");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
