use crate::decode::decode_image_payload;
use crate::error::ApiError;
use crate::frame::LatestFrameStore;
use crate::messages::{
    AnalyzeRequest, AnalyzeResponse, FetchImageResponse, RelayHealth, UploadImageResponse,
};
use crate::model::DescriptionModel;
use crate::pipeline::{DescriptionRequest, Pipeline};
use crate::prompt::{DEFAULT_LANGUAGE, Mode};
use crate::remote::RemoteFetcher;
use crate::speech::SpeechSynthesizer;
use crate::upload::UploadPayload;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    routing::{get, post},
};
use chrono::Utc;
use std::{path::PathBuf, sync::Arc};
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
};

/// Shared state of the relay.
pub struct AppState<D, S> {
    pub pipeline: Pipeline<D, S>,
    pub frames: LatestFrameStore,
    /// Remote camera to proxy; when absent frames come from uploads.
    pub remote: Option<RemoteFetcher>,
}

impl<D, S> AppState<D, S> {
    pub fn new(pipeline: Pipeline<D, S>, remote: Option<RemoteFetcher>) -> Self {
        Self {
            pipeline,
            frames: LatestFrameStore::new(),
            remote,
        }
    }
}

pub struct ServerOptions {
    /// Directory holding `index.html` and the front-end assets.
    pub static_dir: PathBuf,
    pub max_upload_bytes: usize,
}

pub fn router<D: DescriptionModel, S: SpeechSynthesizer>(
    state: Arc<AppState<D, S>>,
    options: ServerOptions,
) -> Router {
    let index = ServeFile::new(options.static_dir.join("index.html"));

    Router::new()
        .route_service("/", index)
        .route("/analyze", post(analyze::<D, S>))
        .route("/fetch-arduino-image", get(fetch_arduino_image::<D, S>))
        .route("/upload-arduino-image", post(upload_arduino_image::<D, S>))
        .route("/health", get(health::<D, S>))
        .fallback_service(ServeDir::new(options.static_dir))
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn analyze<D: DescriptionModel, S: SpeechSynthesizer>(
    State(state): State<Arc<AppState<D, S>>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(payload) = payload.map_err(|e| {
        log::debug!("Rejected analyze body: {}", e.body_text());
        ApiError::Input("No data provided".to_string())
    })?;

    let image = payload
        .image
        .filter(|image| !image.trim().is_empty())
        .ok_or(ApiError::NoImageData)?;

    let image = decode_image_payload(&image)?;
    if image.is_empty() {
        return Err(ApiError::NoImageData);
    }

    // echoed as sent; prompt and voice lookups ignore surrounding whitespace
    let language = payload
        .language
        .filter(|language| !language.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let request = DescriptionRequest {
        image,
        language,
        mode: Mode::from_request(payload.mode.as_deref()),
    };

    let response = state.pipeline.run(request).await?;
    log::info!(
        "Answered analyze request ({}, audio: {})",
        response.language,
        response.audio.is_some()
    );

    Ok(Json(response))
}

async fn fetch_arduino_image<D: DescriptionModel, S: SpeechSynthesizer>(
    State(state): State<Arc<AppState<D, S>>>,
) -> Result<Json<FetchImageResponse>, ApiError> {
    if let Some(remote) = &state.remote {
        let image = remote.fetch().await?;
        return Ok(Json(FetchImageResponse {
            success: true,
            image,
            timestamp: Some(Utc::now()),
        }));
    }

    let frame = state
        .frames
        .fetch_latest()
        .await
        .ok_or_else(|| ApiError::NotFound("No image has been uploaded yet".to_string()))?;

    Ok(Json(FetchImageResponse {
        success: true,
        image: frame.data_url(),
        timestamp: Some(frame.captured_at),
    }))
}

async fn upload_arduino_image<D: DescriptionModel, S: SpeechSynthesizer>(
    State(state): State<Arc<AppState<D, S>>>,
    payload: UploadPayload,
) -> Result<Json<UploadImageResponse>, ApiError> {
    let source = payload.source();
    let image = payload.into_image()?;
    if image.is_empty() {
        return Err(ApiError::NoImageData);
    }

    let size = state.frames.upload(image).await;
    log::info!("Stored uploaded frame ({size} bytes, {source})");

    Ok(Json(UploadImageResponse {
        success: true,
        message: "Image uploaded successfully".to_string(),
        size,
    }))
}

async fn health<D: DescriptionModel, S: SpeechSynthesizer>(
    State(state): State<Arc<AppState<D, S>>>,
) -> Json<RelayHealth> {
    Json(RelayHealth {
        status: "running".to_string(),
        speech: state.pipeline.speech_backend().to_string(),
        remote_camera: state.remote.is_some(),
        timestamp: Utc::now(),
    })
}
