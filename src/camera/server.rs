use super::{CaptureEngine, CaptureError};
use crate::messages::{CameraHealth, ErrorResponse, TestResponse};
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

impl IntoResponse for CaptureError {
    fn into_response(self) -> Response {
        log::error!("Capture failed: {self}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

pub fn router(engine: Arc<CaptureEngine>) -> Router {
    Router::new()
        .route("/", get(capture_image))
        .route("/health", get(health))
        .route("/test", get(test))
        .layer(CorsLayer::permissive())
        .with_state(engine)
}

async fn capture_image(State(engine): State<Arc<CaptureEngine>>) -> Result<Response, CaptureError> {
    let image = engine.capture_one().await?;
    log::info!(
        "Captured frame {} ({} bytes) in {:?}",
        image.id,
        image.jpeg.len(),
        image.duration
    );

    Ok(([(CONTENT_TYPE, "image/jpeg")], image.jpeg).into_response())
}

async fn health(State(engine): State<Arc<CaptureEngine>>) -> Json<CameraHealth> {
    let camera = if engine.camera_available().await {
        "available"
    } else {
        "unavailable"
    };

    Json(CameraHealth {
        status: "running".to_string(),
        camera: camera.to_string(),
        timestamp: Utc::now(),
    })
}

async fn test() -> Json<TestResponse> {
    Json(TestResponse {
        message: "Camera server is running".to_string(),
    })
}
