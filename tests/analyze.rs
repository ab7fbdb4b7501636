//! Analyze endpoint tests
//!
//! Drives `/analyze` through the router with scripted description and speech
//! backends.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use thirdeye::{
    AppState, DescribeError, DescribeRequest, DescribeResponse, DescriptionModel, Mode, Pipeline,
    ServerOptions, SpeechClient, SpeechSynthesizer, select_prompt, speech::SpeechError,
};
use tower::ServiceExt;

const FRENCH_SCENARIO: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRg==";
const JPEG_HEADER: [u8; 10] = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10, 0x4a, 0x46, 0x49, 0x46];

#[derive(Clone)]
struct RecordingModel {
    seen: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
    reply: Option<&'static str>,
}

impl RecordingModel {
    fn replying(reply: &'static str) -> Self {
        Self {
            seen: Arc::default(),
            reply: Some(reply),
        }
    }

    fn silent() -> Self {
        Self {
            seen: Arc::default(),
            reply: None,
        }
    }

    fn calls(&self) -> Vec<(String, Vec<u8>)> {
        self.seen.lock().unwrap().clone()
    }
}

impl DescriptionModel for RecordingModel {
    async fn describe(&self, request: DescribeRequest) -> Result<DescribeResponse, DescribeError> {
        self.seen
            .lock()
            .unwrap()
            .push((request.prompt, request.image));

        match self.reply {
            Some(text) => Ok(DescribeResponse {
                text: text.to_string(),
            }),
            None => Err(DescribeError::NoDescription),
        }
    }
}

enum FakeSpeech {
    Audio(&'static [u8]),
    Failing,
}

impl SpeechSynthesizer for FakeSpeech {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>, SpeechError> {
        match self {
            FakeSpeech::Audio(audio) => Ok(audio.to_vec()),
            FakeSpeech::Failing => Err(SpeechError::Status {
                status: 500,
                message: "voice offline".to_string(),
            }),
        }
    }
}

fn app(model: RecordingModel, speech: SpeechClient<FakeSpeech>) -> Router {
    let state = Arc::new(AppState::new(Pipeline::new(model, speech), None));
    thirdeye::router(
        state,
        ServerOptions {
            static_dir: PathBuf::from("static"),
            max_upload_bytes: 1 << 20,
        },
    )
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn analyze(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::post("/analyze")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_french_live_scenario() {
    let model = RecordingModel::replying("Une tasse sur une table.");
    let app = app(model.clone(), SpeechClient::disabled());

    let (status, body) = analyze(
        app,
        json!({ "image": FRENCH_SCENARIO, "language": "fr", "mode": "live" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "text": "Une tasse sur une table.", "language": "fr" })
    );

    let calls = model.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.matches("French").count(), 2);
    assert_eq!(calls[0].1, JPEG_HEADER);
}

#[tokio::test]
async fn test_defaults_to_english_live() {
    let model = RecordingModel::replying("A cup on a table.");
    let app = app(model.clone(), SpeechClient::disabled());

    let (status, body) = analyze(app, json!({ "image": "/9j/4AAQSkZJRg==" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "en");
    assert_eq!(model.calls()[0].0, select_prompt("en", Mode::Live));
    assert_eq!(model.calls()[0].1, JPEG_HEADER);
}

#[tokio::test]
async fn test_unknown_language_is_echoed() {
    let model = RecordingModel::replying("A cup.");
    let app = app(model.clone(), SpeechClient::disabled());

    let (status, body) = analyze(app, json!({ "image": FRENCH_SCENARIO, "language": "tlh" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], "tlh");
    assert_eq!(model.calls()[0].0, select_prompt("en", Mode::Live));
}

#[tokio::test]
async fn test_language_is_echoed_as_sent() {
    let model = RecordingModel::replying("Une tasse.");
    let app = app(model.clone(), SpeechClient::disabled());

    let (status, body) = analyze(app, json!({ "image": FRENCH_SCENARIO, "language": " fr " })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["language"], " fr ");
    assert_eq!(model.calls()[0].0, select_prompt("fr", Mode::Live));
}

#[tokio::test]
async fn test_navigation_mode_changes_prompt() {
    let model = RecordingModel::replying("Step down ahead.");
    let live = app(model.clone(), SpeechClient::disabled());
    let navigation = app(model.clone(), SpeechClient::disabled());

    analyze(live, json!({ "image": FRENCH_SCENARIO, "language": "es" })).await;
    analyze(
        navigation,
        json!({ "image": FRENCH_SCENARIO, "language": "es", "mode": "navigation" }),
    )
    .await;

    let calls = model.calls();
    assert_ne!(calls[0].0, calls[1].0);
    assert_eq!(calls[1].0, select_prompt("es", Mode::Navigation));
}

#[tokio::test]
async fn test_audio_is_returned_when_speech_succeeds() {
    let model = RecordingModel::replying("A cup.");
    let app = app(model, SpeechClient::new(FakeSpeech::Audio(b"ID3")));

    let (status, body) = analyze(app, json!({ "image": FRENCH_SCENARIO, "language": "en" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "audio": "SUQz", "text": "A cup.", "language": "en" })
    );
}

#[tokio::test]
async fn test_speech_failure_falls_back_to_text() {
    let model = RecordingModel::replying("A cup.");
    let app = app(model, SpeechClient::new(FakeSpeech::Failing));

    let (status, body) = analyze(app, json!({ "image": FRENCH_SCENARIO, "language": "de" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "text": "A cup.", "language": "de" }));
    assert!(body.get("audio").is_none());
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let model = RecordingModel::replying("unused");
    let app = app(model.clone(), SpeechClient::disabled());

    let (status, body) = analyze(app, json!({ "language": "en" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No image data provided");
    assert!(model.calls().is_empty());
}

#[tokio::test]
async fn test_missing_body_is_bad_request() {
    let app = app(RecordingModel::replying("unused"), SpeechClient::disabled());

    let request = Request::post("/analyze").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No data provided");
}

#[tokio::test]
async fn test_malformed_base64_is_bad_request() {
    let app = app(RecordingModel::replying("unused"), SpeechClient::disabled());

    let (status, body) = analyze(app, json!({ "image": "data:image/jpeg;base64,%%%" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid image data"));
}

#[tokio::test]
async fn test_no_description_is_server_error() {
    let app = app(RecordingModel::silent(), SpeechClient::disabled());

    let (status, body) = analyze(app, json!({ "image": FRENCH_SCENARIO })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No text response generated");
}

#[tokio::test]
async fn test_health_reports_speech_backend() {
    let app = app(
        RecordingModel::replying("unused"),
        SpeechClient::new(FakeSpeech::Audio(b"ID3")),
    );

    let request = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "running");
    assert_eq!(body["speech"], "fake");
    assert_eq!(body["remote_camera"], false);
}

#[tokio::test]
async fn test_index_is_served() {
    let app = app(RecordingModel::replying("unused"), SpeechClient::disabled());

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&html).contains("ThirdEye"));
}
