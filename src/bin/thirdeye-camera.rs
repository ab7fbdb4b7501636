use argh::FromArgs;
use std::sync::Arc;
use thirdeye::camera::{
    CaptureEngine, DEFAULT_JPEG_QUALITY, FfmpegCamera, FfmpegCameraConfig, server,
};

// defaults for the camera server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(FromArgs)]
/// Serves one JPEG frame from a local camera per GET request.
struct CameraArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the camera device, e.g. /dev/video0
    #[argh(option, short = 'd')]
    device: Option<String>,

    /// the ffmpeg input format (v4l2, avfoundation, dshow)
    #[argh(option)]
    input_format: Option<String>,

    /// the capture width in pixels
    #[argh(option, default = "640")]
    width: u32,

    /// the capture height in pixels
    #[argh(option, default = "480")]
    height: u32,

    /// the ffmpeg binary to run
    #[argh(option, default = "String::from(\"ffmpeg\")")]
    ffmpeg: String,

    /// the JPEG quality, 1-100
    #[argh(option, short = 'q', default = "DEFAULT_JPEG_QUALITY")]
    quality: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: CameraArgs = argh::from_env();

    let defaults = FfmpegCameraConfig::default();
    let camera = FfmpegCamera::new(FfmpegCameraConfig {
        ffmpeg: args.ffmpeg,
        input_format: args.input_format.unwrap_or(defaults.input_format),
        device: args.device.unwrap_or(defaults.device),
        width: args.width,
        height: args.height,
        startup_grace: defaults.startup_grace,
    });

    let engine = Arc::new(CaptureEngine::new(camera, args.quality.clamp(1, 100)));
    let app = server::router(engine);

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    log::info!("🚀 Starting the camera server");
    log::info!("🔥 Listening on: {}", addr);
    log::info!(
        "🔧 Expose it with a tunnel (e.g. `ngrok http {}`) and set ARDUINO_CAMERA_URL on the relay",
        args.port
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
