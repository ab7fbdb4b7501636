use argh::FromArgs;
use std::{path::PathBuf, sync::Arc};
use thirdeye::{AppState, Pipeline, ServerOptions, config::RelayConfig};

// defaults for the server
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_STATIC_DIR: &str = "static";

#[derive(FromArgs)]
/// ThirdEye relay: describes camera images and reads the descriptions aloud.
#[argh(note = "Providers are configured with GEMINI_API_KEY, SPEECH_PROVIDER, \
GOOGLE_TTS_API_KEY, ELEVENLABS_API_KEY and ARDUINO_CAMERA_URL.")]
struct RelayArgs {
    /// the host to run the server on
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to run the server on
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// the directory holding index.html and the front-end assets
    #[argh(option, short = 's', default = "PathBuf::from(DEFAULT_STATIC_DIR)")]
    static_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: RelayArgs = argh::from_env();

    let config = RelayConfig::from_env()?;

    let pipeline = Pipeline::new(config.gemini_client()?, config.speech_client()?);
    log::info!("🗣️ Speech backend: {}", pipeline.speech_backend());

    let remote = config.remote_fetcher()?;
    match &remote {
        Some(fetcher) => log::info!("📷 Proxying remote camera at {}", fetcher.url()),
        None => log::info!("📷 Serving uploaded camera frames"),
    }

    let state = Arc::new(AppState::new(pipeline, remote));
    let app = thirdeye::router(
        state,
        ServerOptions {
            static_dir: args.static_dir,
            max_upload_bytes: config.max_upload_bytes,
        },
    );

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    log::info!("🚀 Starting the server");
    log::info!("🔥 Listening on: {}", addr);
    log::info!("🔧 Press Ctrl+C to stop the server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
