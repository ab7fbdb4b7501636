use argh::FromArgs;
use base64::{Engine as _, engine::general_purpose};
use std::path::PathBuf;
use thirdeye::decode::{decode_image_payload, encode_data_url};
use thirdeye::messages::{AnalyzeRequest, AnalyzeResponse, FetchImageResponse};

// defaults for the client
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5000;

#[derive(FromArgs)]
/// ThirdEye client for describing images and moving camera frames
struct ClientArgs {
    /// the host to connect to
    #[argh(option, short = 'h', default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// the port to connect to
    #[argh(option, short = 'p', default = "DEFAULT_PORT")]
    port: u16,

    /// command to execute: "analyze", "upload" or "latest"
    #[argh(subcommand)]
    command: ClientCommands,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum ClientCommands {
    Analyze(AnalyzeCommand),
    Upload(UploadCommand),
    Latest(LatestCommand),
}

#[derive(FromArgs)]
/// Describe an image
#[argh(subcommand, name = "analyze")]
struct AnalyzeCommand {
    /// the path to the JPEG image
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// the language code of the answer
    #[argh(option, short = 'l')]
    language: Option<String>,

    /// the mode, "live" or "navigation"
    #[argh(option, short = 'm')]
    mode: Option<String>,

    /// where to write the MP3 answer, if the server returns audio
    #[argh(option, short = 'o')]
    audio_out: Option<PathBuf>,
}

#[derive(FromArgs)]
/// Push an image as the latest camera frame
#[argh(subcommand, name = "upload")]
struct UploadCommand {
    /// the path to the JPEG image
    #[argh(option, short = 'i')]
    image_path: PathBuf,
}

#[derive(FromArgs)]
/// Fetch the latest camera frame
#[argh(subcommand, name = "latest")]
struct LatestCommand {
    /// where to write the image
    #[argh(option, short = 'o')]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: ClientArgs = argh::from_env();

    let client = reqwest::Client::new();

    // format the host and port
    let addr = format!("{}:{}", args.host, args.port);

    match args.command {
        ClientCommands::Analyze(command) => {
            let image = std::fs::read(&command.image_path)?;
            let response = client
                .post(format!("http://{}/analyze", addr))
                .json(&AnalyzeRequest {
                    image: Some(encode_data_url("image/jpeg", &image)),
                    language: command.language,
                    mode: command.mode,
                })
                .send()
                .await?;

            if !response.status().is_success() {
                let result = response.json::<serde_json::Value>().await?;
                println!("Error: {}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let result = response.json::<AnalyzeResponse>().await?;
            println!("[{}] {}", result.language, result.text);

            match (result.audio, command.audio_out) {
                (Some(audio), Some(path)) => {
                    std::fs::write(&path, general_purpose::STANDARD.decode(audio)?)?;
                    println!("Audio written to {}", path.display());
                }
                (None, Some(_)) => println!("No audio returned; speak the text locally"),
                _ => {}
            }
        }
        ClientCommands::Upload(command) => {
            let image = std::fs::read(&command.image_path)?;
            let response = client
                .post(format!("http://{}/upload-arduino-image", addr))
                .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
                .body(image)
                .send()
                .await?;

            let result = response.json::<serde_json::Value>().await?;
            println!("Result: {}", serde_json::to_string_pretty(&result)?);
        }
        ClientCommands::Latest(command) => {
            let response = client
                .get(format!("http://{}/fetch-arduino-image", addr))
                .send()
                .await?;

            if !response.status().is_success() {
                let result = response.json::<serde_json::Value>().await?;
                println!("Error: {}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }

            let result = response.json::<FetchImageResponse>().await?;
            let image = decode_image_payload(&result.image)?;
            println!(
                "Latest frame: {} bytes, taken {}",
                image.len(),
                result
                    .timestamp
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "at an unknown time".to_string())
            );

            if let Some(path) = command.output {
                std::fs::write(&path, image)?;
                println!("Image written to {}", path.display());
            }
        }
    }

    Ok(())
}
