//! Camera capture for the standalone camera server.
//!
//! A [`CaptureEngine`] owns one [`CameraDevice`] on a dedicated thread and
//! serves capture requests one at a time.

mod engine;
mod ffmpeg;
pub mod server;

pub use engine::{CaptureEngine, CapturedImage};
pub use ffmpeg::{FfmpegCamera, FfmpegCameraConfig};

use image::{RgbImage, codecs::jpeg::JpegEncoder};

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera not available: {0}")]
    DeviceUnavailable(String),
    #[error("Failed to capture image")]
    NoFrame,
    #[error("Camera read failed: {0}")]
    Device(String),
    #[error("Failed to encode image: {0}")]
    Encode(String),
    #[error("Capture engine stopped")]
    Stopped,
}

/// A local camera that yields RGB frames.
pub trait CameraDevice {
    type Error: std::error::Error + Send + Sync + 'static;

    fn open(&mut self) -> Result<(), Self::Error>;

    fn is_open(&mut self) -> bool;

    /// Reads the next frame; `Ok(None)` means the device produced nothing.
    fn read_frame(&mut self) -> Result<Option<RgbImage>, Self::Error>;
}

/// JPEG-encodes one frame.
pub fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, quality)
        .encode_image(frame)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    Ok(jpeg)
}
