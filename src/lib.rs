//! ThirdEye relay: describes camera images for visually impaired users.
//!
//! An image posted to `/analyze` is decoded, paired with a prompt chosen by
//! language and mode, described by a vision model and, when a voice provider
//! is configured, turned into MP3 audio. A small frame store and proxy let a
//! client poll the latest picture pushed by a remote camera, and the
//! [`camera`] module runs the capture server on the device itself.

pub mod camera;
pub mod config;
pub mod decode;
pub mod error;
pub mod frame;
pub mod gemini;
pub mod messages;
pub mod model;
pub mod pipeline;
pub mod prompt;
pub mod remote;
pub mod server;
pub mod speech;
pub mod upload;

pub use error::ApiError;
pub use model::{DescribeError, DescribeRequest, DescribeResponse, DescriptionModel};
pub use pipeline::{DescriptionRequest, DescriptionResult, Pipeline, assemble_response};
pub use prompt::{Mode, select_prompt};
pub use server::{AppState, ServerOptions, router};
pub use speech::{SpeechClient, SpeechResult, SpeechSynthesizer};
