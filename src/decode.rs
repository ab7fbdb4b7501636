use base64::{Engine as _, engine::general_purpose};

/// Error returned when an image payload is not valid base64.
#[derive(Debug, thiserror::Error)]
#[error("invalid base64 image payload: {0}")]
pub struct DecodeError(#[from] base64::DecodeError);

/// Decodes an image sent either as raw base64 or as a data URL.
///
/// When the input contains a comma, everything after the first comma is the
/// payload (`data:image/jpeg;base64,<payload>`); otherwise the whole string is.
pub fn decode_image_payload(input: &str) -> Result<Vec<u8>, DecodeError> {
    let payload = match input.split_once(',') {
        Some((_, payload)) => payload,
        None => input,
    };

    Ok(general_purpose::STANDARD.decode(payload.trim())?)
}

/// Wraps raw bytes into a base64 data URL with the given content type.
pub fn encode_data_url(content_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        content_type,
        general_purpose::STANDARD.encode(bytes)
    )
}
