use std::future::Future;

/// MIME type assumed for every image handed to a description model.
pub const IMAGE_MIME_TYPE: &str = "image/jpeg";

pub struct DescribeRequest {
    pub prompt: String,
    pub image: Vec<u8>,
}

pub struct DescribeResponse {
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DescribeError {
    #[error("No text response generated")]
    NoDescription,
    #[error("description provider error: {0}")]
    Provider(String),
}

/// A vision model that turns an image and a prompt into a short description.
///
/// Implementations must not retry; a failed call is reported once and the
/// request fails.
pub trait DescriptionModel: Send + Sync + 'static {
    fn describe(
        &self,
        request: DescribeRequest,
    ) -> impl Future<Output = Result<DescribeResponse, DescribeError>> + Send;
}
