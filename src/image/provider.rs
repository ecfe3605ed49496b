//! Image transformer trait and utilities.

use crate::error::Result;
use crate::image::types::{GeneratedImage, TransformRequest};
use async_trait::async_trait;

/// Trait for services that transform an image according to a prompt.
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Transforms the request's image, returning the first generated image.
    async fn transform(&self, request: &TransformRequest) -> Result<GeneratedImage>;

    /// Returns the model identifier used for generation.
    fn model(&self) -> &str;

    /// Checks if the service is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}

/// Extension trait adding opt-in retries.
#[async_trait]
pub trait ImageTransformerExt: ImageTransformer {
    /// Transforms with automatic retries on transient failures.
    async fn transform_with_retries(
        &self,
        request: &TransformRequest,
        max_retries: u32,
    ) -> Result<GeneratedImage> {
        let mut attempt = 0;
        loop {
            match self.transform(request).await {
                Ok(image) => return Ok(image),
                Err(e) if e.is_retryable() && attempt < max_retries => {
                    attempt += 1;
                    let delay = e.retry_after().unwrap_or(std::time::Duration::from_secs(1));
                    tracing::warn!(
                        attempt,
                        max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "retrying after transient error: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<T: ImageTransformer> ImageTransformerExt for T {}
