//! Gemini-backed image transform client.

use crate::config::ClientConfig;
use crate::error::{parse_retry_after, sanitize_error_message, ImageGenError, Result};
use crate::image::provider::ImageTransformer;
use crate::image::types::{GeneratedImage, ImageInput, TransformRequest};
use crate::image::wire::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Client that sends a product photo plus prompt to Gemini and returns the
/// first generated image.
///
/// Holds no mutable state; clone it or share it behind an `Arc` to issue
/// concurrent calls over one connection pool.
#[derive(Debug, Clone)]
pub struct ImageTransformClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ImageTransformClient {
    /// Creates a client from a validated configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Creates a client configured from the environment.
    ///
    /// Fails with `MissingCredential` if neither `API_KEY` nor `VITE_API_KEY`
    /// is set.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Transforms `base64_image` (data URL or raw base64) according to
    /// `prompt` and returns the result as a data URL.
    pub async fn generate_product_image(
        &self,
        base64_image: &str,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String> {
        let image = ImageInput::new(base64_image, mime_type).inspect_err(|e| {
            tracing::error!(model = %self.config.model(), error = %e, "rejected image input");
        })?;
        let request = TransformRequest::new(image, prompt);
        Ok(self.transform(&request).await?.to_data_url())
    }

    fn model_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}",
            self.config.base_url(),
            self.config.model()
        )
    }

    async fn transform_impl(&self, request: &TransformRequest) -> Result<GeneratedImage> {
        let start = Instant::now();
        let url = format!("{}:generateContent", self.model_url());
        let body = GenerateContentRequest::from_transform_request(request);

        tracing::debug!(
            model = %self.config.model(),
            mime_type = %request.image.mime_type,
            prompt_len = request.prompt.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let response: GenerateContentResponse = serde_json::from_slice(&bytes)?;

        let Some(inline) = response.first_image() else {
            if let Some(reason) = response.block_reason() {
                return Err(ImageGenError::ContentBlocked(reason));
            }
            return Err(ImageGenError::NoImage);
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            mime_type = %inline.mime_type,
            duration_ms,
            "generateContent returned an image"
        );

        Ok(GeneratedImage {
            data: inline.data.clone(),
            mime_type: inline.mime_type.clone(),
            text: response.text(),
            model: Some(self.config.model().to_string()),
            duration_ms: Some(duration_ms),
        })
    }

    fn map_transport_error(&self, err: reqwest::Error) -> ImageGenError {
        match self.config.timeout() {
            Some(timeout) if err.is_timeout() => ImageGenError::Timeout(timeout),
            _ => ImageGenError::Network(err),
        }
    }
}

fn parse_error(status: u16, text: &str, headers: &reqwest::header::HeaderMap) -> ImageGenError {
    let message = sanitize_error_message(text);
    match status {
        401 | 403 => ImageGenError::Auth(message),
        429 => ImageGenError::RateLimited {
            retry_after: parse_retry_after(headers).map(Duration::from_secs),
        },
        _ => ImageGenError::Api { status, message },
    }
}

#[async_trait]
impl ImageTransformer for ImageTransformClient {
    async fn transform(&self, request: &TransformRequest) -> Result<GeneratedImage> {
        self.transform_impl(request).await.inspect_err(|e| {
            tracing::error!(model = %self.config.model(), error = %e, "error calling Gemini API");
        })
    }

    fn model(&self) -> &str {
        self.config.model().as_str()
    }

    async fn health_check(&self) -> Result<()> {
        let response = self
            .client
            .get(self.model_url())
            .header("x-goog-api-key", self.config.api_key())
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        match response.status().as_u16() {
            401 | 403 => Err(ImageGenError::Auth("Invalid API key".into())),
            404 => Err(ImageGenError::Api {
                status: 404,
                message: format!("Model {} not found", self.config.model()),
            }),
            s if !(200..300).contains(&s) => Err(ImageGenError::Api {
                status: s,
                message: "Health check failed".into(),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ImageModel;

    #[test]
    fn test_parse_error_mapping() {
        let headers = reqwest::header::HeaderMap::new();
        assert!(matches!(
            parse_error(401, r#"{"error":{"message":"API key not valid"}}"#, &headers),
            ImageGenError::Auth(ref m) if m == "API key not valid"
        ));
        assert!(matches!(
            parse_error(429, "quota", &headers),
            ImageGenError::RateLimited { retry_after: None }
        ));
        assert!(matches!(
            parse_error(500, "boom", &headers),
            ImageGenError::Api { status: 500, ref message } if message == "boom"
        ));
    }

    #[test]
    fn test_parse_error_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::RETRY_AFTER, "30".parse().unwrap());
        assert!(matches!(
            parse_error(429, "", &headers),
            ImageGenError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(30)
        ));
    }

    #[test]
    fn test_model_url() {
        let config = ClientConfig::builder()
            .api_key("k")
            .model(ImageModel::FlashImagePreview)
            .base_url("http://localhost:1234/")
            .build()
            .unwrap();
        let client = ImageTransformClient::new(config).unwrap();
        assert_eq!(
            client.model_url(),
            "http://localhost:1234/v1beta/models/gemini-2.5-flash-image-preview"
        );
    }
}
