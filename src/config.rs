//! Client configuration.

use crate::error::{ImageGenError, Result};
use std::time::Duration;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["API_KEY", "VITE_API_KEY"];

/// Overrides the model identifier when set.
pub const MODEL_ENV_VAR: &str = "IMAGEGEN_MODEL";

/// Overrides the API base URL when set.
pub const BASE_URL_ENV_VAR: &str = "IMAGEGEN_BASE_URL";

/// Default Gemini API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini image model variants.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageModel {
    /// Gemini 2.5 Flash Image preview.
    #[default]
    FlashImagePreview,
    /// Gemini 2.5 Flash Image (GA).
    FlashImage,
    /// Any other model identifier.
    Custom(String),
}

impl ImageModel {
    /// Returns the API model identifier.
    pub fn as_str(&self) -> &str {
        match self {
            Self::FlashImagePreview => "gemini-2.5-flash-image-preview",
            Self::FlashImage => "gemini-2.5-flash-image",
            Self::Custom(id) => id,
        }
    }
}

impl From<&str> for ImageModel {
    fn from(id: &str) -> Self {
        match id {
            "gemini-2.5-flash-image-preview" => Self::FlashImagePreview,
            "gemini-2.5-flash-image" => Self::FlashImage,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for ImageModel {
    fn from(id: String) -> Self {
        Self::from(id.as_str())
    }
}

impl std::fmt::Display for ImageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated configuration for an [`ImageTransformClient`](crate::ImageTransformClient).
///
/// A `ClientConfig` always holds a non-blank API key; construct it through
/// [`ClientConfig::builder`] or [`ClientConfig::from_env`].
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    model: ImageModel,
    base_url: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new `ClientConfigBuilder`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Loads the configuration entirely from the environment.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the model.
    pub fn model(&self) -> &ImageModel {
        &self.model
    }

    /// Returns the base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    model: Option<ImageModel>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `API_KEY`, then `VITE_API_KEY`.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model. Falls back to `IMAGEGEN_MODEL`, then the default.
    pub fn model(mut self, model: impl Into<ImageModel>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the API base URL. Falls back to `IMAGEGEN_BASE_URL`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets a timeout for each request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration, resolving the API key.
    pub fn build(self) -> Result<ClientConfig> {
        self.build_with(|name| std::env::var(name).ok())
    }

    fn build_with(self, env: impl Fn(&str) -> Option<String>) -> Result<ClientConfig> {
        let api_key = self
            .api_key
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .find_map(|&name| env(name).filter(|key| !key.trim().is_empty()))
            })
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ImageGenError::MissingCredential(format!(
                    "set {} in the environment or provide a key explicitly",
                    API_KEY_ENV_VARS.join(" or ")
                ))
            })?;

        let model = self
            .model
            .or_else(|| env(MODEL_ENV_VAR).map(|id| ImageModel::from(id.as_str())))
            .unwrap_or_default();

        let base_url = self
            .base_url
            .or_else(|| env(BASE_URL_ENV_VAR))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(ClientConfig {
            api_key: api_key.trim().to_string(),
            model,
            base_url,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_model_as_str() {
        assert_eq!(
            ImageModel::FlashImagePreview.as_str(),
            "gemini-2.5-flash-image-preview"
        );
        assert_eq!(ImageModel::FlashImage.as_str(), "gemini-2.5-flash-image");
        assert_eq!(ImageModel::from("my-model").as_str(), "my-model");
        assert_eq!(
            ImageModel::from("gemini-2.5-flash-image"),
            ImageModel::FlashImage
        );
    }

    #[test]
    fn test_missing_credential() {
        let err = ClientConfigBuilder::new()
            .build_with(env_from(&[]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_blank_credential_is_missing() {
        let err = ClientConfigBuilder::new()
            .build_with(env_from(&[("API_KEY", "   ")]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredential);
    }

    #[test]
    fn test_blank_api_key_falls_back_to_vite() {
        let config = ClientConfigBuilder::new()
            .build_with(env_from(&[("API_KEY", ""), ("VITE_API_KEY", "real-key")]))
            .unwrap();
        assert_eq!(config.api_key(), "real-key");
    }

    #[test]
    fn test_env_precedence() {
        let config = ClientConfigBuilder::new()
            .build_with(env_from(&[("API_KEY", "primary"), ("VITE_API_KEY", "vite")]))
            .unwrap();
        assert_eq!(config.api_key(), "primary");

        let config = ClientConfigBuilder::new()
            .build_with(env_from(&[("VITE_API_KEY", "vite")]))
            .unwrap();
        assert_eq!(config.api_key(), "vite");

        let config = ClientConfigBuilder::new()
            .api_key("explicit")
            .build_with(env_from(&[("API_KEY", "primary")]))
            .unwrap();
        assert_eq!(config.api_key(), "explicit");
    }

    #[test]
    fn test_defaults_and_overrides() {
        let config = ClientConfigBuilder::new()
            .api_key("k")
            .build_with(env_from(&[]))
            .unwrap();
        assert_eq!(config.model(), &ImageModel::FlashImagePreview);
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert!(config.timeout().is_none());

        let config = ClientConfigBuilder::new()
            .api_key("k")
            .timeout(Duration::from_secs(5))
            .build_with(env_from(&[
                ("IMAGEGEN_MODEL", "gemini-2.5-flash-image"),
                ("IMAGEGEN_BASE_URL", "http://localhost:8080/"),
            ]))
            .unwrap();
        assert_eq!(config.model(), &ImageModel::FlashImage);
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfigBuilder::new()
            .api_key("super-secret")
            .build_with(env_from(&[]))
            .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
