//! Error types for product image generation.

use std::time::Duration;

/// Message shown to end users for any failed generation, regardless of cause.
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate image. The API call failed.";

/// Stable classification of an [`ImageGenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The API credential was not configured. Fatal at construction.
    MissingCredential,
    /// The call failed or produced no image, including unusable input.
    Generation,
}

/// Errors that can occur while transforming an image.
#[derive(Debug, thiserror::Error)]
pub enum ImageGenError {
    /// API key absent or blank.
    #[error("API key is not set: {0}")]
    MissingCredential(String),

    /// Caller input could not be turned into a request.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// API rejected the credential.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit or quota exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Request did not complete within the configured timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// Prompt or output was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// The response carried no image part.
    #[error("no image was generated in the response")]
    NoImage,

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g. saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ImageGenError {
    /// Returns the stable kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingCredential(_) => ErrorKind::MissingCredential,
            _ => ErrorKind::Generation,
        }
    }

    /// Returns true if this is a generation failure.
    pub fn is_generation_error(&self) -> bool {
        self.kind() == ErrorKind::Generation
    }

    /// Returns a message fit for display to end users.
    ///
    /// Generation failures collapse to [`GENERATION_FAILED_MESSAGE`]; the
    /// upstream detail stays available through `Display` and `source()`.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Generation => GENERATION_FAILED_MESSAGE.to_string(),
            _ => self.to_string(),
        }
    }

    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_)
        )
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            Self::Timeout(_) => Some(Duration::from_secs(1)),
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for image generation operations.
pub type Result<T> = std::result::Result<T, ImageGenError>;

/// Reads a numeric `Retry-After` header, in seconds.
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Extracts a readable message from an API error body and redacts key material.
pub(crate) fn sanitize_error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    redact_api_key(&message)
}

fn redact_api_key(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find("key=") {
        out.push_str(&rest[..idx + 4]);
        out.push_str("[REDACTED]");
        rest = &rest[idx + 4..];
        let end = rest
            .find(|c: char| c == '&' || c == '"' || c.is_whitespace())
            .unwrap_or(rest.len());
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ImageGenError::MissingCredential("API_KEY".into()).kind(),
            ErrorKind::MissingCredential
        );
        assert_eq!(
            ImageGenError::InvalidInput("empty".into()).kind(),
            ErrorKind::Generation
        );
        assert_eq!(ImageGenError::NoImage.kind(), ErrorKind::Generation);
        assert_eq!(
            ImageGenError::Auth("bad key".into()).kind(),
            ErrorKind::Generation
        );
        assert!(ImageGenError::Api {
            status: 500,
            message: "boom".into()
        }
        .is_generation_error());
    }

    #[test]
    fn test_user_message_hides_cause() {
        let err = ImageGenError::Api {
            status: 500,
            message: "internal stack trace".into(),
        };
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
        assert!(!err.user_message().contains("stack trace"));
        assert!(err.to_string().contains("internal stack trace"));

        let err = ImageGenError::InvalidInput("image payload is empty".into());
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);

        let err = ImageGenError::MissingCredential("set API_KEY".into());
        assert_eq!(err.user_message(), "API key is not set: set API_KEY");
    }

    #[test]
    fn test_is_retryable() {
        assert!(ImageGenError::RateLimited { retry_after: None }.is_retryable());
        assert!(ImageGenError::Timeout(Duration::from_secs(30)).is_retryable());

        assert!(!ImageGenError::Auth("bad key".into()).is_retryable());
        assert!(!ImageGenError::ContentBlocked("nsfw".into()).is_retryable());
        assert!(!ImageGenError::NoImage.is_retryable());
        assert!(!ImageGenError::Decode("bad base64".into()).is_retryable());
    }

    #[test]
    fn test_retry_after() {
        let rate_limited = ImageGenError::RateLimited {
            retry_after: Some(Duration::from_secs(60)),
        };
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

        let timeout = ImageGenError::Timeout(Duration::from_secs(30));
        assert_eq!(timeout.retry_after(), Some(Duration::from_secs(1)));

        assert_eq!(ImageGenError::NoImage.retry_after(), None);
    }

    #[test]
    fn test_sanitize_extracts_json_message() {
        let body = r#"{"error":{"code":400,"message":"Image too large","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(sanitize_error_message(body), "Image too large");
    }

    #[test]
    fn test_sanitize_redacts_key() {
        let msg = sanitize_error_message("bad request to /models?key=AIzaSecret123&alt=json");
        assert_eq!(msg, "bad request to /models?key=[REDACTED]&alt=json");
        assert!(!msg.contains("AIzaSecret123"));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = reqwest::header::HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);
        headers.insert(reqwest::header::RETRY_AFTER, "17".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(17));
    }
}
