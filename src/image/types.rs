//! Core types for image transformation.

use crate::error::{ImageGenError, Result};
use base64::Engine;
use std::path::Path;

/// Well-known image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format (modern, efficient).
    WebP,
}

impl ImageFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Maps a MIME type onto a known format.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        match mime.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Detects image format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        None
    }
}

/// Returns true if `mime` denotes an image (`image/*`).
pub fn is_image_mime_type(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

/// Formats a data URL: `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime_type: &str, base64_data: &str) -> String {
    format!("data:{mime_type};base64,{base64_data}")
}

/// Strips a `data:...;base64,` prefix, keeping everything after the first comma.
///
/// Strings without a comma are returned unchanged (raw payloads).
pub fn strip_data_url_prefix(input: &str) -> &str {
    let input = input.trim();
    match input.split_once(',') {
        Some((_, payload)) => payload,
        None => input,
    }
}

/// Splits a data URL into its MIME type and base64 payload.
///
/// Returns `None` unless the input has the form `data:<mime>;base64,<payload>`.
pub fn parse_data_url(input: &str) -> Option<(&str, &str)> {
    let rest = input.trim().strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    Some((mime, payload))
}

/// The image half of a transform request: base64 payload plus MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    /// Base64 payload, without any data-URL prefix.
    pub data: String,
    /// MIME type of the encoded image.
    pub mime_type: String,
}

impl ImageInput {
    /// Builds an input from a data URL or a raw base64 payload.
    pub fn new(base64_image: &str, mime_type: impl Into<String>) -> Result<Self> {
        let data = strip_data_url_prefix(base64_image);
        if data.is_empty() {
            return Err(ImageGenError::InvalidInput(
                "image payload is empty".into(),
            ));
        }

        let mime_type = mime_type.into();
        if mime_type.trim().is_empty() {
            return Err(ImageGenError::InvalidInput("MIME type is empty".into()));
        }

        Ok(Self {
            data: data.to_string(),
            mime_type,
        })
    }

    /// Builds an input by base64-encoding raw image bytes.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ImageGenError::InvalidInput("image is empty".into()));
        }
        Self::new(
            &base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        )
    }

    /// Builds an input from a data URL, taking the MIME type from its header.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let (mime, payload) = parse_data_url(url).ok_or_else(|| {
            ImageGenError::InvalidInput("expected a data:<mime>;base64,<payload> URL".into())
        })?;
        Self::new(payload, mime)
    }
}

/// A request to transform an image with a text instruction.
#[derive(Debug, Clone)]
pub struct TransformRequest {
    /// The image to transform.
    pub image: ImageInput,
    /// Free-text instruction describing the desired result.
    pub prompt: String,
}

impl TransformRequest {
    /// Creates a new request.
    pub fn new(image: ImageInput, prompt: impl Into<String>) -> Self {
        Self {
            image,
            prompt: prompt.into(),
        }
    }
}

/// An image returned by the generation endpoint.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct GeneratedImage {
    /// Base64 payload exactly as returned.
    pub data: String,
    /// MIME type exactly as returned.
    pub mime_type: String,
    /// Text parts returned alongside the image, joined in order.
    pub text: Option<String>,
    /// Model that produced the image.
    pub model: Option<String>,
    /// Round-trip duration in milliseconds.
    pub duration_ms: Option<u64>,
}

impl GeneratedImage {
    /// Returns the image as a data URL.
    pub fn to_data_url(&self) -> String {
        to_data_url(&self.mime_type, &self.data)
    }

    /// Returns the known format, if the MIME type maps onto one.
    pub fn format(&self) -> Option<ImageFormat> {
        ImageFormat::from_mime_type(&self.mime_type)
    }

    /// Decodes the base64 payload into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(self.data.trim())
            .map_err(|e| ImageGenError::Decode(e.to_string()))
    }

    /// Saves the decoded image to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.decode()?)?;
        Ok(())
    }
}
