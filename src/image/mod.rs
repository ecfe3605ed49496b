//! Image transformation module.

mod client;
mod provider;
mod types;
mod wire;

pub use client::ImageTransformClient;
pub use provider::{ImageTransformer, ImageTransformerExt};
pub use types::{
    is_image_mime_type, parse_data_url, strip_data_url_prefix, to_data_url, GeneratedImage,
    ImageFormat, ImageInput, TransformRequest,
};
