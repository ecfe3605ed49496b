#![warn(missing_docs)]
//! Product image generation via Gemini.
//!
//! Sends a product photo and a text instruction to the Gemini
//! `generateContent` endpoint and returns the first image in the response as
//! a data URL.
//!
//! # Quick Start
//!
//! ```no_run
//! use product_imagegen::{ClientConfig, ImageTransformClient};
//!
//! #[tokio::main]
//! async fn main() -> product_imagegen::Result<()> {
//!     let config = ClientConfig::builder().api_key("your-key").build()?;
//!     let client = ImageTransformClient::new(config)?;
//!
//!     let data_url = client
//!         .generate_product_image(
//!             "data:image/png;base64,iVBORw0KGgo...",
//!             "image/png",
//!             "Place the product on a marble countertop with soft morning light",
//!         )
//!         .await?;
//!     println!("generated {} bytes of data URL", data_url.len());
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every failure maps onto a stable [`ErrorKind`]: `MissingCredential` when
//! no API key is configured, and `Generation` when the input is unusable, the
//! remote call fails, or the response holds no image. The variant
//! keeps the upstream cause; [`ImageGenError::user_message`] gives the fixed
//! text suitable for end users.
//!
//! # Features
//!
//! - `cli` (default): the `prodshot` command-line tool

pub mod config;
mod error;
pub mod image;

pub use config::{ClientConfig, ClientConfigBuilder, ImageModel};
pub use error::{ErrorKind, ImageGenError, Result, GENERATION_FAILED_MESSAGE};
pub use image::{
    GeneratedImage, ImageFormat, ImageInput, ImageTransformClient, ImageTransformer,
    ImageTransformerExt, TransformRequest,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::ClientConfig;
    pub use crate::error::{ImageGenError, Result};
    pub use crate::image::{
        GeneratedImage, ImageInput, ImageTransformClient, ImageTransformer, ImageTransformerExt,
        TransformRequest,
    };
}
