//! CLI for transforming product photos with Gemini.

use anyhow::Context;
use clap::Parser;
use product_imagegen::{
    ClientConfig, ImageFormat, ImageGenError, ImageInput, ImageTransformClient, ImageTransformer,
    ImageTransformerExt, TransformRequest,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "prodshot")]
#[command(about = "Transform a product photo with a text prompt via Gemini")]
#[command(version)]
struct Cli {
    /// Input image (PNG, JPEG or WebP)
    input: PathBuf,

    /// Instruction describing the desired result
    #[arg(short, long)]
    prompt: String,

    /// Output file path; extension follows the returned format if omitted
    #[arg(short, long)]
    output: PathBuf,

    /// Model identifier (defaults to IMAGEGEN_MODEL or gemini-2.5-flash-image-preview)
    #[arg(short, long)]
    model: Option<String>,

    /// MIME type of the input, when it cannot be detected
    #[arg(long)]
    mime: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Retries on rate limiting or network errors
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<ImageGenError>() {
            Some(gen_err) if gen_err.is_generation_error() => {
                anyhow::bail!("{} ({gen_err})", gen_err.user_message())
            }
            _ => Err(e),
        },
    }
}

fn detect_mime(path: &Path, bytes: &[u8], explicit: Option<&str>) -> anyhow::Result<String> {
    if let Some(mime) = explicit {
        return Ok(mime.to_string());
    }
    ImageFormat::from_magic_bytes(bytes)
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(ImageFormat::from_extension)
        })
        .map(|f| f.mime_type().to_string())
        .with_context(|| {
            format!(
                "cannot detect image type of {}; pass --mime",
                path.display()
            )
        })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut builder = ClientConfig::builder();
    if let Some(model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let client = ImageTransformClient::new(builder.build()?)?;

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;
    let mime = detect_mime(&cli.input, &bytes, cli.mime.as_deref())?;
    let request = TransformRequest::new(ImageInput::from_bytes(&bytes, mime)?, cli.prompt);

    let image = client.transform_with_retries(&request, cli.retries).await?;

    let output = if cli.output.extension().is_none() {
        match image.format() {
            Some(format) => cli.output.with_extension(format.extension()),
            None => cli.output,
        }
    } else {
        cli.output
    };
    image.save(&output)?;

    if cli.json {
        let result = serde_json::json!({
            "success": true,
            "output": output.display().to_string(),
            "mime_type": image.mime_type,
            "model": image.model,
            "duration_ms": image.duration_ms,
            "text": image.text,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Generated image: {} ({}) via {}",
            output.display(),
            image.mime_type,
            client.model()
        );
        if let Some(text) = &image.text {
            println!("{text}");
        }
        if let Some(duration) = image.duration_ms {
            println!("Duration: {}ms", duration);
        }
    }

    Ok(())
}
