//! Creative Intake — operator CLI for the creative validation engine.
//!
//! Validates a creative submission (file upload or pasted tag) against its
//! declared ad type and input type, then prints the structured intake report
//! the preview renderer consumes. Exits nonzero when the submission cannot
//! proceed.

use anyhow::{bail, Context};
use clap::Parser;
use intake_core::types::{AdType, CreativeAsset, FileAsset, InputType, PixelDimensions};
use intake_engine::{evaluate, probe};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "creative-intake")]
#[command(about = "Validate ad creatives and classify third-party/VAST tags")]
#[command(version)]
struct Cli {
    /// Ad type: DISPLAY or VIDEO
    #[arg(long, env = "CREATIVE_INTAKE__AD_TYPE", value_parser = parse_ad_type)]
    ad_type: AdType,

    /// Input type: DISPLAY_IMAGE, DISPLAY_HTML5_ZIP, DISPLAY_THIRD_PARTY_TAG,
    /// VIDEO_FILE, or VIDEO_VAST_TAG
    #[arg(long, env = "CREATIVE_INTAKE__INPUT_TYPE", value_parser = parse_input_type)]
    input_type: InputType,

    /// Path to the uploaded creative (file input types)
    #[arg(long)]
    file: Option<PathBuf>,

    /// Pasted tag text (tag input types)
    #[arg(long)]
    tag: Option<String>,

    /// Read tag text from a file instead of the command line
    #[arg(long, conflicts_with = "tag")]
    tag_file: Option<PathBuf>,

    /// Auxiliary tracking tag (repeatable, up to 5)
    #[arg(long = "tracking-tag")]
    tracking_tags: Vec<String>,
}

fn parse_ad_type(s: &str) -> Result<AdType, String> {
    match s.to_ascii_uppercase().as_str() {
        "DISPLAY" => Ok(AdType::Display),
        "VIDEO" => Ok(AdType::Video),
        other => Err(format!("unknown ad type: {other}")),
    }
}

fn parse_input_type(s: &str) -> Result<InputType, String> {
    match s.to_ascii_uppercase().as_str() {
        "DISPLAY_IMAGE" => Ok(InputType::DisplayImage),
        "DISPLAY_HTML5_ZIP" => Ok(InputType::DisplayHtml5Zip),
        "DISPLAY_THIRD_PARTY_TAG" => Ok(InputType::DisplayThirdPartyTag),
        "VIDEO_FILE" => Ok(InputType::VideoFile),
        "VIDEO_VAST_TAG" => Ok(InputType::VideoVastTag),
        other => Err(format!("unknown input type: {other}")),
    }
}

/// MIME guess from the filename, mirroring what a browser would declare.
fn mime_for(filename: &str) -> &'static str {
    match filename.rsplit_once('.').map(|(_, e)| e.to_ascii_lowercase()) {
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        Some(ext) if ext == "png" => "image/png",
        Some(ext) if ext == "gif" => "image/gif",
        Some(ext) if ext == "tiff" => "image/tiff",
        Some(ext) if ext == "zip" => "application/zip",
        Some(ext) if ext == "mp4" => "video/mp4",
        Some(ext) if ext == "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "creative_intake=info,intake_engine=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let asset = if cli.input_type.is_tag() {
        let text = match (cli.tag, cli.tag_file) {
            (Some(text), _) => text,
            (None, Some(path)) => std::fs::read_to_string(&path)
                .with_context(|| format!("reading tag text from {}", path.display()))?,
            (None, None) => bail!("{} submissions need --tag or --tag-file", cli.input_type),
        };
        CreativeAsset::Tag(text)
    } else {
        let Some(path) = cli.file else {
            bail!("{} submissions need --file", cli.input_type);
        };
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();
        let dimensions = probe::image_dimensions(&bytes)
            .map(|(width, height)| PixelDimensions { width, height });
        info!(filename = %filename, size_bytes = bytes.len(), "loaded creative");
        CreativeAsset::File(FileAsset {
            mime_type: mime_for(&filename).to_string(),
            size_bytes: bytes.len() as u64,
            filename,
            dimensions,
        })
    };

    let report = evaluate(cli.ad_type, cli.input_type, &asset, &cli.tracking_tags)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.can_submit {
        std::process::exit(1);
    }
    Ok(())
}
