use clap::Parser;
use rgenmedia::logger::{self, LogLevel, LoggerConfig};
use rgenmedia::{
    AspectRatio, EnvAccessGate, GenConfig, GenerationKind, GenerationRequest, ReferenceImage,
    Studio, UserAdvice,
};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// Generate an image or a video from a text prompt.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// What to generate: image or video
    #[arg(value_parser = GenerationKind::from_str)]
    kind: GenerationKind,
    /// Aspect ratio such as 16:9 (defaults per kind)
    #[arg(long, value_parser = AspectRatio::from_str)]
    ratio: Option<AspectRatio>,
    /// Reference image to guide the generation
    #[arg(long = "ref")]
    reference: Option<PathBuf>,
    /// The prompt
    #[arg(required = true, trailing_var_arg = true)]
    prompt: Vec<String>,
}

fn mime_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv_loaded = dotenv::dotenv().is_ok();

    let level = env::var("RUST_LOG")
        .map(|value| LogLevel::parse_or_info(&value))
        .unwrap_or(LogLevel::Info);
    logger::init_with_config(LoggerConfig::development().with_level(level))?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = GenConfig::from_env();
    logger::log_config_info(&config);

    let mut request = GenerationRequest::new(cli.prompt.join(" "), cli.kind);
    if let Some(ratio) = cli.ratio {
        request = request.with_aspect_ratio(ratio);
    }
    if let Some(path) = cli.reference {
        let bytes = tokio::fs::read(&path).await?;
        request = request.with_reference_image(ReferenceImage::new(bytes, mime_for_path(&path)));
    }

    let studio = Studio::new(config, Arc::new(EnvAccessGate::default())).await?;

    match studio.generate(&request).await {
        Ok(outcome) => {
            log::info!("🎉 {} ready: {}", outcome.entry.kind, outcome.entry.id);
            println!("{}", serde_json::to_string_pretty(&outcome.entry)?);
        }
        Err(e) => {
            match e.advice() {
                UserAdvice::Reauthenticate => {
                    log::error!("🔑 Access problem: select a key with video access and retry")
                }
                UserAdvice::RevisePrompt => {
                    log::error!("🛡️  Blocked by the safety filter; rephrase the prompt")
                }
                UserAdvice::ResetParameters => {
                    log::error!("🔧 The service rejected the request parameters")
                }
                UserAdvice::Show(message) => log::error!("{}", message),
            }
            return Err(e.into());
        }
    }

    log::info!("📚 History now holds {} entries", studio.history().await.len());
    Ok(())
}
