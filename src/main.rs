use anyhow::{Context, Result};
use clap::Parser;
use fridgescan::{FridgeService, ScannerConfig};
use std::path::PathBuf;
use tracing::error;

#[derive(Parser, Debug)]
#[command(
    name = "fridgescan",
    about = "Deduplicating food inventory built from fridge scans"
)]
struct Args {
    /// Image files to scan, in order
    images: Vec<PathBuf>,
    /// Override the detection confidence threshold
    #[arg(long)]
    confidence_threshold: Option<f32>,
    /// Override the suppression IoU threshold
    #[arg(long)]
    nms_threshold: Option<f32>,
    /// Override the per-label cooldown window, in seconds
    #[arg(long)]
    cooldown_secs: Option<f32>,
    /// Print the detection history after scanning
    #[arg(long)]
    history: bool,
    /// Print the label -> category table and exit
    #[arg(long)]
    categories: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = ScannerConfig::from_env();
    if let Some(value) = args.confidence_threshold {
        config.detection.confidence_threshold = value;
    }
    if let Some(value) = args.nms_threshold {
        config.detection.nms_threshold = value;
    }
    if let Some(secs) = args.cooldown_secs {
        config.cooldown_duration = std::time::Duration::from_secs_f32(secs);
    }

    // No scoring backend is linked into the CLI build; selection falls
    // through to color segmentation unless an embedder supplies one.
    let service = FridgeService::new(&config, None);

    if args.categories {
        println!("{}", serde_json::to_string_pretty(&service.categories())?);
        return Ok(());
    }

    for path in &args.images {
        let bytes =
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        match service.scan(&bytes).await {
            Ok(outcome) => println!("{}: {}", path.display(), outcome.message),
            // A failed scan stays local to its image.
            Err(err) => error!(image = %path.display(), error = %err, "scan failed"),
        }
    }

    println!("{}", serde_json::to_string_pretty(&service.inventory().await)?);
    if args.history {
        println!("{}", serde_json::to_string_pretty(&service.history().await)?);
    }
    Ok(())
}
