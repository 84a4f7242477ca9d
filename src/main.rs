//! clipfetch - video metadata extraction with strategy fallback
//!
//! Prints the metadata record for one URL as JSON (or a short summary),
//! trying every configured strategy before giving up.

use anyhow::Result;
use clap::Parser;
use clipfetch::{ExtractorSettings, HybridExtractor, VideoMetadata};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clipfetch", version, about)]
struct Args {
    /// Video URL to extract
    #[arg(required_unless_present = "platforms")]
    url: Option<String>,

    /// Ask strategies that support it to download the media as well
    #[arg(long)]
    download: bool,

    /// Settings file (TOML); defaults to the per-user config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a human-readable summary instead of JSON
    #[arg(long)]
    summary: bool,

    /// Truncate the description to this many characters
    #[arg(long, default_value_t = 500)]
    description_limit: usize,

    /// List domains that get the restricted-platform chain and exit
    #[arg(long)]
    platforms: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    let default_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = ExtractorSettings::load(args.config.as_deref())?;
    let extractor = HybridExtractor::new(settings)?;

    if args.platforms {
        for domain in extractor.classifier().domains() {
            println!("{}", domain);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let Some(url) = args.url else {
        return Ok(ExitCode::FAILURE);
    };

    // Ctrl-C abandons the run at the next strategy boundary
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    match extractor.extract_with_cancel(&url, args.download, &cancel).await {
        Ok(extraction) => {
            let meta = &extraction.metadata;
            if args.summary {
                print_summary(meta, args.description_limit);
            } else {
                let mut value = serde_json::to_value(meta)?;
                value["description"] = meta.description_truncated(args.description_limit).into();
                value["strategy"] = extraction.report.strategy.clone().into();
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_summary(meta: &VideoMetadata, description_limit: usize) {
    println!("Title:    {}", meta.title());
    println!("Uploader: {}", meta.uploader());
    println!("Platform: {}", meta.platform());
    if let Some(duration) = meta.duration() {
        println!("Duration: {}s", duration);
    }
    if let Some(views) = meta.view_count() {
        println!("Views:    {}", views);
    }
    if let Some(note) = meta.note() {
        println!("Note:     {}", note);
    }
    let description = meta.description_truncated(description_limit);
    if !description.is_empty() {
        println!("\n{}\n", description);
    }
    println!("Formats:");
    for format in meta.formats() {
        println!(
            "  {:<12} {:<22} {:<4} {}",
            format.format_id,
            format.quality,
            format.ext,
            format.url.as_deref().unwrap_or("(no direct link)")
        );
    }
}
