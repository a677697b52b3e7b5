//! Crowd Watch - Main Entry Point

use alerting::AlertDispatcher;
use clap::Parser;
use crowd_watch::{init_logging, AppConfig, FramePipeline, LogFormat};
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "crowd-watch", version, about = "Crowd-density and violence alerts from detection output")]
struct Args {
    /// Config file (defaults to ./crowd-watch.toml if present)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// JSON-lines detection records, `-` for stdin
    #[arg(long, short, default_value = "-")]
    input: String,

    /// Override the configured log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(format) = args.log_format {
        config.log_format = format;
    }
    init_logging(config.log_format);

    info!("=== Crowd Watch v{} ===", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    let classifier = config.classifier()?;
    let dispatcher = AlertDispatcher::spawn(config.alert_sink(), config.alerting.queue_capacity);
    let pipeline = FramePipeline::new(classifier, dispatcher);

    let mut stdout = std::io::stdout();
    let summary = if args.input == "-" {
        info!("Reading detections from stdin");
        pipeline
            .run(BufReader::new(tokio::io::stdin()), &mut stdout)
            .await?
    } else {
        info!("Reading detections from {}", args.input);
        let file = tokio::fs::File::open(&args.input).await?;
        pipeline.run(BufReader::new(file), &mut stdout).await?
    };

    info!("Done: {:?}", summary);
    Ok(())
}
