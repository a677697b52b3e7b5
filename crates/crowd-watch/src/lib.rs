//! Crowd Watch
//!
//! Reads per-frame detection output from an external crowd-counting or
//! violence model, classifies each frame and raises alarm alerts.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod records;

pub use config::{AppConfig, LogFormat, SourceKind, Task};
pub use error::AppError;
pub use pipeline::{FramePipeline, RunSummary};

use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr; stdout carries the decisions.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}
