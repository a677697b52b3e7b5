//! Application Error Types

use alerting::TableError;
use thiserror::Error;

/// Errors that stop the driver
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("Invalid density table: {0}")]
    Table(#[from] TableError),

    #[error("Model confidence {0}% is outside 25..=100")]
    InvalidConfidence(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to write decision: {0}")]
    Output(#[from] serde_json::Error),
}
