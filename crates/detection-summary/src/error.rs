//! Summary Error Types

use thiserror::Error;

/// Errors raised while building or validating a detection summary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// A class carried a negative count
    #[error("invalid input: class '{class}' has negative count {count}")]
    InvalidInput { class: String, count: i64 },
}
