//! Detection Summaries
//!
//! Per-frame class-name → count mappings produced by the external detector,
//! plus the validation every summary goes through before classification.

mod error;
mod summary;

pub use error::SummaryError;
pub use summary::{DetectionSummary, PEOPLE_CLASS, VIOLENCE_CLASS};
