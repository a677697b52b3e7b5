//! Detection records emitted by the external detector

use detection_summary::DetectionSummary;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors for a single input line
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed detection record: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Raw per-box output: the model's class table plus the class id of each box
#[derive(Debug, Clone, Deserialize)]
pub struct RawDetections {
    pub names: BTreeMap<u32, String>,
    #[serde(default)]
    pub classes: Vec<u32>,
}

/// Parse one JSON line into a summary.
///
/// Accepts either a count map (`{"people": 5}`) or raw detections
/// (`{"names": {"0": "people"}, "classes": [0, 0]}`). Counts are not
/// validated here.
pub fn parse_record(line: &str) -> Result<DetectionSummary, RecordError> {
    let value: serde_json::Value = serde_json::from_str(line)?;

    if value.get("names").is_some_and(|names| names.is_object()) {
        let raw: RawDetections = serde_json::from_str(line)?;
        return Ok(DetectionSummary::from_class_ids(&raw.names, &raw.classes));
    }

    Ok(serde_json::from_value(value)?)
}
