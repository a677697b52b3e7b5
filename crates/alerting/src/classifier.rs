//! Alert Classifier Implementation

use crate::table::{DensityLevel, DensityTable};
use detection_summary::{DetectionSummary, SummaryError, PEOPLE_CLASS, VIOLENCE_CLASS};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Classification outcome for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Crowd density from the people count
    Density(DensityLevel),
    /// Violence detected in the frame
    Violence,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertLevel::Density(level) => write!(f, "Crowd Density: {}", level),
            AlertLevel::Violence => f.write_str("Violence"),
        }
    }
}

/// Per-frame decision handed to the display layer and the alert sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDecision {
    /// Whether the alarm should sound for this frame
    pub should_alert: bool,
    /// Message to display
    pub message: String,
    pub level: AlertLevel,
    /// People count, when the frame carried one
    pub people: Option<u64>,
}

impl AlertDecision {
    fn no_people() -> Self {
        Self {
            should_alert: false,
            message: "No People".to_string(),
            level: AlertLevel::Density(DensityLevel::None),
            people: None,
        }
    }

    fn violence(people: Option<u64>) -> Self {
        Self {
            should_alert: true,
            message: "Violence Detected".to_string(),
            level: AlertLevel::Violence,
            people,
        }
    }

    fn density(level: DensityLevel, count: u64, should_alert: bool) -> Self {
        Self {
            should_alert,
            message: format!("No of people: {}", count),
            level: AlertLevel::Density(level),
            people: Some(count),
        }
    }
}

/// Stateless classifier from detection summaries to alert decisions
#[derive(Debug, Clone, Default)]
pub struct AlertClassifier {
    table: DensityTable,
    /// Only flag violence when its count is positive, not on key presence
    violence_requires_count: bool,
}

impl AlertClassifier {
    /// Create a classifier over the given density table
    pub fn new(table: DensityTable) -> Self {
        info!("Creating alert classifier with {} density bands", table.bands().len());
        Self {
            table,
            violence_requires_count: false,
        }
    }

    /// Require a positive violence count instead of just the class key.
    ///
    /// Models that report every class with an explicit zero would otherwise
    /// flag violence on every frame.
    pub fn with_violence_requires_count(mut self, enabled: bool) -> Self {
        self.violence_requires_count = enabled;
        self
    }

    /// Classify one frame.
    ///
    /// A violence class in the summary outranks the people count for level
    /// and message. An absent people class yields "No People", while an explicit
    /// zero goes through the density table. Fails with
    /// [`SummaryError::InvalidInput`] if any count is negative.
    pub fn classify(&self, summary: &DetectionSummary) -> Result<AlertDecision, SummaryError> {
        summary.validate()?;

        // Validated above, so every count is non-negative
        let people = summary.get(PEOPLE_CLASS).map(i64::unsigned_abs);
        let violence = match summary.get(VIOLENCE_CLASS) {
            Some(count) => !self.violence_requires_count || count > 0,
            None => false,
        };

        let decision = match (violence, people) {
            (true, people) => AlertDecision::violence(people),
            (false, Some(count)) => match self.table.lookup(count) {
                Some(band) => AlertDecision::density(band.level, count, band.alert),
                None => {
                    debug!("People count {} falls between density bands", count);
                    AlertDecision::density(DensityLevel::None, count, false)
                }
            },
            (false, None) => AlertDecision::no_people(),
        };

        debug!(
            "Classified frame: {} ({}), alert={}",
            decision.level, decision.message, decision.should_alert
        );
        Ok(decision)
    }
}
