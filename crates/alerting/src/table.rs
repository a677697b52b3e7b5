//! Crowd Density Threshold Table

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Crowd density level, derived from the people count only
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DensityLevel {
    /// No people class in the frame, or a count no band covers
    #[default]
    None,
    VeryLow,
    Low,
    Medium,
    High,
}

impl DensityLevel {
    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            DensityLevel::None => "None",
            DensityLevel::VeryLow => "Very Low",
            DensityLevel::Low => "Low",
            DensityLevel::Medium => "Medium",
            DensityLevel::High => "High",
        }
    }
}

impl fmt::Display for DensityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors in a threshold table definition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("density table has no bands")]
    Empty,

    #[error("band {index} has min {min} >= max {max}")]
    InvertedBand { index: usize, min: u64, max: u64 },

    #[error("band {index} overlaps or precedes the band before it")]
    Overlap { index: usize },

    #[error("band {index} is unbounded but is not the last band")]
    UnboundedNotLast { index: usize },
}

/// One half-open interval `[min, max)` of people counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityBand {
    pub level: DensityLevel,
    /// Inclusive lower bound
    pub min: u64,
    /// Exclusive upper bound, `None` for unbounded
    #[serde(default)]
    pub max: Option<u64>,
    /// Whether counts in this band raise an alert
    #[serde(default)]
    pub alert: bool,
}

impl DensityBand {
    pub fn new(level: DensityLevel, min: u64, max: Option<u64>, alert: bool) -> Self {
        Self {
            level,
            min,
            max,
            alert,
        }
    }

    /// Whether `count` falls inside this band
    pub fn contains(&self, count: u64) -> bool {
        count >= self.min && self.max.map_or(true, |max| count < max)
    }
}

/// Ordered, non-overlapping list of density bands.
///
/// Lookup picks at most one band, so two levels can never fire for the same
/// count. Counts between bands are left uncovered on purpose when a table
/// has gaps (see [`DensityTable::legacy`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DensityBand>", into = "Vec<DensityBand>")]
pub struct DensityTable {
    bands: Vec<DensityBand>,
}

impl DensityTable {
    /// Create a table, checking ordering and bounds
    pub fn new(bands: Vec<DensityBand>) -> Result<Self, TableError> {
        if bands.is_empty() {
            return Err(TableError::Empty);
        }

        for (index, band) in bands.iter().enumerate() {
            if let Some(max) = band.max {
                if band.min >= max {
                    return Err(TableError::InvertedBand {
                        index,
                        min: band.min,
                        max,
                    });
                }
            }

            if index == 0 {
                continue;
            }
            match bands[index - 1].max {
                None => return Err(TableError::UnboundedNotLast { index: index - 1 }),
                Some(prev_max) if band.min < prev_max => {
                    return Err(TableError::Overlap { index })
                }
                Some(_) => {}
            }
        }

        Ok(Self { bands })
    }

    /// Gap-free table: `[0,1)` very low, `[1,10)` low, `[10,50)` medium,
    /// `[50,∞)` high. Medium and high alert.
    pub fn contiguous() -> Self {
        Self {
            bands: vec![
                DensityBand::new(DensityLevel::VeryLow, 0, Some(1), false),
                DensityBand::new(DensityLevel::Low, 1, Some(10), false),
                DensityBand::new(DensityLevel::Medium, 10, Some(50), true),
                DensityBand::new(DensityLevel::High, 50, None, true),
            ],
        }
    }

    /// Thresholds exactly as the Streamlit demo applied them: `n == 0`,
    /// `1 < n < 10`, `10 < n < 50`, `n > 50`. Counts 1, 10 and 50 match
    /// no band.
    pub fn legacy() -> Self {
        Self {
            bands: vec![
                DensityBand::new(DensityLevel::VeryLow, 0, Some(1), false),
                DensityBand::new(DensityLevel::Low, 2, Some(10), false),
                DensityBand::new(DensityLevel::Medium, 11, Some(50), true),
                DensityBand::new(DensityLevel::High, 51, None, true),
            ],
        }
    }

    /// The band containing `count`, if any
    pub fn lookup(&self, count: u64) -> Option<&DensityBand> {
        self.bands.iter().find(|band| band.contains(count))
    }

    pub fn bands(&self) -> &[DensityBand] {
        &self.bands
    }
}

impl Default for DensityTable {
    fn default() -> Self {
        Self::contiguous()
    }
}

impl TryFrom<Vec<DensityBand>> for DensityTable {
    type Error = TableError;

    fn try_from(bands: Vec<DensityBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<DensityTable> for Vec<DensityBand> {
    fn from(table: DensityTable) -> Self {
        table.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_of(table: &DensityTable, count: u64) -> Option<DensityLevel> {
        table.lookup(count).map(|band| band.level)
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(DensityTable::new(DensityTable::contiguous().bands().to_vec()).is_ok());
        assert!(DensityTable::new(DensityTable::legacy().bands().to_vec()).is_ok());
    }

    #[test]
    fn test_contiguous_boundaries() {
        let table = DensityTable::contiguous();
        assert_eq!(level_of(&table, 0), Some(DensityLevel::VeryLow));
        assert_eq!(level_of(&table, 1), Some(DensityLevel::Low));
        assert_eq!(level_of(&table, 9), Some(DensityLevel::Low));
        assert_eq!(level_of(&table, 10), Some(DensityLevel::Medium));
        assert_eq!(level_of(&table, 49), Some(DensityLevel::Medium));
        assert_eq!(level_of(&table, 50), Some(DensityLevel::High));
        assert_eq!(level_of(&table, u64::MAX), Some(DensityLevel::High));
    }

    #[test]
    fn test_legacy_gaps() {
        let table = DensityTable::legacy();
        assert_eq!(level_of(&table, 0), Some(DensityLevel::VeryLow));
        assert_eq!(level_of(&table, 1), None);
        assert_eq!(level_of(&table, 2), Some(DensityLevel::Low));
        assert_eq!(level_of(&table, 10), None);
        assert_eq!(level_of(&table, 11), Some(DensityLevel::Medium));
        assert_eq!(level_of(&table, 50), None);
        assert_eq!(level_of(&table, 51), Some(DensityLevel::High));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(DensityTable::new(vec![]), Err(TableError::Empty));
    }

    #[test]
    fn test_rejects_inverted_band() {
        let bands = vec![DensityBand::new(DensityLevel::Low, 5, Some(5), false)];
        assert_eq!(
            DensityTable::new(bands),
            Err(TableError::InvertedBand {
                index: 0,
                min: 5,
                max: 5
            })
        );
    }

    #[test]
    fn test_rejects_overlap() {
        let bands = vec![
            DensityBand::new(DensityLevel::Low, 0, Some(10), false),
            DensityBand::new(DensityLevel::Medium, 9, None, true),
        ];
        assert_eq!(
            DensityTable::new(bands),
            Err(TableError::Overlap { index: 1 })
        );
    }

    #[test]
    fn test_rejects_unbounded_before_last() {
        let bands = vec![
            DensityBand::new(DensityLevel::Low, 0, None, false),
            DensityBand::new(DensityLevel::High, 100, None, true),
        ];
        assert_eq!(
            DensityTable::new(bands),
            Err(TableError::UnboundedNotLast { index: 0 })
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: DensityTable = serde_json::from_str(
            r#"[{"level": "low", "min": 0, "max": 20}, {"level": "high", "min": 20, "alert": true}]"#,
        )
        .unwrap();
        assert_eq!(ok.bands().len(), 2);
        assert!(ok.lookup(25).unwrap().alert);

        let bad = serde_json::from_str::<DensityTable>(
            r#"[{"level": "low", "min": 0}, {"level": "high", "min": 20}]"#,
        );
        assert!(bad.is_err());
    }
}
