//! Detection Summary

use crate::error::SummaryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Class name the crowd-counting model uses for people
pub const PEOPLE_CLASS: &str = "people";

/// Class name the violence model uses for violent activity
pub const VIOLENCE_CLASS: &str = "violence";

/// Count of detected instances per class name for a single frame.
///
/// Counts are stored as received from the detector, so a malformed
/// collaborator can hand over negative values; [`DetectionSummary::validate`]
/// rejects those instead of clamping them. A class with no detections may be
/// missing entirely or present with an explicit zero, and callers must treat
/// the two differently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionSummary {
    counts: BTreeMap<String, i64>,
}

impl DetectionSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a summary from raw detector output.
    ///
    /// `names` is the model's class table (id → name) and `class_ids` holds the
    /// class id of every detected box. Every name in the table appears in the
    /// result, with an explicit zero when no box carries its id. When several
    /// ids share one name their boxes are summed under that name. Ids missing
    /// from the table are skipped.
    pub fn from_class_ids(names: &BTreeMap<u32, String>, class_ids: &[u32]) -> Self {
        let mut counts: BTreeMap<String, i64> =
            names.values().map(|name| (name.clone(), 0)).collect();

        for id in class_ids {
            match names.get(id) {
                Some(name) => {
                    if let Some(count) = counts.get_mut(name) {
                        *count += 1;
                    }
                }
                None => debug!("Ignoring detection with unknown class id {}", id),
            }
        }

        Self { counts }
    }

    /// Set the count for a class, returning the summary for chaining
    pub fn with(mut self, class: impl Into<String>, count: i64) -> Self {
        self.insert(class, count);
        self
    }

    /// Set the count for a class
    pub fn insert(&mut self, class: impl Into<String>, count: i64) {
        self.counts.insert(class.into(), count);
    }

    /// Count for a class, `None` if the class is absent
    pub fn get(&self, class: &str) -> Option<i64> {
        self.counts.get(class).copied()
    }

    /// Whether the class is present (including with an explicit zero)
    pub fn contains(&self, class: &str) -> bool {
        self.counts.contains_key(class)
    }

    /// Number of classes in the summary
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the summary has no classes at all
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Check that every count is non-negative.
    ///
    /// Reports the first offending class in name order.
    pub fn validate(&self) -> Result<(), SummaryError> {
        match self.counts.iter().find(|&(_, &count)| count < 0) {
            Some((class, &count)) => Err(SummaryError::InvalidInput {
                class: class.clone(),
                count,
            }),
            None => Ok(()),
        }
    }
}

impl<K: Into<String>> FromIterator<(K, i64)> for DetectionSummary {
    fn from_iter<I: IntoIterator<Item = (K, i64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names() -> BTreeMap<u32, String> {
        BTreeMap::from([(0, "people".to_string()), (1, "bag".to_string())])
    }

    #[test]
    fn test_absent_vs_explicit_zero() {
        let absent = DetectionSummary::new();
        let zero = DetectionSummary::new().with(PEOPLE_CLASS, 0);

        assert!(!absent.contains(PEOPLE_CLASS));
        assert_eq!(absent.get(PEOPLE_CLASS), None);
        assert!(zero.contains(PEOPLE_CLASS));
        assert_eq!(zero.get(PEOPLE_CLASS), Some(0));
    }

    #[test]
    fn test_from_class_ids_counts_per_name() {
        let summary = DetectionSummary::from_class_ids(&names(), &[0, 0, 1, 0]);
        assert_eq!(summary.get("people"), Some(3));
        assert_eq!(summary.get("bag"), Some(1));
    }

    #[test]
    fn test_from_class_ids_keeps_explicit_zeros() {
        let summary = DetectionSummary::from_class_ids(&names(), &[]);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get("people"), Some(0));
        assert_eq!(summary.get("bag"), Some(0));
    }

    #[test]
    fn test_from_class_ids_ignores_unknown_ids() {
        let summary = DetectionSummary::from_class_ids(&names(), &[7, 0]);
        assert_eq!(summary.get("people"), Some(1));
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_from_class_ids_sums_shared_names() {
        let names = BTreeMap::from([
            (0, "people".to_string()),
            (1, "people".to_string()),
            (2, "violence".to_string()),
        ]);
        let summary = DetectionSummary::from_class_ids(&names, &[0, 1, 1, 0, 1]);
        assert_eq!(summary.get("people"), Some(5));
        assert_eq!(summary.get("violence"), Some(0));
        assert_eq!(summary.len(), 2);
    }

    #[test]
    fn test_validate_rejects_negative() {
        let summary = DetectionSummary::new().with("bag", 2).with(PEOPLE_CLASS, -3);
        assert_eq!(
            summary.validate(),
            Err(SummaryError::InvalidInput {
                class: "people".to_string(),
                count: -3,
            })
        );
    }

    #[test]
    fn test_deserialize_from_count_map() {
        let summary: DetectionSummary =
            serde_json::from_str(r#"{"people": 12, "violence": 0}"#).unwrap();
        assert_eq!(summary.get(PEOPLE_CLASS), Some(12));
        assert_eq!(summary.get(VIOLENCE_CLASS), Some(0));
        assert!(summary.validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_non_negative_counts_validate(counts in proptest::collection::btree_map("[a-z]{1,8}", 0i64..10_000, 0..6)) {
            let summary: DetectionSummary = counts.into_iter().collect();
            prop_assert!(summary.validate().is_ok());
        }

        #[test]
        fn prop_any_negative_count_fails(n in i64::MIN..0) {
            let summary = DetectionSummary::new().with(PEOPLE_CLASS, n);
            prop_assert!(summary.validate().is_err());
        }
    }
}
