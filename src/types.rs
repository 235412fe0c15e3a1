//! Core data types shared by the loader, the compositor and the overlays

use crate::error::{ChartError, ChartResult};
use chrono::NaiveDate;
use serde::Deserialize;

/// One dated value read from a marker file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub date: NaiveDate,
    pub value: f64,
}

impl Measurement {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Dated external event drawn as a vertical annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modification {
    pub date: NaiveDate,
    /// Problem-type tag, used for filtering and coloring
    pub problem: String,
    pub label: String,
}

/// How a marker's series is interpreted and drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Line through successive points
    Connected,
    /// State that holds until the next dated change
    Horizontal,
    /// Count of occurrences per calendar day
    Event,
}

/// Which bounds of a reference range are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Guide at the minimum
    AboveMin,
    /// Guide at the maximum
    BelowMax,
    /// Guides at both bounds plus a dotted midpoint
    Middle,
    #[default]
    None,
}

/// Clinically normal `(min, max)` bounds of a marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalRange {
    pub min: f64,
    pub max: f64,
}

impl NormalRange {
    /// Parse a `"min-max"` string such as `"3.5-5.1"`
    pub fn parse(marker: &str, text: &str) -> ChartResult<Self> {
        let invalid = || ChartError::InvalidNormalRange {
            marker: marker.to_string(),
            range: text.to_string(),
        };
        let (min, max) = text.split_once('-').ok_or_else(invalid)?;
        let min: f64 = min.trim().parse().map_err(|_| invalid())?;
        let max: f64 = max.trim().parse().map_err(|_| invalid())?;
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(invalid());
        }
        Ok(Self { min, max })
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_range_parse() {
        let range = NormalRange::parse("Potassium", "3.5-5.1").unwrap();
        assert_eq!(range.min, 3.5);
        assert_eq!(range.max, 5.1);
        assert_eq!(NormalRange::parse("x", " 1 - 3 ").unwrap().midpoint(), 2.0);
    }

    #[test]
    fn test_normal_range_rejects_garbage() {
        for text in ["", "5", "a-b", "5-3", "1-2-3"] {
            assert!(
                matches!(
                    NormalRange::parse("m", text),
                    Err(ChartError::InvalidNormalRange { .. })
                ),
                "{text:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_target_policy_names() {
        let policy: TargetPolicy = serde_yaml::from_str("below_max").unwrap();
        assert_eq!(policy, TargetPolicy::BelowMax);
        let policy: TargetPolicy = serde_yaml::from_str("middle").unwrap();
        assert_eq!(policy, TargetPolicy::Middle);
    }
}
