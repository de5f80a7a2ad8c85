/// Flood risk classification.
///
/// A station's risk is judged against its own recent behavior: the current
/// gage height is compared with the median of the trailing daily values.
/// The classification is memoryless, so a reading hovering at a margin can
/// alternate between adjacent levels on successive cycles.

use serde::Deserialize;

use crate::model::{ConfigError, RiskLevel};

/// Margins above the recent median, in feet.
///
/// Stage levels in ascending order:
///   low <= median + low_margin < medium <= median + high_margin < high
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub low_margin_ft: f64,
    pub high_margin_ft: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low_margin_ft: 0.5,
            high_margin_ft: 1.5,
        }
    }
}

impl RiskThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = self.low_margin_ft <= self.high_margin_ft;
        if !self.low_margin_ft.is_finite() || !self.high_margin_ft.is_finite() || !ordered {
            return Err(ConfigError::InvalidThresholds {
                low: self.low_margin_ft,
                high: self.high_margin_ft,
            });
        }
        Ok(())
    }
}

/// Classifies the current gage height against the recent median.
///
/// Returns `RiskLevel::Unknown` if either input is missing.
pub fn classify(current: Option<f64>, median: Option<f64>, thresholds: &RiskThresholds) -> RiskLevel {
    let (Some(current), Some(median)) = (current, median) else {
        return RiskLevel::Unknown;
    };

    if current <= median + thresholds.low_margin_ft {
        RiskLevel::Low
    } else if current <= median + thresholds.high_margin_ft {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> RiskThresholds {
        RiskThresholds::default()
    }

    #[test]
    fn test_missing_current_is_unknown() {
        for median in [0.0, 2.0, -5.0, 1e6] {
            assert_eq!(classify(None, Some(median), &defaults()), RiskLevel::Unknown);
        }
    }

    #[test]
    fn test_missing_median_is_unknown() {
        for current in [0.0, 3.0, -5.0, 1e6] {
            assert_eq!(classify(Some(current), None, &defaults()), RiskLevel::Unknown);
        }
        assert_eq!(classify(None, None, &defaults()), RiskLevel::Unknown);
    }

    #[test]
    fn test_low_margin_boundary_is_inclusive() {
        let median = 2.0;
        assert_eq!(classify(Some(median + 0.5), Some(median), &defaults()), RiskLevel::Low);
        assert_eq!(classify(Some(median + 0.500001), Some(median), &defaults()), RiskLevel::Medium);
    }

    #[test]
    fn test_high_margin_boundary_is_inclusive() {
        let median = 2.0;
        assert_eq!(classify(Some(median + 1.5), Some(median), &defaults()), RiskLevel::Medium);
        assert_eq!(classify(Some(median + 1.500001), Some(median), &defaults()), RiskLevel::High);
    }

    #[test]
    fn test_below_median_is_low() {
        assert_eq!(classify(Some(1.0), Some(4.0), &defaults()), RiskLevel::Low);
    }

    #[test]
    fn test_one_foot_over_median_is_medium_and_two_feet_is_high() {
        assert_eq!(classify(Some(3.0), Some(2.0), &defaults()), RiskLevel::Medium);
        assert_eq!(classify(Some(4.0), Some(2.0), &defaults()), RiskLevel::High);
    }

    #[test]
    fn test_custom_margins() {
        let tight = RiskThresholds { low_margin_ft: 0.1, high_margin_ft: 0.2 };
        assert_eq!(classify(Some(2.15), Some(2.0), &tight), RiskLevel::Medium);
        assert_eq!(classify(Some(2.25), Some(2.0), &tight), RiskLevel::High);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(defaults().validate().is_ok());
        let inverted = RiskThresholds { low_margin_ft: 2.0, high_margin_ft: 1.0 };
        assert!(inverted.validate().is_err());
        let nan = RiskThresholds { low_margin_ft: f64::NAN, high_margin_ft: 1.0 };
        assert!(nan.validate().is_err());
    }
}
