//! Engine configuration
//!
//! All sections fall back to the built-in defaults for missing fields, so a
//! partial JSON document only needs the values it overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::LOW_QUALITY_THRESHOLD;
use crate::classifier::ClassifierThresholds;
use crate::error::FocusError;
use crate::fusion::FusionWeights;
use crate::report::DEFAULT_REPORTS_DIR;

/// Aggregation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Tracking quality below which the focus percentage is dampened
    pub low_quality_threshold: f64,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            low_quality_threshold: LOW_QUALITY_THRESHOLD,
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    pub classifier: ClassifierThresholds,
    pub fusion: FusionWeights,
    pub aggregation: AggregationConfig,
    pub reports_dir: PathBuf,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            classifier: ClassifierThresholds::default(),
            fusion: FusionWeights::default(),
            aggregation: AggregationConfig::default(),
            reports_dir: PathBuf::from(DEFAULT_REPORTS_DIR),
        }
    }
}

impl FocusConfig {
    pub fn from_json(json: &str) -> Result<Self, FocusError> {
        let config: FocusConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, FocusError> {
        serde_json::to_string_pretty(self).map_err(FocusError::JsonError)
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FocusError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FocusError> {
        let classifier = &self.classifier;
        check_unit_range("classifier.gaze_right_max_ratio", classifier.gaze_right_max_ratio)?;
        check_unit_range("classifier.gaze_left_min_ratio", classifier.gaze_left_min_ratio)?;
        if classifier.gaze_right_max_ratio >= classifier.gaze_left_min_ratio {
            return Err(FocusError::ConfigError(format!(
                "classifier.gaze_right_max_ratio ({}) must be below classifier.gaze_left_min_ratio ({})",
                classifier.gaze_right_max_ratio, classifier.gaze_left_min_ratio
            )));
        }
        check_positive("classifier.blink_ratio", classifier.blink_ratio)?;
        check_positive("classifier.yaw_deg", classifier.yaw_deg)?;
        check_positive("classifier.pitch_deg", classifier.pitch_deg)?;

        check_unit_range("fusion.full", self.fusion.full)?;
        check_unit_range("fusion.partial", self.fusion.partial)?;
        if self.fusion.partial > self.fusion.full {
            return Err(FocusError::ConfigError(format!(
                "fusion.partial ({}) must not exceed fusion.full ({})",
                self.fusion.partial, self.fusion.full
            )));
        }

        check_unit_range(
            "aggregation.low_quality_threshold",
            self.aggregation.low_quality_threshold,
        )
    }
}

fn check_unit_range(name: &str, value: f64) -> Result<(), FocusError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FocusError::ConfigError(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), FocusError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FocusError::ConfigError(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_are_valid() {
        let config = FocusConfig::default();
        config.validate().unwrap();
        assert_eq!(config.classifier.gaze_right_max_ratio, 0.50);
        assert_eq!(config.classifier.gaze_left_min_ratio, 0.80);
        assert_eq!(config.classifier.blink_ratio, 3.8);
        assert_eq!(config.classifier.yaw_deg, 7.0);
        assert_eq!(config.fusion.partial, 0.7);
        assert_eq!(config.aggregation.low_quality_threshold, 0.5);
        assert_eq!(config.reports_dir, PathBuf::from("session_reports"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            FocusConfig::from_json(r#"{"classifier": {"yaw_deg": 10.0}, "reports_dir": "out"}"#)
                .unwrap();

        assert_eq!(config.classifier.yaw_deg, 10.0);
        assert_eq!(config.classifier.pitch_deg, 7.0);
        assert_eq!(config.fusion, FusionWeights::default());
        assert_eq!(config.reports_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(FocusConfig::from_json("{}").unwrap(), FocusConfig::default());
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = FocusConfig::from_json(r#"{"fusion": {"partial": 1.5}}"#).unwrap_err();
        assert!(matches!(err, FocusError::ConfigError(_)));

        let err = FocusConfig::from_json(
            r#"{"classifier": {"gaze_right_max_ratio": 0.9, "gaze_left_min_ratio": 0.8}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FocusError::ConfigError(_)));

        let err = FocusConfig::from_json(r#"{"classifier": {"yaw_deg": 0.0}}"#).unwrap_err();
        assert!(matches!(err, FocusError::ConfigError(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            FocusConfig::from_json("not json"),
            Err(FocusError::JsonError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focus.json");
        fs::write(&path, r#"{"aggregation": {"low_quality_threshold": 0.4}}"#).unwrap();

        let config = FocusConfig::load(&path).unwrap();
        assert_eq!(config.aggregation.low_quality_threshold, 0.4);

        assert!(matches!(
            FocusConfig::load(dir.path().join("missing.json")),
            Err(FocusError::IoError(_))
        ));
    }
}
