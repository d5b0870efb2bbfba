//! Direction classifiers
//!
//! Pure functions mapping continuous detector outputs (pupil ratios, eye opening
//! ratios, head angles) to discrete labels.

use serde::{Deserialize, Serialize};

use crate::types::{GazeDirection, HeadOrientation};

/// Gaze is `right` at or below this horizontal ratio
pub const GAZE_RIGHT_MAX_RATIO: f64 = 0.50;

/// Gaze is `left` at or above this horizontal ratio
pub const GAZE_LEFT_MIN_RATIO: f64 = 0.80;

/// Mean eye opening ratio above which the eyes are considered closed
pub const BLINK_RATIO_THRESHOLD: f64 = 3.8;

/// Head yaw magnitude (degrees) below which the head faces forward
pub const YAW_THRESHOLD_DEG: f64 = 7.0;

/// Head pitch magnitude (degrees) below which the head faces forward
pub const PITCH_THRESHOLD_DEG: f64 = 7.0;

/// Thresholds used by the classifiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub gaze_right_max_ratio: f64,
    pub gaze_left_min_ratio: f64,
    pub blink_ratio: f64,
    pub yaw_deg: f64,
    pub pitch_deg: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            gaze_right_max_ratio: GAZE_RIGHT_MAX_RATIO,
            gaze_left_min_ratio: GAZE_LEFT_MIN_RATIO,
            blink_ratio: BLINK_RATIO_THRESHOLD,
            yaw_deg: YAW_THRESHOLD_DEG,
            pitch_deg: PITCH_THRESHOLD_DEG,
        }
    }
}

/// Classify horizontal gaze from the mean pupil ratio
///
/// The center band `(0.50, 0.80)` is asymmetric around 0.5; it comes from the
/// pupil calibration and is kept as-is.
pub fn classify_gaze(horizontal_ratio: f64, thresholds: &ClassifierThresholds) -> GazeDirection {
    if horizontal_ratio <= thresholds.gaze_right_max_ratio {
        GazeDirection::Right
    } else if horizontal_ratio >= thresholds.gaze_left_min_ratio {
        GazeDirection::Left
    } else {
        GazeDirection::Center
    }
}

/// Eyes are closed when the mean opening ratio of both eyes exceeds the threshold
pub fn is_blinking(blink_ratio: f64, thresholds: &ClassifierThresholds) -> bool {
    blink_ratio > thresholds.blink_ratio
}

/// Classify head orientation from yaw and pitch in degrees
///
/// Horizontal deviation takes precedence over vertical. Angles exactly on a
/// threshold are not forward. Non-finite input falls back to `Forward`.
pub fn classify_head_orientation(
    yaw: f64,
    pitch: f64,
    thresholds: &ClassifierThresholds,
) -> HeadOrientation {
    let yaw_limit = thresholds.yaw_deg;
    let pitch_limit = thresholds.pitch_deg;

    if yaw.abs() < yaw_limit && pitch.abs() < pitch_limit {
        HeadOrientation::Forward
    } else if yaw >= yaw_limit {
        HeadOrientation::Right
    } else if yaw <= -yaw_limit {
        HeadOrientation::Left
    } else if pitch >= pitch_limit {
        HeadOrientation::Up
    } else if pitch <= -pitch_limit {
        HeadOrientation::Down
    } else {
        HeadOrientation::Forward
    }
}
