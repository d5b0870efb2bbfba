//! Core types for the Focus Flux engine
//!
//! This module defines the data structures that flow through each stage of the
//! engine: raw detector outputs, classified per-frame results, session counters
//! and session state.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classifier::{self, ClassifierThresholds};

/// Identifier of one focus session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random session id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Short prefix used in report file names
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Discrete head orientation derived from yaw/pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadOrientation {
    Forward,
    Left,
    Right,
    Up,
    Down,
}

impl HeadOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeadOrientation::Forward => "forward",
            HeadOrientation::Left => "left",
            HeadOrientation::Right => "right",
            HeadOrientation::Up => "up",
            HeadOrientation::Down => "down",
        }
    }
}

/// Discrete horizontal gaze direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeDirection {
    Left,
    Right,
    Center,
}

impl GazeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeDirection::Left => "left",
            GazeDirection::Right => "right",
            GazeDirection::Center => "center",
        }
    }
}

/// Label emitted on the gaze stream: a direction or the `blink` pseudo-label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GazeLabel {
    Left,
    Right,
    Center,
    Blink,
}

impl GazeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GazeLabel::Left => "left",
            GazeLabel::Right => "right",
            GazeLabel::Center => "center",
            GazeLabel::Blink => "blink",
        }
    }
}

impl From<GazeDirection> for GazeLabel {
    fn from(direction: GazeDirection) -> Self {
        match direction {
            GazeDirection::Left => GazeLabel::Left,
            GazeDirection::Right => GazeLabel::Right,
            GazeDirection::Center => GazeLabel::Center,
        }
    }
}

/// Facial emotion label produced by the external classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Emotion {
    Angry,
    Disgust,
    Fear,
    Happy,
    Neutral,
    Sad,
    Surprise,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgust => "Disgust",
            Emotion::Fear => "Fear",
            Emotion::Happy => "Happy",
            Emotion::Neutral => "Neutral",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
        }
    }
}

/// Raw head pose angles in degrees, as returned by the pose regressor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseAngles {
    pub yaw: f64,
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

/// Located-pupil measurements for one frame
///
/// Only produced when both pupils were located; otherwise the caller passes `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PupilReading {
    /// Mean of left/right pupil-to-eye-width ratios (0 = far right, 1 = far left)
    pub horizontal_ratio: f64,
    /// Mean of left/right pupil-to-eye-height ratios
    pub vertical_ratio: f64,
    /// Mean eye width/height opening ratio of both eyes
    pub blink_ratio: f64,
}

/// Classified head pose for one frame
///
/// The orientation is always derived from yaw/pitch at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadPoseResult {
    yaw: f64,
    pitch: f64,
    roll: f64,
    orientation: HeadOrientation,
}

impl HeadPoseResult {
    pub fn from_angles(angles: PoseAngles, thresholds: &ClassifierThresholds) -> Self {
        Self {
            yaw: angles.yaw,
            pitch: angles.pitch,
            roll: angles.roll,
            orientation: classifier::classify_head_orientation(
                angles.yaw,
                angles.pitch,
                thresholds,
            ),
        }
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn roll(&self) -> f64 {
        self.roll
    }

    pub fn orientation(&self) -> HeadOrientation {
        self.orientation
    }
}

/// Classified gaze for one frame
///
/// Ratios and direction are absent exactly when pupils were not located.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GazeResult {
    horizontal_ratio: Option<f64>,
    vertical_ratio: Option<f64>,
    direction: Option<GazeDirection>,
    is_blinking: bool,
}

impl GazeResult {
    pub fn from_pupils(pupils: Option<PupilReading>, thresholds: &ClassifierThresholds) -> Self {
        match pupils {
            Some(reading) => Self {
                horizontal_ratio: Some(reading.horizontal_ratio),
                vertical_ratio: Some(reading.vertical_ratio),
                direction: Some(classifier::classify_gaze(
                    reading.horizontal_ratio,
                    thresholds,
                )),
                is_blinking: classifier::is_blinking(reading.blink_ratio, thresholds),
            },
            None => Self::not_located(),
        }
    }

    /// Gaze tracker ran but did not locate the pupils
    pub fn not_located() -> Self {
        Self {
            horizontal_ratio: None,
            vertical_ratio: None,
            direction: None,
            is_blinking: false,
        }
    }

    pub fn pupils_located(&self) -> bool {
        self.horizontal_ratio.is_some()
    }

    pub fn horizontal_ratio(&self) -> Option<f64> {
        self.horizontal_ratio
    }

    pub fn vertical_ratio(&self) -> Option<f64> {
        self.vertical_ratio
    }

    pub fn direction(&self) -> Option<GazeDirection> {
        self.direction
    }

    pub fn is_blinking(&self) -> bool {
        self.is_blinking
    }
}

/// Emotion classifier output for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmotionResult {
    pub label: Option<Emotion>,
}

/// Classified detector outputs for one frame, consumed immediately by the session
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct FrameRecord {
    pub head_pose: Option<HeadPoseResult>,
    pub gaze: Option<GazeResult>,
    pub emotion: Option<EmotionResult>,
}

impl FrameRecord {
    /// Frame with no face detected: every detector is absent
    pub fn empty() -> Self {
        Self::default()
    }

    /// Classify raw detector outputs into a frame record
    pub fn from_raw(raw: &RawFrame, thresholds: &ClassifierThresholds) -> Self {
        Self {
            head_pose: raw
                .head_pose
                .map(|angles| HeadPoseResult::from_angles(angles, thresholds)),
            gaze: Some(GazeResult::from_pupils(raw.pupils, thresholds)),
            emotion: Some(EmotionResult { label: raw.emotion }),
        }
    }

    /// At least one of head pose or located pupils is available
    pub fn is_valid(&self) -> bool {
        self.head_pose.is_some() || self.gaze.map(|g| g.pupils_located()).unwrap_or(false)
    }

    pub fn head_orientation(&self) -> Option<HeadOrientation> {
        self.head_pose.map(|pose| pose.orientation())
    }

    pub fn gaze_direction(&self) -> Option<GazeDirection> {
        self.gaze.and_then(|gaze| gaze.direction())
    }
}

/// Unclassified detector outputs for one frame, as recorded by a capture loop
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawFrame {
    #[serde(default)]
    pub head_pose: Option<PoseAngles>,
    #[serde(default)]
    pub pupils: Option<PupilReading>,
    #[serde(default)]
    pub emotion: Option<Emotion>,
}

/// Frame counters for one session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionCounters {
    pub total_frames: u64,
    pub valid_frames: u64,
    /// Fractional accumulator of fusion increments
    pub focus_frames: f64,
    /// Externally supplied detector reliability (0-1)
    pub tracking_quality: f64,
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self {
            total_frames: 0,
            valid_frames: 0,
            focus_frames: 0.0,
            tracking_quality: 1.0,
        }
    }
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Running {
        started_at: DateTime<Utc>,
    },
    Ended {
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Running { .. } => "running",
            SessionState::Ended { .. } => "ended",
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionState::Idle => None,
            SessionState::Running { started_at } | SessionState::Ended { started_at, .. } => {
                Some(*started_at)
            }
        }
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        match self {
            SessionState::Ended { ended_at, .. } => Some(*ended_at),
            _ => None,
        }
    }
}

/// Per-frame outcome returned to the host after recording a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameObservation {
    pub head_orientation: Option<HeadOrientation>,
    pub gaze_direction: Option<GazeDirection>,
    pub is_blinking: bool,
    pub emotion: Option<Emotion>,
    pub valid: bool,
    pub increment: f64,
    pub focused: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaze_not_located_has_no_ratios() {
        let gaze = GazeResult::from_pupils(None, &ClassifierThresholds::default());
        assert!(!gaze.pupils_located());
        assert_eq!(gaze.horizontal_ratio(), None);
        assert_eq!(gaze.vertical_ratio(), None);
        assert_eq!(gaze.direction(), None);
        assert!(!gaze.is_blinking());
    }

    #[test]
    fn test_frame_validity() {
        let thresholds = ClassifierThresholds::default();

        assert!(!FrameRecord::empty().is_valid());

        let pupils_only = FrameRecord::from_raw(
            &RawFrame {
                pupils: Some(PupilReading {
                    horizontal_ratio: 0.6,
                    vertical_ratio: 0.5,
                    blink_ratio: 3.0,
                }),
                ..RawFrame::default()
            },
            &thresholds,
        );
        assert!(pupils_only.is_valid());
        assert_eq!(pupils_only.gaze_direction(), Some(GazeDirection::Center));

        let emotion_only = FrameRecord::from_raw(
            &RawFrame {
                emotion: Some(Emotion::Happy),
                ..RawFrame::default()
            },
            &thresholds,
        );
        assert!(!emotion_only.is_valid());
    }

    #[test]
    fn test_raw_frame_deserialization_defaults() {
        let raw: RawFrame =
            serde_json::from_str(r#"{"head_pose": {"yaw": 1.0, "pitch": -2.0}}"#).unwrap();
        assert_eq!(raw.head_pose.unwrap().roll, 0.0);
        assert!(raw.pupils.is_none());
        assert!(raw.emotion.is_none());

        let raw: RawFrame = serde_json::from_str(r#"{"emotion": "Neutral"}"#).unwrap();
        assert_eq!(raw.emotion, Some(Emotion::Neutral));
    }

    #[test]
    fn test_session_id_short() {
        let id = SessionId::new();
        assert_eq!(id.short().len(), 8);
        assert!(id.to_string().starts_with(&id.short()));
    }
}
