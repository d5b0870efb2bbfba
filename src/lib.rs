//! Focus Flux - Signal-fusion and session-scoring engine for attention tracking
//!
//! Flux turns per-frame detector outputs (head pose angles, pupil ratios, emotion
//! labels) into a session-level focus report through a deterministic pipeline:
//! direction classification → frame fusion → modal summaries → tracking-quality
//! compensated aggregation → report.
//!
//! ## Modules
//!
//! - **Classifiers**: gaze direction, blink and head orientation labels
//! - **Fusion**: per-frame focus increment from head and gaze labels
//! - **Sessions**: lifecycle, counters, stream summaries and reports
//! - **Registry**: many concurrent sessions addressed by id
//!
//! ## Example
//! ```
//! use focus_flux::{FocusSession, PoseAngles, PupilReading, RawFrame};
//!
//! let mut session = FocusSession::new();
//! session.start_session();
//! session.record_raw_frame(&RawFrame {
//!     head_pose: Some(PoseAngles { yaw: 1.5, pitch: -2.0, roll: 0.0 }),
//!     pupils: Some(PupilReading { horizontal_ratio: 0.62, vertical_ratio: 0.5, blink_ratio: 3.1 }),
//!     emotion: None,
//! })?;
//! session.set_tracking_quality(1.0);
//! session.end_session()?;
//!
//! let report = session.generate_report()?;
//! assert_eq!(report.focus_analysis.focus_percentage, 100.0);
//! # Ok::<(), focus_flux::FocusError>(())
//! ```

pub mod aggregator;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fusion;
pub mod quality;
pub mod registry;
pub mod report;
pub mod session;
pub mod summary;
pub mod types;

pub use config::FocusConfig;
pub use error::FocusError;
pub use quality::TrackingQualityMeter;
pub use registry::SessionRegistry;
pub use report::{ReportStore, SessionReport};
pub use session::FocusSession;
pub use types::{
    Emotion, EmotionResult, FrameObservation, FrameRecord, GazeDirection, GazeResult,
    HeadOrientation, HeadPoseResult, PoseAngles, PupilReading, RawFrame, SessionCounters,
    SessionId, SessionState,
};

/// Flux version embedded in all reports
pub const FLUX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "focus-flux";
