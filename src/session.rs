//! Focus session
//!
//! A [`FocusSession`] owns everything one subject's session needs: the aggregator,
//! the three stream trackers, the fusion rules and the report store. It is a plain
//! owned value; callers that share it across threads go through
//! [`crate::registry::SessionRegistry`].

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::aggregator::SessionAggregator;
use crate::config::FocusConfig;
use crate::error::FocusError;
use crate::fusion::FrameFusion;
use crate::report::{ReportStore, SessionReport, StreamSummaries};
use crate::summary::{gaze_tracker, ModalSummaryTracker};
use crate::types::{
    Emotion, FrameObservation, FrameRecord, GazeLabel, HeadOrientation, RawFrame,
    SessionCounters, SessionId, SessionState,
};

/// One subject's attention session
#[derive(Debug, Clone)]
pub struct FocusSession {
    id: SessionId,
    config: FocusConfig,
    fusion: FrameFusion,
    aggregator: SessionAggregator,
    gaze: ModalSummaryTracker<GazeLabel>,
    head_pose: ModalSummaryTracker<HeadOrientation>,
    emotion: ModalSummaryTracker<Emotion>,
    store: ReportStore,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FocusSession {
    /// Create an idle session with the default configuration
    pub fn new() -> Self {
        Self::build(SessionId::new(), FocusConfig::default())
    }

    /// Create an idle session with a validated configuration
    pub fn with_config(config: FocusConfig) -> Result<Self, FocusError> {
        Self::with_id(SessionId::new(), config)
    }

    pub fn with_id(id: SessionId, config: FocusConfig) -> Result<Self, FocusError> {
        config.validate()?;
        Ok(Self::build(id, config))
    }

    fn build(id: SessionId, config: FocusConfig) -> Self {
        Self {
            id,
            fusion: FrameFusion::new(config.fusion),
            aggregator: SessionAggregator::with_low_quality_threshold(
                config.aggregation.low_quality_threshold,
            ),
            gaze: gaze_tracker(),
            head_pose: ModalSummaryTracker::new(),
            emotion: ModalSummaryTracker::new(),
            store: ReportStore::new(config.reports_dir.clone()),
            config,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.aggregator.state()
    }

    pub fn counters(&self) -> SessionCounters {
        self.aggregator.counters()
    }

    pub fn start_session(&mut self) {
        self.start_session_at(Utc::now());
    }

    /// Start (or restart) the session, clearing counters and stream summaries
    pub fn start_session_at(&mut self, at: DateTime<Utc>) {
        self.aggregator.start(at);
        self.gaze.clear();
        self.head_pose.clear();
        self.emotion.clear();
        info!(session_id = %self.id, started_at = %at, "session started");
    }

    /// Record one frame of classified detector output
    pub fn record_frame(&mut self, frame: &FrameRecord) -> Result<FrameObservation, FocusError> {
        let head_orientation = frame.head_orientation();
        let gaze_direction = frame.gaze_direction();
        let valid = frame.is_valid();
        let outcome = self.fusion.fuse(head_orientation, gaze_direction);

        self.aggregator.record(valid, outcome)?;

        if let Some(direction) = gaze_direction {
            self.gaze.record(direction.into());
        }
        let is_blinking = frame.gaze.map(|g| g.is_blinking()).unwrap_or(false);
        if is_blinking {
            self.gaze.record(GazeLabel::Blink);
        }
        if let Some(orientation) = head_orientation {
            self.head_pose.record(orientation);
        }
        let emotion = frame.emotion.and_then(|e| e.label);
        if let Some(label) = emotion {
            self.emotion.record(label);
        }

        Ok(FrameObservation {
            head_orientation,
            gaze_direction,
            is_blinking,
            emotion,
            valid,
            increment: outcome.increment,
            focused: outcome.focused,
        })
    }

    /// Classify raw detector output with this session's thresholds and record it
    pub fn record_raw_frame(&mut self, raw: &RawFrame) -> Result<FrameObservation, FocusError> {
        let frame = FrameRecord::from_raw(raw, &self.config.classifier);
        self.record_frame(&frame)
    }

    pub fn set_tracking_quality(&mut self, quality: f64) {
        self.aggregator.set_tracking_quality(quality);
    }

    pub fn focus_percentage(&self) -> f64 {
        self.aggregator.focus_percentage()
    }

    pub fn end_session(&mut self) -> Result<(), FocusError> {
        self.end_session_at(Utc::now())
    }

    pub fn end_session_at(&mut self, at: DateTime<Utc>) -> Result<(), FocusError> {
        self.aggregator.end(at)?;
        let counters = self.aggregator.counters();
        info!(
            session_id = %self.id,
            total_frames = counters.total_frames,
            valid_frames = counters.valid_frames,
            focus_percentage = self.aggregator.focus_percentage(),
            "session ended"
        );
        Ok(())
    }

    pub fn summaries(&self) -> StreamSummaries {
        StreamSummaries {
            gaze: self.gaze.summarize(),
            head_pose: self.head_pose.summarize(),
            emotion: self.emotion.summarize(),
        }
    }

    pub fn generate_report(&self) -> Result<SessionReport, FocusError> {
        self.generate_report_at(Utc::now())
    }

    /// Snapshot the session; a still-running session is reported up to `now`
    pub fn generate_report_at(&self, now: DateTime<Utc>) -> Result<SessionReport, FocusError> {
        let report = SessionReport::assemble(self.id, &self.aggregator, self.summaries(), now)?;
        debug!(session_id = %self.id, "report generated");
        Ok(report)
    }

    /// Generate a report and write it to the configured reports directory
    pub fn try_save_report(&self, filename: Option<&str>) -> Result<PathBuf, FocusError> {
        let report = self.generate_report()?;
        self.store.save(&report, filename)
    }

    /// Like [`Self::try_save_report`], reporting failure as `false`
    pub fn save_report(&self, filename: Option<&str>) -> bool {
        match self.try_save_report(filename) {
            Ok(_) => true,
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "failed to save session report");
                false
            }
        }
    }
}
