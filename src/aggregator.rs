//! Session aggregation
//!
//! Owns the frame counters and lifecycle state of one session and computes the
//! tracking-quality-adjusted focus percentage.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::FocusError;
use crate::fusion::FusionOutcome;
use crate::types::{SessionCounters, SessionState};

/// Tracking quality below which the focus percentage is dampened
pub const LOW_QUALITY_THRESHOLD: f64 = 0.5;

/// Counter and lifecycle owner for one session
#[derive(Debug, Clone)]
pub struct SessionAggregator {
    state: SessionState,
    counters: SessionCounters,
    low_quality_threshold: f64,
}

impl Default for SessionAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionAggregator {
    pub fn new() -> Self {
        Self::with_low_quality_threshold(LOW_QUALITY_THRESHOLD)
    }

    pub fn with_low_quality_threshold(threshold: f64) -> Self {
        Self {
            state: SessionState::Idle,
            counters: SessionCounters::default(),
            low_quality_threshold: threshold,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, SessionState::Running { .. })
    }

    /// Start a new session, discarding any counters from a previous one
    pub fn start(&mut self, at: DateTime<Utc>) {
        if self.is_running() {
            debug!(
                total_frames = self.counters.total_frames,
                "discarding in-progress session counters"
            );
        }
        self.counters = SessionCounters::default();
        self.state = SessionState::Running { started_at: at };
    }

    /// Count one frame
    ///
    /// The fusion outcome of an invalid frame is always unfocused, so focus only
    /// accrues on valid frames.
    pub fn record(&mut self, valid: bool, outcome: FusionOutcome) -> Result<(), FocusError> {
        if !self.is_running() {
            return Err(FocusError::InvalidState {
                operation: "record a frame",
                state: self.state.as_str(),
            });
        }

        self.counters.total_frames += 1;
        if valid {
            self.counters.valid_frames += 1;
            self.counters.focus_frames += outcome.increment;
        }
        Ok(())
    }

    /// Set the externally measured tracking quality, clamped to [0, 1]
    pub fn set_tracking_quality(&mut self, quality: f64) {
        let clamped = if quality.is_nan() {
            0.0
        } else {
            quality.clamp(0.0, 1.0)
        };
        if clamped != quality {
            warn!(quality, clamped, "tracking quality out of range");
        }
        self.counters.tracking_quality = clamped;
    }

    /// Focus percentage adjusted for tracking quality
    ///
    /// Formula:
    /// ```text
    /// raw      = focus_frames / valid_frames * 100
    /// adjusted = raw * (0.5 + quality / 2)   if quality < 0.5
    ///          = raw                         otherwise
    /// ```
    pub fn focus_percentage(&self) -> f64 {
        let counters = &self.counters;
        if counters.valid_frames == 0 {
            return 0.0;
        }

        let raw = (counters.focus_frames / counters.valid_frames as f64) * 100.0;
        if counters.tracking_quality < self.low_quality_threshold {
            raw * (0.5 + counters.tracking_quality / 2.0)
        } else {
            raw
        }
    }

    /// End the session
    ///
    /// Ending an already ended session moves its end time forward. An end time
    /// earlier than the start is rejected and leaves the state untouched.
    pub fn end(&mut self, at: DateTime<Utc>) -> Result<(), FocusError> {
        match self.state {
            SessionState::Idle => Err(FocusError::NoSession),
            SessionState::Running { started_at } | SessionState::Ended { started_at, .. }
                if at < started_at =>
            {
                Err(FocusError::InvalidState {
                    operation: "end a session before its start time",
                    state: self.state.as_str(),
                })
            }
            SessionState::Running { started_at } | SessionState::Ended { started_at, .. } => {
                self.state = SessionState::Ended {
                    started_at,
                    ended_at: at,
                };
                Ok(())
            }
        }
    }
}
