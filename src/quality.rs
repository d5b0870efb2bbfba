//! Tracking quality bookkeeping for the frame-supply loop
//!
//! The capture loop observes every frame it reads, including frames it never hands
//! to a session. The ratio of frames with usable tracking to frames observed is the
//! tracking quality passed to [`crate::FocusSession::set_tracking_quality`].

use serde::{Deserialize, Serialize};

use crate::types::FrameRecord;

/// Observed/valid frame counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingQualityMeter {
    observed: u64,
    valid: u64,
}

impl TrackingQualityMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one frame read by the loop
    pub fn observe(&mut self, valid: bool) {
        self.observed += 1;
        if valid {
            self.valid += 1;
        }
    }

    /// Count a classified frame; it is valid with a head pose or located pupils
    pub fn observe_frame(&mut self, frame: &FrameRecord) {
        self.observe(frame.is_valid());
    }

    pub fn observed(&self) -> u64 {
        self.observed
    }

    pub fn valid(&self) -> u64 {
        self.valid
    }

    /// Fraction of observed frames with usable tracking, 0 when nothing was observed
    pub fn quality(&self) -> f64 {
        if self.observed == 0 {
            return 0.0;
        }
        self.valid as f64 / self.observed as f64
    }
}
