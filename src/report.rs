//! Session reports
//!
//! Assembles a point-in-time snapshot of a session (timing, per-stream modal
//! summaries, focus analysis) and persists it as JSON.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregator::SessionAggregator;
use crate::error::FocusError;
use crate::summary::ModalSummary;
use crate::types::{SessionId, SessionState};
use crate::{FLUX_VERSION, PRODUCER_NAME};

/// Default directory reports are written to
pub const DEFAULT_REPORTS_DIR: &str = "session_reports";

/// Report producer metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
}

impl Default for ReportProducer {
    fn default() -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: FLUX_VERSION.to_string(),
        }
    }
}

/// Modal summaries of the three signal streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSummaries {
    pub gaze: ModalSummary,
    pub head_pose: ModalSummary,
    pub emotion: ModalSummary,
}

impl Default for StreamSummaries {
    fn default() -> Self {
        Self {
            gaze: ModalSummary::no_data(),
            head_pose: ModalSummary::no_data(),
            emotion: ModalSummary::no_data(),
        }
    }
}

/// Focus analysis section of a report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FocusAnalysis {
    /// Accumulated fusion increments
    pub focused_frames: f64,
    pub total_frames: u64,
    pub valid_frames: u64,
    pub tracking_quality: f64,
    pub focus_percentage: f64,
}

/// Snapshot of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: SessionId,
    #[serde(default)]
    pub producer: ReportProducer,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub summaries: StreamSummaries,
    pub focus_analysis: FocusAnalysis,
}

impl SessionReport {
    /// Assemble a report from a session's aggregator and stream summaries
    ///
    /// A running session is reported up to `generated_at`; an ended session uses
    /// its recorded end time.
    pub fn assemble(
        session_id: SessionId,
        aggregator: &SessionAggregator,
        summaries: StreamSummaries,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, FocusError> {
        let (start_time, end_time) = match aggregator.state() {
            SessionState::Idle => return Err(FocusError::NoSession),
            SessionState::Running { started_at } => (started_at, generated_at),
            SessionState::Ended {
                started_at,
                ended_at,
            } => (started_at, ended_at),
        };

        let counters = aggregator.counters();

        Ok(Self {
            session_id,
            producer: ReportProducer::default(),
            start_time,
            end_time,
            duration_seconds: duration_seconds(start_time, end_time),
            summaries,
            focus_analysis: FocusAnalysis {
                focused_frames: counters.focus_frames,
                total_frames: counters.total_frames,
                valid_frames: counters.valid_frames,
                tracking_quality: counters.tracking_quality,
                focus_percentage: aggregator.focus_percentage(),
            },
        })
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, FocusError> {
        serde_json::to_string_pretty(self).map_err(FocusError::JsonError)
    }

    pub fn from_json(json: &str) -> Result<Self, FocusError> {
        serde_json::from_str(json).map_err(FocusError::JsonError)
    }

    /// File name used when the caller does not supply one
    pub fn default_filename(&self) -> String {
        format!(
            "session_report_{}_{}.json",
            self.end_time.format("%Y%m%d_%H%M%S"),
            self.session_id.short()
        )
    }
}

/// Seconds from `start` to `end`, never negative
fn duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = end - start;
    let seconds = match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => elapsed.num_milliseconds() as f64 / 1_000.0,
    };
    seconds.max(0.0)
}

/// Directory-backed report persistence
///
/// Files are created, never overwritten. A caller-chosen name that already
/// exists is an error. The default name is reused when the file on disk holds
/// the same report, and otherwise gets a numeric suffix.
#[derive(Debug, Clone)]
pub struct ReportStore {
    dir: PathBuf,
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new(DEFAULT_REPORTS_DIR)
    }
}

impl ReportStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a report and return its path
    pub fn save(
        &self,
        report: &SessionReport,
        filename: Option<&str>,
    ) -> Result<PathBuf, FocusError> {
        fs::create_dir_all(&self.dir)?;
        let bytes = serde_json::to_vec_pretty(report)?;

        let path = match filename {
            Some(name) => {
                let path = self.dir.join(name);
                write_new(&path, &bytes)?;
                path
            }
            None => self.save_default(report, &bytes)?,
        };

        info!(
            session_id = %report.session_id,
            path = %path.display(),
            "session report saved"
        );
        Ok(path)
    }

    fn save_default(&self, report: &SessionReport, bytes: &[u8]) -> Result<PathBuf, FocusError> {
        let base = report.default_filename();
        let stem = base.trim_end_matches(".json");

        let mut path = self.dir.join(&base);
        let mut suffix = 0u32;
        loop {
            match write_new(&path, bytes) {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if fs::read(&path)? == bytes {
                        debug!(path = %path.display(), "identical report already saved");
                        return Ok(path);
                    }
                }
                Err(e) => return Err(e.into()),
            }
            suffix += 1;
            path = self.dir.join(format!("{stem}_{suffix}.json"));
        }
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<SessionReport, FocusError> {
        let json = fs::read_to_string(path)?;
        SessionReport::from_json(&json)
    }
}

fn write_new(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()
}
