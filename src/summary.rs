//! Modal summaries of signal streams
//!
//! One tracker per stream (gaze, head pose, emotion) accumulates the labels emitted
//! during a session and reports the most frequent one.

use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::types::{Emotion, GazeLabel, HeadOrientation};

/// Most-common label reported for a stream with no observations
pub const NO_DATA_LABEL: &str = "none";

/// A label that can be tracked on a signal stream
pub trait StreamLabel: Copy + Eq + Hash {
    fn as_str(&self) -> &'static str;
}

impl StreamLabel for GazeLabel {
    fn as_str(&self) -> &'static str {
        GazeLabel::as_str(self)
    }
}

impl StreamLabel for HeadOrientation {
    fn as_str(&self) -> &'static str {
        HeadOrientation::as_str(self)
    }
}

impl StreamLabel for Emotion {
    fn as_str(&self) -> &'static str {
        Emotion::as_str(self)
    }
}

/// Modal summary of one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalSummary {
    /// Most frequent label, or `"none"` when nothing was observed
    pub most_common_label: String,
    /// Number of labels recorded on the stream
    #[serde(default)]
    pub total_observations: u64,
    /// Stream-specific counts (e.g. `blink` on the gaze stream)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub auxiliary_counts: BTreeMap<String, u64>,
}

impl ModalSummary {
    /// The "no data" sentinel
    pub fn no_data() -> Self {
        Self {
            most_common_label: NO_DATA_LABEL.to_string(),
            total_observations: 0,
            auxiliary_counts: BTreeMap::new(),
        }
    }

    pub fn has_data(&self) -> bool {
        self.total_observations > 0
    }
}

/// Label frequency tracker for one stream
///
/// Labels are kept in first-seen order so that ties resolve to the label
/// observed earliest.
#[derive(Debug, Clone)]
pub struct ModalSummaryTracker<L: StreamLabel> {
    /// Distinct labels with their counts, in first-seen order
    counts: Vec<(L, u64)>,
    /// Position of each label in `counts`
    index: HashMap<L, usize>,
    total: u64,
    /// Labels reported in the auxiliary counts even when zero
    auxiliary: Vec<L>,
}

impl<L: StreamLabel> Default for ModalSummaryTracker<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: StreamLabel> ModalSummaryTracker<L> {
    pub fn new() -> Self {
        Self {
            counts: Vec::new(),
            index: HashMap::new(),
            total: 0,
            auxiliary: Vec::new(),
        }
    }

    /// Tracker that also reports the given labels' counts in its summary
    pub fn with_auxiliary(auxiliary: Vec<L>) -> Self {
        Self {
            auxiliary,
            ..Self::new()
        }
    }

    pub fn record(&mut self, label: L) {
        match self.index.get(&label) {
            Some(&position) => self.counts[position].1 += 1,
            None => {
                self.index.insert(label, self.counts.len());
                self.counts.push((label, 1));
            }
        }
        self.total += 1;
    }

    pub fn count(&self, label: L) -> u64 {
        self.index
            .get(&label)
            .map(|&position| self.counts[position].1)
            .unwrap_or(0)
    }

    pub fn len(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Most frequent label; the earliest-seen label wins a tie
    pub fn most_common(&self) -> Option<L> {
        let mut best: Option<(L, u64)> = None;
        for &(label, count) in &self.counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label)
    }

    /// Label counts in first-seen order
    pub fn distribution(&self) -> &[(L, u64)] {
        &self.counts
    }

    pub fn summarize(&self) -> ModalSummary {
        let Some(most_common) = self.most_common() else {
            return ModalSummary::no_data();
        };

        let auxiliary_counts = self
            .auxiliary
            .iter()
            .map(|label| (label.as_str().to_string(), self.count(*label)))
            .collect();

        ModalSummary {
            most_common_label: most_common.as_str().to_string(),
            total_observations: self.total,
            auxiliary_counts,
        }
    }

    pub fn clear(&mut self) {
        self.counts.clear();
        self.index.clear();
        self.total = 0;
    }
}

/// Gaze stream tracker that reports the blink count
pub fn gaze_tracker() -> ModalSummaryTracker<GazeLabel> {
    ModalSummaryTracker::with_auxiliary(vec![GazeLabel::Blink])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_returns_no_data() {
        let tracker: ModalSummaryTracker<Emotion> = ModalSummaryTracker::new();
        let summary = tracker.summarize();
        assert_eq!(summary, ModalSummary::no_data());
        assert_eq!(summary.most_common_label, "none");
        assert!(!summary.has_data());

        // Auxiliary counts are not reported without data either
        assert_eq!(gaze_tracker().summarize(), ModalSummary::no_data());
    }

    #[test]
    fn test_most_common() {
        let mut tracker = ModalSummaryTracker::new();
        tracker.record(HeadOrientation::Left);
        tracker.record(HeadOrientation::Forward);
        tracker.record(HeadOrientation::Forward);
        tracker.record(HeadOrientation::Down);

        let summary = tracker.summarize();
        assert_eq!(summary.most_common_label, "forward");
        assert_eq!(summary.total_observations, 4);
        assert!(summary.auxiliary_counts.is_empty());
    }

    #[test]
    fn test_tie_resolves_to_first_seen() {
        let mut tracker = ModalSummaryTracker::new();
        tracker.record(Emotion::Sad);
        tracker.record(Emotion::Happy);
        tracker.record(Emotion::Happy);
        tracker.record(Emotion::Sad);

        assert_eq!(tracker.most_common(), Some(Emotion::Sad));

        tracker.record(Emotion::Happy);
        assert_eq!(tracker.most_common(), Some(Emotion::Happy));
    }

    #[test]
    fn test_gaze_blink_count() {
        let mut tracker = gaze_tracker();
        tracker.record(GazeLabel::Center);
        tracker.record(GazeLabel::Blink);
        tracker.record(GazeLabel::Center);
        tracker.record(GazeLabel::Left);
        tracker.record(GazeLabel::Blink);

        let summary = tracker.summarize();
        assert_eq!(summary.most_common_label, "center");
        assert_eq!(summary.auxiliary_counts.get("blink"), Some(&2));
        assert_eq!(summary.total_observations, 5);
    }

    #[test]
    fn test_blink_reported_even_when_zero() {
        let mut tracker = gaze_tracker();
        tracker.record(GazeLabel::Right);

        let summary = tracker.summarize();
        assert_eq!(summary.auxiliary_counts.get("blink"), Some(&0));
    }

    #[test]
    fn test_distribution_order_and_clear() {
        let mut tracker = ModalSummaryTracker::new();
        tracker.record(GazeLabel::Right);
        tracker.record(GazeLabel::Center);
        tracker.record(GazeLabel::Right);

        assert_eq!(
            tracker.distribution(),
            &[(GazeLabel::Right, 2), (GazeLabel::Center, 1)]
        );
        assert_eq!(tracker.count(GazeLabel::Left), 0);

        tracker.clear();
        assert!(tracker.is_empty());
        assert_eq!(tracker.most_common(), None);
    }

    #[test]
    fn test_summary_json_omits_empty_auxiliary() {
        let mut tracker = ModalSummaryTracker::new();
        tracker.record(Emotion::Neutral);

        let json = serde_json::to_value(tracker.summarize()).unwrap();
        assert_eq!(json["most_common_label"], "Neutral");
        assert!(json.get("auxiliary_counts").is_none());
    }
}
