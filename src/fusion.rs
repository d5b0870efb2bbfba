//! Per-frame focus fusion
//!
//! Combines one frame's head orientation and gaze direction into a weighted focus
//! increment. Either modality's attentive signal counts as partial evidence, full
//! agreement as strong evidence. A missing modality lowers the weight instead of
//! zeroing it.

use serde::{Deserialize, Serialize};

use crate::types::{GazeDirection, HeadOrientation};

/// Increment for a frame where head and gaze agree on attention
pub const FULL_FOCUS_WEIGHT: f64 = 1.0;

/// Increment for a frame where only one modality shows attention
pub const PARTIAL_FOCUS_WEIGHT: f64 = 0.7;

/// Fusion weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionWeights {
    pub full: f64,
    pub partial: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            full: FULL_FOCUS_WEIGHT,
            partial: PARTIAL_FOCUS_WEIGHT,
        }
    }
}

/// Result of fusing one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FusionOutcome {
    pub increment: f64,
    pub focused: bool,
}

impl FusionOutcome {
    pub const UNFOCUSED: FusionOutcome = FusionOutcome {
        increment: 0.0,
        focused: false,
    };

    fn focused(increment: f64) -> Self {
        Self {
            increment,
            focused: true,
        }
    }
}

/// Frame fusion over head orientation and gaze direction
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameFusion {
    weights: FusionWeights,
}

impl FrameFusion {
    pub fn new(weights: FusionWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> FusionWeights {
        self.weights
    }

    /// Fuse one frame
    ///
    /// Rule table, first match wins:
    /// ```text
    /// head     gaze     increment
    /// forward  center   full
    /// forward  *        partial
    /// *        center   partial
    /// forward  absent   partial
    /// absent   center   partial
    /// otherwise         0
    /// ```
    pub fn fuse(
        &self,
        head: Option<HeadOrientation>,
        gaze: Option<GazeDirection>,
    ) -> FusionOutcome {
        use GazeDirection::Center;
        use HeadOrientation::Forward;

        match (head, gaze) {
            (Some(Forward), Some(Center)) => FusionOutcome::focused(self.weights.full),
            (Some(Forward), Some(_)) => FusionOutcome::focused(self.weights.partial),
            (Some(_), Some(Center)) => FusionOutcome::focused(self.weights.partial),
            (Some(Forward), None) => FusionOutcome::focused(self.weights.partial),
            (None, Some(Center)) => FusionOutcome::focused(self.weights.partial),
            (Some(_), Some(_)) | (Some(_), None) | (None, Some(_)) | (None, None) => {
                FusionOutcome::UNFOCUSED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADS: [HeadOrientation; 5] = [
        HeadOrientation::Forward,
        HeadOrientation::Left,
        HeadOrientation::Right,
        HeadOrientation::Up,
        HeadOrientation::Down,
    ];

    const GAZES: [GazeDirection; 3] = [
        GazeDirection::Left,
        GazeDirection::Right,
        GazeDirection::Center,
    ];

    fn fusion() -> FrameFusion {
        FrameFusion::default()
    }

    #[test]
    fn test_full_agreement() {
        let outcome = fusion().fuse(Some(HeadOrientation::Forward), Some(GazeDirection::Center));
        assert_eq!(outcome.increment, 1.0);
        assert!(outcome.focused);
    }

    #[test]
    fn test_head_forward_gaze_away() {
        for gaze in [GazeDirection::Left, GazeDirection::Right] {
            let outcome = fusion().fuse(Some(HeadOrientation::Forward), Some(gaze));
            assert_eq!(outcome.increment, 0.7);
            assert!(outcome.focused);
        }
    }

    #[test]
    fn test_gaze_center_head_away() {
        for head in &HEADS[1..] {
            let outcome = fusion().fuse(Some(*head), Some(GazeDirection::Center));
            assert_eq!(outcome.increment, 0.7);
            assert!(outcome.focused);
        }
    }

    #[test]
    fn test_single_modality_is_symmetric() {
        let head_only = fusion().fuse(Some(HeadOrientation::Forward), None);
        let gaze_only = fusion().fuse(None, Some(GazeDirection::Center));
        assert_eq!(head_only, gaze_only);
        assert_eq!(head_only.increment, 0.7);
        assert!(head_only.focused);
    }

    #[test]
    fn test_inattentive_frames() {
        assert_eq!(fusion().fuse(None, None), FusionOutcome::UNFOCUSED);
        assert_eq!(
            fusion().fuse(Some(HeadOrientation::Left), Some(GazeDirection::Right)),
            FusionOutcome::UNFOCUSED
        );
        assert_eq!(
            fusion().fuse(Some(HeadOrientation::Down), None),
            FusionOutcome::UNFOCUSED
        );
        assert_eq!(
            fusion().fuse(None, Some(GazeDirection::Left)),
            FusionOutcome::UNFOCUSED
        );
    }

    #[test]
    fn test_focused_iff_nonzero_increment() {
        let fusion = fusion();
        let heads = HEADS.iter().copied().map(Some).chain([None]);
        for head in heads {
            let gazes = GAZES.iter().copied().map(Some).chain([None]);
            for gaze in gazes {
                let outcome = fusion.fuse(head, gaze);
                assert_eq!(outcome.focused, outcome.increment > 0.0, "{head:?} {gaze:?}");
                assert!(outcome.increment <= 1.0);
            }
        }
    }

    #[test]
    fn test_custom_weights() {
        let fusion = FrameFusion::new(FusionWeights {
            full: 1.0,
            partial: 0.5,
        });
        assert_eq!(fusion.fuse(Some(HeadOrientation::Forward), None).increment, 0.5);
        assert_eq!(
            fusion
                .fuse(Some(HeadOrientation::Forward), Some(GazeDirection::Center))
                .increment,
            1.0
        );
    }
}
