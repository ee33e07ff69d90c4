//! Body segments of the kinetic chain
//!
//! Seven fixed segments in proximal-to-distal activation order. Each
//! maps to the named joints whose instantaneous velocities are averaged
//! to produce that segment's velocity signal.

use serde::{Deserialize, Serialize};

/// Number of consecutive segment transitions in the chain
pub const TRANSITION_COUNT: usize = 6;

/// A body segment of the kinetic chain
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    Ankle,
    Knee,
    Hip,
    Torso,
    Shoulder,
    Elbow,
    Wrist,
}

/// The anatomically expected activation order
pub const SEGMENT_ORDER: [Segment; 7] = [
    Segment::Ankle,
    Segment::Knee,
    Segment::Hip,
    Segment::Torso,
    Segment::Shoulder,
    Segment::Elbow,
    Segment::Wrist,
];

impl Segment {
    pub fn name(&self) -> &'static str {
        match self {
            Segment::Ankle => "ankle",
            Segment::Knee => "knee",
            Segment::Hip => "hip",
            Segment::Torso => "torso",
            Segment::Shoulder => "shoulder",
            Segment::Elbow => "elbow",
            Segment::Wrist => "wrist",
        }
    }

    /// Joints whose velocities are averaged for this segment's signal.
    ///
    /// Limb segments average both sides; the dominant side dominates the
    /// peak anyway and this keeps the signal defined when one side drops
    /// out. Torso uses shoulders and hips together.
    pub fn joints(&self) -> &'static [&'static str] {
        match self {
            Segment::Ankle => &["left_ankle", "right_ankle"],
            Segment::Knee => &["left_knee", "right_knee"],
            Segment::Hip => &["left_hip", "right_hip"],
            Segment::Torso => &["left_shoulder", "right_shoulder", "left_hip", "right_hip"],
            Segment::Shoulder => &["left_shoulder", "right_shoulder"],
            Segment::Elbow => &["left_elbow", "right_elbow"],
            Segment::Wrist => &["left_wrist", "right_wrist"],
        }
    }

    /// Canned coaching explanation for this segment activating out of order
    pub fn violation_hint(&self) -> &'static str {
        match self {
            Segment::Ankle => "drive off the ground first; the chain starts at the feet",
            Segment::Knee => "let the knees extend before the hips fire",
            Segment::Hip => "start the hip drive after the legs, not with them",
            Segment::Torso => "wait for the hips to start rotating before engaging the upper body",
            Segment::Shoulder => "let the torso rotation pull the shoulder through",
            Segment::Elbow => "keep the elbow relaxed until the shoulder has come through",
            Segment::Wrist => "save the wrist snap for last, after the elbow extends",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_proximal_to_distal() {
        assert_eq!(SEGMENT_ORDER[0], Segment::Ankle);
        assert_eq!(SEGMENT_ORDER[6], Segment::Wrist);
        assert_eq!(SEGMENT_ORDER.len(), TRANSITION_COUNT + 1);
    }

    #[test]
    fn every_segment_maps_to_joints() {
        for segment in SEGMENT_ORDER {
            assert!(!segment.joints().is_empty());
        }
    }
}
