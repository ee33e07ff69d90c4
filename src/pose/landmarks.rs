//! Landmark storage and anatomical indexing
//!
//! The pose estimator delivers 33 landmarks per frame (MediaPipe Pose
//! topology). This module names the indices the rest of the crate cares
//! about, defines the fixed bone table used for length calibration, and
//! maps the landmark array to the 13 named joints tracked downstream.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::filter::VisibilityPolicy;

/// Number of landmarks in a full pose frame
pub const LANDMARK_COUNT: usize = 33;

// ============================================================================
// LANDMARK INDICES (MediaPipe Pose - 33 total)
// ============================================================================

pub const NOSE: usize = 0;
pub const LEFT_SHOULDER: usize = 11;
pub const RIGHT_SHOULDER: usize = 12;
pub const LEFT_ELBOW: usize = 13;
pub const RIGHT_ELBOW: usize = 14;
pub const LEFT_WRIST: usize = 15;
pub const RIGHT_WRIST: usize = 16;
pub const LEFT_HIP: usize = 23;
pub const RIGHT_HIP: usize = 24;
pub const LEFT_KNEE: usize = 25;
pub const RIGHT_KNEE: usize = 26;
pub const LEFT_ANKLE: usize = 27;
pub const RIGHT_ANKLE: usize = 28;

/// The 13 joints tracked by the velocity bank and the chain verifier,
/// paired with their landmark index
pub const JOINT_NAMES: [(&str, usize); 13] = [
    ("nose", NOSE),
    ("left_shoulder", LEFT_SHOULDER),
    ("right_shoulder", RIGHT_SHOULDER),
    ("left_elbow", LEFT_ELBOW),
    ("right_elbow", RIGHT_ELBOW),
    ("left_wrist", LEFT_WRIST),
    ("right_wrist", RIGHT_WRIST),
    ("left_hip", LEFT_HIP),
    ("right_hip", RIGHT_HIP),
    ("left_knee", LEFT_KNEE),
    ("right_knee", RIGHT_KNEE),
    ("left_ankle", LEFT_ANKLE),
    ("right_ankle", RIGHT_ANKLE),
];

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single body landmark in normalized image coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, 0-1 normalized
    pub x: f32,
    /// Vertical position, 0-1 normalized
    pub y: f32,
    /// Relative depth
    pub z: f32,
    /// Detection confidence, 0-1
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }

    /// 2D Euclidean distance to another landmark
    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

// ============================================================================
// BONE TABLE
// ============================================================================

/// An anatomically fixed pair of landmarks whose distance should stay
/// roughly constant within a session
#[derive(Clone, Copy, Debug)]
pub struct Bone {
    pub name: &'static str,
    pub a: usize,
    pub b: usize,
}

/// Bones whose lengths are calibrated and softly constrained.
/// All pairs are rigid segments; shoulder and hip lines are included
/// because pose estimators jitter them just as much as the limbs.
pub const BONES: [Bone; 12] = [
    Bone { name: "left_upper_arm", a: LEFT_SHOULDER, b: LEFT_ELBOW },
    Bone { name: "right_upper_arm", a: RIGHT_SHOULDER, b: RIGHT_ELBOW },
    Bone { name: "left_forearm", a: LEFT_ELBOW, b: LEFT_WRIST },
    Bone { name: "right_forearm", a: RIGHT_ELBOW, b: RIGHT_WRIST },
    Bone { name: "shoulder_line", a: LEFT_SHOULDER, b: RIGHT_SHOULDER },
    Bone { name: "hip_line", a: LEFT_HIP, b: RIGHT_HIP },
    Bone { name: "left_torso_side", a: LEFT_SHOULDER, b: LEFT_HIP },
    Bone { name: "right_torso_side", a: RIGHT_SHOULDER, b: RIGHT_HIP },
    Bone { name: "left_thigh", a: LEFT_HIP, b: LEFT_KNEE },
    Bone { name: "right_thigh", a: RIGHT_HIP, b: RIGHT_KNEE },
    Bone { name: "left_shin", a: LEFT_KNEE, b: LEFT_ANKLE },
    Bone { name: "right_shin", a: RIGHT_KNEE, b: RIGHT_ANKLE },
];

// ============================================================================
// JOINT EXTRACTION
// ============================================================================

/// Map a full landmark array to the 13 named joint positions.
///
/// Joints whose landmark fails the visibility policy are omitted, so a
/// temporarily occluded joint simply does not appear this frame.
/// Returns an empty map if the array is shorter than expected.
pub fn extract_joints(
    landmarks: &[Landmark],
    visibility: &dyn VisibilityPolicy,
) -> HashMap<String, (f32, f32)> {
    let mut joints = HashMap::with_capacity(JOINT_NAMES.len());
    if landmarks.len() < LANDMARK_COUNT {
        return joints;
    }

    for (name, index) in JOINT_NAMES {
        let lm = &landmarks[index];
        if visibility.is_visible(lm) {
            joints.insert(name.to_string(), (lm.x, lm.y));
        }
    }
    joints
}
