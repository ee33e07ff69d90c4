//! Pose data model - landmarks, named joints, frame records
//!
//! Re-exports only. All logic in submodules.

mod frame;
mod landmarks;

pub use frame::{FrameRecord, PoseHistory, DEFAULT_HISTORY_CAPACITY};
pub use landmarks::{
    extract_joints, Bone, Landmark, BONES, JOINT_NAMES, LANDMARK_COUNT, LEFT_ANKLE, LEFT_ELBOW,
    LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, NOSE, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
