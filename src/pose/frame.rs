//! Rolling frame history for movement analysis
//!
//! Stores one record per processed frame in chronological order, oldest
//! evicted first. The chain verifier reads a completed movement out of
//! this buffer as a contiguous slice.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::kalman::JointEstimate;

/// Default number of frames retained (~4s at 30 fps)
pub const DEFAULT_HISTORY_CAPACITY: usize = 120;

/// One processed frame: joint positions plus optional kinematic estimates.
///
/// Immutable once appended to history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Timestamp in seconds
    pub timestamp: f64,
    /// Named joint positions in normalized coordinates
    pub joints: HashMap<String, (f32, f32)>,
    /// Per-joint Kalman estimates, when the velocity bank ran this frame
    pub estimates: Option<HashMap<String, JointEstimate>>,
}

impl FrameRecord {
    pub fn new(timestamp: f64, joints: HashMap<String, (f32, f32)>) -> Self {
        Self { timestamp, joints, estimates: None }
    }

    pub fn with_estimates(
        timestamp: f64,
        joints: HashMap<String, (f32, f32)>,
        estimates: HashMap<String, JointEstimate>,
    ) -> Self {
        Self { timestamp, joints, estimates: Some(estimates) }
    }
}

/// Bounded rolling buffer of frame records
pub struct PoseHistory {
    frames: Vec<FrameRecord>,
    capacity: usize,
}

impl PoseHistory {
    pub fn new(capacity: usize) -> Self {
        Self { frames: Vec::with_capacity(capacity), capacity }
    }

    /// Append a frame, evicting the oldest when full
    pub fn push(&mut self, frame: FrameRecord) {
        if self.frames.len() == self.capacity {
            self.frames.remove(0);
        }
        self.frames.push(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in chronological order
    pub fn as_slice(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Clear history (session boundary)
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl Default for PoseHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
