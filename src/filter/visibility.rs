//! Visibility policy - decides which landmarks are trustworthy
//!
//! Injected into the skeleton filter and joint extraction so "degrade
//! gracefully on occlusion" behavior is explicit rather than a hidden
//! global check.

use crate::pose::Landmark;

/// Decides whether a landmark is reliable enough to measure from
pub trait VisibilityPolicy {
    fn is_visible(&self, landmark: &Landmark) -> bool;
}

/// Default policy: plain confidence threshold
#[derive(Clone, Copy, Debug)]
pub struct ThresholdVisibility {
    pub min_visibility: f32,
}

impl ThresholdVisibility {
    pub fn new(min_visibility: f32) -> Self {
        Self { min_visibility }
    }
}

impl Default for ThresholdVisibility {
    fn default() -> Self {
        Self { min_visibility: 0.5 }
    }
}

impl VisibilityPolicy for ThresholdVisibility {
    fn is_visible(&self, landmark: &Landmark) -> bool {
        landmark.visibility >= self.min_visibility
    }
}
