//! Skeleton filter - per-landmark One Euro smoothing plus bone constraints
//!
//! Applies one One Euro filter per (landmark, axis) pair, then enforces
//! calibrated bone lengths softly so outlier frames get pulled back over
//! a few frames instead of snapping.

use tracing::{debug, trace};

use serde::{Deserialize, Serialize};

use super::one_euro::{OneEuroConfig, OneEuroFilter};
use super::visibility::{ThresholdVisibility, VisibilityPolicy};
use crate::pose::{Landmark, BONES, LANDMARK_COUNT};

/// Skeleton filter tuning parameters
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SkeletonConfig {
    /// Per-coordinate One Euro parameters
    pub one_euro: OneEuroConfig,
    /// Frames collected before bone lengths are calibrated
    pub calibration_frames: usize,
    /// Minimum length samples for a bone to be constrained at all
    pub min_bone_samples: usize,
    /// Relative deviation from the calibrated length tolerated untouched
    pub max_deviation: f32,
    /// Master switch for the bone-length constraint stage
    pub constrain_bones: bool,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            one_euro: OneEuroConfig::default(),
            calibration_frames: 30,
            min_bone_samples: 10,
            max_deviation: 0.15,
            constrain_bones: true,
        }
    }
}

/// Per-bone calibration state
struct BoneState {
    /// Length samples collected during the calibration window
    samples: Vec<f32>,
    /// Median length, set once calibration completes
    reference: Option<f32>,
}

/// Full-body landmark filter with skeletal length constraints
pub struct SkeletonFilter {
    config: SkeletonConfig,
    visibility: Box<dyn VisibilityPolicy>,
    /// One filter per (landmark, axis)
    filters: Vec<[OneEuroFilter; 3]>,
    bones: Vec<BoneState>,
    frames_seen: usize,
    calibrated: bool,
}

impl SkeletonFilter {
    pub fn new(config: SkeletonConfig) -> Self {
        Self::with_visibility(config, Box::new(ThresholdVisibility::default()))
    }

    pub fn with_visibility(config: SkeletonConfig, visibility: Box<dyn VisibilityPolicy>) -> Self {
        let proto = OneEuroFilter::new(config.one_euro);
        let filters = (0..LANDMARK_COUNT)
            .map(|_| [proto.clone(), proto.clone(), proto.clone()])
            .collect();
        let bones = BONES
            .iter()
            .map(|_| BoneState { samples: Vec::new(), reference: None })
            .collect();
        Self {
            config,
            visibility,
            filters,
            bones,
            frames_seen: 0,
            calibrated: false,
        }
    }

    /// Whether the calibration window has completed
    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Calibrated reference length for a bone, if it collected enough samples
    pub fn calibrated_length(&self, bone_name: &str) -> Option<f32> {
        BONES
            .iter()
            .position(|b| b.name == bone_name)
            .and_then(|i| self.bones[i].reference)
    }

    /// Filter a full landmark set for one frame.
    ///
    /// An input shorter than the expected landmark count is returned
    /// unmodified; real pose data drops frames and that must not be an
    /// error.
    pub fn filter_landmarks(&mut self, landmarks: &[Landmark], timestamp: f64) -> Vec<Landmark> {
        if landmarks.len() != LANDMARK_COUNT {
            return landmarks.to_vec();
        }

        let mut filtered: Vec<Landmark> = landmarks
            .iter()
            .enumerate()
            .map(|(i, lm)| {
                let axes = &mut self.filters[i];
                Landmark {
                    x: axes[0].filter(lm.x, timestamp),
                    y: axes[1].filter(lm.y, timestamp),
                    z: axes[2].filter(lm.z, timestamp),
                    visibility: lm.visibility,
                }
            })
            .collect();

        if self.config.constrain_bones {
            if !self.calibrated {
                self.collect_bone_samples(&filtered);
                self.frames_seen += 1;
                if self.frames_seen >= self.config.calibration_frames {
                    self.finish_calibration();
                }
            } else {
                self.apply_bone_constraints(&mut filtered);
            }
        }

        filtered
    }

    /// Reset filters and calibration (session boundary)
    pub fn reset(&mut self) {
        for axes in &mut self.filters {
            for f in axes {
                f.reset();
            }
        }
        for bone in &mut self.bones {
            bone.samples.clear();
            bone.reference = None;
        }
        self.frames_seen = 0;
        self.calibrated = false;
    }

    fn collect_bone_samples(&mut self, landmarks: &[Landmark]) {
        for (bone, state) in BONES.iter().zip(self.bones.iter_mut()) {
            let a = &landmarks[bone.a];
            let b = &landmarks[bone.b];
            if !self.visibility.is_visible(a) || !self.visibility.is_visible(b) {
                continue;
            }
            let length = a.distance_2d(b);
            // Near-zero lengths are tracking failures, not anatomy
            if length > 1e-4 {
                state.samples.push(length);
            }
        }
    }

    fn finish_calibration(&mut self) {
        let mut constrained = 0;
        for (bone, state) in BONES.iter().zip(self.bones.iter_mut()) {
            if state.samples.len() >= self.config.min_bone_samples {
                state.reference = Some(median(&mut state.samples));
                constrained += 1;
            } else {
                trace!(
                    bone = bone.name,
                    samples = state.samples.len(),
                    "too few samples, bone left unconstrained"
                );
            }
            state.samples.clear();
        }
        self.calibrated = true;
        debug!(constrained, total = BONES.len(), "bone calibration complete");
    }

    fn apply_bone_constraints(&self, landmarks: &mut [Landmark]) {
        for (bone, state) in BONES.iter().zip(self.bones.iter()) {
            let reference = match state.reference {
                Some(r) => r,
                None => continue,
            };
            if !self.visibility.is_visible(&landmarks[bone.a])
                || !self.visibility.is_visible(&landmarks[bone.b])
            {
                continue;
            }

            let (ax, ay) = (landmarks[bone.a].x, landmarks[bone.a].y);
            let (bx, by) = (landmarks[bone.b].x, landmarks[bone.b].y);
            let length = landmarks[bone.a].distance_2d(&landmarks[bone.b]);
            if length < 1e-4 {
                continue;
            }

            let deviation = (length - reference).abs() / reference;
            if deviation <= self.config.max_deviation {
                continue;
            }

            // Blend toward endpoints that restore the calibrated length
            // around the current midpoint. Strength grows with the
            // overshoot past the threshold, capped at 50% per frame so
            // corrections never snap visibly.
            let strength =
                ((deviation - self.config.max_deviation) / self.config.max_deviation).min(0.5);

            let mid_x = (ax + bx) * 0.5;
            let mid_y = (ay + by) * 0.5;
            let dir_x = (bx - ax) / length;
            let dir_y = (by - ay) / length;
            let half = reference * 0.5;

            let target_a = (mid_x - dir_x * half, mid_y - dir_y * half);
            let target_b = (mid_x + dir_x * half, mid_y + dir_y * half);

            landmarks[bone.a].x = ax + (target_a.0 - ax) * strength;
            landmarks[bone.a].y = ay + (target_a.1 - ay) * strength;
            landmarks[bone.b].x = bx + (target_b.0 - bx) * strength;
            landmarks[bone.b].y = by + (target_b.1 - by) * strength;
        }
    }
}

impl Default for SkeletonFilter {
    fn default() -> Self {
        Self::new(SkeletonConfig::default())
    }
}

/// Median of a sample buffer (averages the middle pair for even counts)
fn median(samples: &mut [f32]) -> f32 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = samples.len();
    if n % 2 == 1 {
        samples[n / 2]
    } else {
        (samples[n / 2 - 1] + samples[n / 2]) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{LEFT_ELBOW, LEFT_WRIST, RIGHT_ELBOW, RIGHT_WRIST};

    const DT: f64 = 1.0 / 30.0;

    /// A plausible standing pose with every landmark fully visible
    fn standing_pose() -> Vec<Landmark> {
        let mut pose: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(0.4 + (i % 7) as f32 * 0.03, 0.1 + i as f32 * 0.02, 0.0, 0.95))
            .collect();
        // Explicit positions for every landmark that appears in the bone table
        let joints = [
            (crate::pose::LEFT_SHOULDER, 0.40, 0.30),
            (crate::pose::RIGHT_SHOULDER, 0.60, 0.30),
            (LEFT_ELBOW, 0.35, 0.42),
            (RIGHT_ELBOW, 0.65, 0.42),
            (LEFT_WRIST, 0.33, 0.54),
            (RIGHT_WRIST, 0.67, 0.54),
            (crate::pose::LEFT_HIP, 0.43, 0.55),
            (crate::pose::RIGHT_HIP, 0.57, 0.55),
            (crate::pose::LEFT_KNEE, 0.43, 0.72),
            (crate::pose::RIGHT_KNEE, 0.57, 0.72),
            (crate::pose::LEFT_ANKLE, 0.43, 0.89),
            (crate::pose::RIGHT_ANKLE, 0.57, 0.89),
        ];
        for (idx, x, y) in joints {
            pose[idx] = Landmark::new(x, y, 0.0, 0.95);
        }
        pose
    }

    fn forearm_length(pose: &[Landmark], left: bool) -> f32 {
        if left {
            pose[LEFT_ELBOW].distance_2d(&pose[LEFT_WRIST])
        } else {
            pose[RIGHT_ELBOW].distance_2d(&pose[RIGHT_WRIST])
        }
    }

    /// Run a filter through its full calibration window on a fixed pose
    fn calibrated_filter(pose: &[Landmark]) -> (SkeletonFilter, f64) {
        let mut filter = SkeletonFilter::default();
        let mut t = 0.0;
        for _ in 0..35 {
            filter.filter_landmarks(pose, t);
            t += DT;
        }
        assert!(filter.is_calibrated());
        (filter, t)
    }

    #[test]
    fn short_input_passes_through_unchanged() {
        let mut filter = SkeletonFilter::default();
        let short = vec![Landmark::new(0.3, 0.3, 0.0, 0.9); 10];
        let out = filter.filter_landmarks(&short, 0.0);
        assert_eq!(out, short);
    }

    #[test]
    fn calibration_produces_median_lengths() {
        let pose = standing_pose();
        let (filter, _) = calibrated_filter(&pose);
        let expected = forearm_length(&pose, true);
        let calibrated = filter.calibrated_length("left_forearm").unwrap();
        assert!((calibrated - expected).abs() < 1e-3);
    }

    #[test]
    fn stretched_bone_is_pulled_back_sibling_untouched() {
        let pose = standing_pose();
        let (mut filter, mut t) = calibrated_filter(&pose);
        let reference = forearm_length(&pose, true);

        // Stretch the left forearm to 1.5x by moving the wrist outward
        let mut stretched = pose.clone();
        let elbow = stretched[LEFT_ELBOW];
        let wrist = stretched[LEFT_WRIST];
        stretched[LEFT_WRIST].x = elbow.x + (wrist.x - elbow.x) * 1.5;
        stretched[LEFT_WRIST].y = elbow.y + (wrist.y - elbow.y) * 1.5;
        let raw_length = forearm_length(&stretched, true);
        assert!((raw_length - reference * 1.5).abs() < 1e-4);

        let out = filter.filter_landmarks(&stretched, t);
        t += DT;

        // The stretched bone must move strictly toward its reference
        let out_length = forearm_length(&out, true);
        assert!(out_length < raw_length);
        assert!((out_length - reference).abs() < (raw_length - reference).abs());

        // The untouched sibling bone stays where it was
        let sibling = forearm_length(&out, false);
        assert!((sibling - forearm_length(&pose, false)).abs() < 1e-5);

        // Held stretch: smoothing converges toward the raw outlier but the
        // soft constraint keeps holding the length well below the raw 1.5x
        let mut held = out;
        for _ in 0..60 {
            held = filter.filter_landmarks(&stretched, t);
            t += DT;
        }
        let held_length = forearm_length(&held, true);
        assert!(held_length < raw_length * 0.9);
        assert!(held_length > reference);
    }

    #[test]
    fn deviation_within_threshold_is_untouched() {
        let pose = standing_pose();
        let (mut filter, mut t) = calibrated_filter(&pose);
        let reference = forearm_length(&pose, true);

        // 10% stretch sits inside the 15% tolerance band
        let mut mild = pose.clone();
        let elbow = mild[LEFT_ELBOW];
        let wrist = mild[LEFT_WRIST];
        mild[LEFT_WRIST].x = elbow.x + (wrist.x - elbow.x) * 1.1;
        mild[LEFT_WRIST].y = elbow.y + (wrist.y - elbow.y) * 1.1;

        // Let the smoothing converge onto the mild stretch
        let mut out = Vec::new();
        for _ in 0..80 {
            out = filter.filter_landmarks(&mild, t);
            t += DT;
        }
        let out_length = forearm_length(&out, true);
        assert!((out_length - reference * 1.1).abs() < reference * 0.01);
    }

    #[test]
    fn occluded_bone_stays_unconstrained() {
        let mut pose = standing_pose();
        pose[LEFT_WRIST].visibility = 0.1;
        let (filter, _) = calibrated_filter(&pose);
        assert!(filter.is_calibrated());
        assert!(filter.calibrated_length("left_forearm").is_none());
        assert!(filter.calibrated_length("right_forearm").is_some());
    }

    #[test]
    fn reset_reproduces_first_run() {
        let pose = standing_pose();
        let mut filter = SkeletonFilter::default();

        let run = |filter: &mut SkeletonFilter| -> Vec<Vec<Landmark>> {
            let mut outputs = Vec::new();
            let mut t = 0.0;
            for i in 0..40 {
                let mut wobble = pose.clone();
                wobble[LEFT_WRIST].x += (i as f32 * 0.7).sin() * 0.01;
                outputs.push(filter.filter_landmarks(&wobble, t));
                t += DT;
            }
            outputs
        };

        let first = run(&mut filter);
        filter.reset();
        let second = run(&mut filter);
        assert_eq!(first, second);
    }
}
