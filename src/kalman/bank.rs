//! Joint velocity bank - one Kalman estimator per tracked joint
//!
//! Drives an independent [`JointKalmanFilter`] for each named joint and
//! exposes a single per-frame update call. Joints missing from a frame
//! are skipped, not reset: an occluded joint keeps its state and simply
//! does not advance.

use std::collections::HashMap;

use super::joint::{JointEstimate, JointKalmanFilter, KalmanConfig};
use crate::pose::JOINT_NAMES;

/// Owns and drives the per-joint Kalman estimators
pub struct JointVelocityBank {
    filters: HashMap<String, JointKalmanFilter>,
}

impl JointVelocityBank {
    pub fn new(config: KalmanConfig) -> Self {
        let filters = JOINT_NAMES
            .iter()
            .map(|(name, _)| (name.to_string(), JointKalmanFilter::new(config)))
            .collect();
        Self { filters }
    }

    /// Advance every joint that has a position this frame.
    ///
    /// Returns the per-joint estimates for the joints that advanced.
    pub fn update(
        &mut self,
        joints: &HashMap<String, (f32, f32)>,
        timestamp: f64,
    ) -> HashMap<String, JointEstimate> {
        let mut estimates = HashMap::with_capacity(joints.len());
        for (name, &(x, y)) in joints {
            if let Some(filter) = self.filters.get_mut(name) {
                estimates.insert(name.clone(), filter.update(x, y, timestamp));
            }
        }
        estimates
    }

    /// Current smoothed velocity for one joint
    pub fn velocity(&self, joint: &str) -> Option<(f32, f32)> {
        self.filters.get(joint).map(|f| f.velocity())
    }

    /// Most recent acceleration for one joint
    pub fn acceleration(&self, joint: &str) -> Option<(f32, f32)> {
        self.filters.get(joint).map(|f| f.acceleration())
    }

    /// Reset every estimator (session boundary)
    pub fn reset(&mut self) {
        for filter in self.filters.values_mut() {
            filter.reset();
        }
    }
}

impl Default for JointVelocityBank {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    fn moving_frame(t: f64) -> HashMap<String, (f32, f32)> {
        let mut joints = HashMap::new();
        joints.insert("right_wrist".to_string(), (0.2 + 0.3 * t as f32, 0.5));
        joints.insert("right_elbow".to_string(), (0.3, 0.4));
        joints
    }

    #[test]
    fn updates_only_supplied_joints() {
        let mut bank = JointVelocityBank::default();
        let estimates = bank.update(&moving_frame(0.0), 0.0);
        assert_eq!(estimates.len(), 2);
        assert!(estimates.contains_key("right_wrist"));
        assert!(!estimates.contains_key("left_ankle"));
    }

    #[test]
    fn unknown_joint_names_are_ignored() {
        let mut bank = JointVelocityBank::default();
        let mut joints = HashMap::new();
        joints.insert("racket_tip".to_string(), (0.5, 0.5));
        let estimates = bank.update(&joints, 0.0);
        assert!(estimates.is_empty());
    }

    #[test]
    fn missing_joint_does_not_reset_its_filter() {
        let mut bank = JointVelocityBank::default();
        for i in 0..20 {
            bank.update(&moving_frame(i as f64 * DT), i as f64 * DT);
        }
        let (vx_before, _) = bank.velocity("right_wrist").unwrap();
        assert!(vx_before > 0.2);

        // Frames without the wrist: its estimator must hold state
        let mut partial = HashMap::new();
        partial.insert("right_elbow".to_string(), (0.3_f32, 0.4_f32));
        for i in 20..25 {
            bank.update(&partial, i as f64 * DT);
        }
        let (vx_after, _) = bank.velocity("right_wrist").unwrap();
        assert_eq!(vx_before, vx_after);
    }

    #[test]
    fn reset_reproduces_first_run() {
        let mut bank = JointVelocityBank::default();

        let run = |bank: &mut JointVelocityBank| -> Vec<f32> {
            (0..15)
                .map(|i| {
                    let t = i as f64 * DT;
                    let estimates = bank.update(&moving_frame(t), t);
                    estimates["right_wrist"].vx
                })
                .collect()
        };

        let first = run(&mut bank);
        bank.reset();
        let second = run(&mut bank);
        assert_eq!(first, second);
    }
}
