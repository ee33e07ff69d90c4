//! Constant-velocity Kalman filter for a single joint
//!
//! State vector: [x, y, vx, vy]ᵀ. Consumes position-only measurements
//! with timestamps, emits smoothed position, velocity, and acceleration.
//! Acceleration is the finite difference of consecutive smoothed
//! velocities, not a filtered state of its own.

use nalgebra::{SMatrix, SVector};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// 4-element state vector type
type State = SVector<f32, 4>;
/// 4x4 matrix type
type Matrix4 = SMatrix<f32, 4, 4>;
/// 2x4 matrix type (observation)
type Matrix2x4 = SMatrix<f32, 2, 4>;
/// 4x2 matrix type (Kalman gain)
type Matrix4x2 = SMatrix<f32, 4, 2>;
/// 2x2 matrix type
type Matrix2 = SMatrix<f32, 2, 2>;
/// 2-element vector type
type Vector2 = SVector<f32, 2>;

/// Minimum timestep; repeated or backwards timestamps clamp here
const MIN_DT: f32 = 0.001;

/// Determinant below this means the innovation covariance is too close
/// to singular to invert; the correction step is skipped for that frame
const SINGULARITY_EPSILON: f32 = 1e-9;

/// Initial covariance scale - high uncertainty before the first few
/// measurements settle the state
const INITIAL_UNCERTAINTY: f32 = 500.0;

/// Kalman noise parameters
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// White-noise-acceleration variance (trust in the motion model)
    pub process_noise: f32,
    /// Measurement variance (trust in the pose estimator)
    pub measurement_noise: f32,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 0.001,
            measurement_noise: 0.01,
        }
    }
}

/// Smoothed kinematic output for one joint on one frame
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct JointEstimate {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Velocity magnitude
    pub speed: f32,
    pub ax: f32,
    pub ay: f32,
    /// Acceleration magnitude
    pub accel_mag: f32,
}

/// Constant-velocity Kalman filter for one tracked joint
pub struct JointKalmanFilter {
    config: KalmanConfig,

    /// State: [x, y, vx, vy]
    state: State,
    /// State covariance matrix (uncertainty)
    covariance: Matrix4,
    last_timestamp: f64,
    /// Previous smoothed velocity, for finite-difference acceleration
    last_velocity: (f32, f32),
    /// Most recent finite-difference acceleration
    last_accel: (f32, f32),
    initialized: bool,
}

impl JointKalmanFilter {
    pub fn new(config: KalmanConfig) -> Self {
        Self {
            config,
            state: State::zeros(),
            covariance: Matrix4::identity() * INITIAL_UNCERTAINTY,
            last_timestamp: 0.0,
            last_velocity: (0.0, 0.0),
            last_accel: (0.0, 0.0),
            initialized: false,
        }
    }

    /// Constant-velocity transition matrix for a timestep
    ///
    /// ```text
    /// | 1  0  dt 0  |
    /// | 0  1  0  dt |
    /// | 0  0  1  0  |
    /// | 0  0  0  1  |
    /// ```
    fn transition_matrix(dt: f32) -> Matrix4 {
        Matrix4::new(
            1.0, 0.0, dt, 0.0, //
            0.0, 1.0, 0.0, dt, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// White-noise-acceleration process noise for a timestep
    fn process_noise_matrix(&self, dt: f32) -> Matrix4 {
        let q = self.config.process_noise;
        let dt2 = dt * dt;
        let dt3 = dt2 * dt;
        let dt4 = dt3 * dt;
        Matrix4::new(
            dt4 / 4.0 * q, 0.0, dt3 / 2.0 * q, 0.0, //
            0.0, dt4 / 4.0 * q, 0.0, dt3 / 2.0 * q, //
            dt3 / 2.0 * q, 0.0, dt2 * q, 0.0, //
            0.0, dt3 / 2.0 * q, 0.0, dt2 * q,
        )
    }

    /// Observation matrix H (we only measure x, y)
    fn observation_matrix() -> Matrix2x4 {
        Matrix2x4::new(
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0,
        )
    }

    /// Consume one position measurement and return the smoothed estimate
    pub fn update(&mut self, measured_x: f32, measured_y: f32, timestamp: f64) -> JointEstimate {
        if !self.initialized {
            self.state = State::new(measured_x, measured_y, 0.0, 0.0);
            self.covariance = Matrix4::identity() * INITIAL_UNCERTAINTY;
            self.last_timestamp = timestamp;
            self.last_velocity = (0.0, 0.0);
            self.last_accel = (0.0, 0.0);
            self.initialized = true;
            return JointEstimate {
                x: measured_x,
                y: measured_y,
                ..JointEstimate::default()
            };
        }

        let dt = ((timestamp - self.last_timestamp) as f32).max(MIN_DT);
        self.last_timestamp = timestamp;

        // Predict
        let f = Self::transition_matrix(dt);
        self.state = f * self.state;
        self.covariance =
            f * self.covariance * f.transpose() + self.process_noise_matrix(dt);

        // Update
        let h = Self::observation_matrix();
        let z = Vector2::new(measured_x, measured_y);
        let innovation = z - h * self.state;
        let s = h * self.covariance * h.transpose()
            + Matrix2::identity() * self.config.measurement_noise;

        if s.determinant().abs() > SINGULARITY_EPSILON {
            // S is guaranteed invertible here
            if let Some(s_inv) = s.try_inverse() {
                let k: Matrix4x2 = self.covariance * h.transpose() * s_inv;
                self.state += k * innovation;
                self.covariance = (Matrix4::identity() - k * h) * self.covariance;
            }
        } else {
            // Degenerate innovation covariance: keep the prediction and
            // let the next well-conditioned measurement correct it
            trace!(det = s.determinant(), "singular innovation covariance, correction skipped");
        }

        let (vx, vy) = (self.state[2], self.state[3]);
        let ax = (vx - self.last_velocity.0) / dt;
        let ay = (vy - self.last_velocity.1) / dt;
        self.last_velocity = (vx, vy);
        self.last_accel = (ax, ay);

        JointEstimate {
            x: self.state[0],
            y: self.state[1],
            vx,
            vy,
            speed: (vx * vx + vy * vy).sqrt(),
            ax,
            ay,
            accel_mag: (ax * ax + ay * ay).sqrt(),
        }
    }

    /// Current smoothed velocity
    pub fn velocity(&self) -> (f32, f32) {
        (self.state[2], self.state[3])
    }

    /// Most recent finite-difference acceleration
    pub fn acceleration(&self) -> (f32, f32) {
        self.last_accel
    }

    /// Reset to the uninitialized state
    pub fn reset(&mut self) {
        self.state = State::zeros();
        self.covariance = Matrix4::identity() * INITIAL_UNCERTAINTY;
        self.last_timestamp = 0.0;
        self.last_velocity = (0.0, 0.0);
        self.last_accel = (0.0, 0.0);
        self.initialized = false;
    }
}

impl Default for JointKalmanFilter {
    fn default() -> Self {
        Self::new(KalmanConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 30.0;

    #[test]
    fn bootstrap_returns_zero_velocity() {
        let mut filter = JointKalmanFilter::default();
        let est = filter.update(0.3, 0.7, 0.0);
        assert_eq!(est.x, 0.3);
        assert_eq!(est.y, 0.7);
        assert_eq!(est.speed, 0.0);
        assert_eq!(est.accel_mag, 0.0);
    }

    #[test]
    fn converges_on_constant_velocity_trajectory() {
        let mut filter = JointKalmanFilter::default();
        let (vx, vy) = (0.12_f32, -0.06_f32);

        let mut est = JointEstimate::default();
        for i in 0..30 {
            let t = i as f64 * DT;
            est = filter.update(0.2 + vx * t as f32, 0.8 + vy * t as f32, t);
        }
        assert!((est.vx - vx).abs() < 0.02, "vx = {}", est.vx);
        assert!((est.vy - vy).abs() < 0.02, "vy = {}", est.vy);

        // Stability: 100 further noiseless updates must not diverge
        for i in 30..130 {
            let t = i as f64 * DT;
            est = filter.update(0.2 + vx * t as f32, 0.8 + vy * t as f32, t);
        }
        assert!((est.vx - vx).abs() < 0.01);
        assert!((est.vy - vy).abs() < 0.01);
        assert!(est.x.is_finite() && est.speed.is_finite());
    }

    #[test]
    fn zero_dt_does_not_produce_nan() {
        let mut filter = JointKalmanFilter::default();
        filter.update(0.5, 0.5, 1.0);
        // Same timestamp again: dt clamps to the minimum epsilon
        let est = filter.update(0.5, 0.5, 1.0);
        assert!(est.x.is_finite());
        assert!(est.vx.is_finite());
        assert!(est.accel_mag.is_finite());
    }

    #[test]
    fn backwards_timestamp_is_clamped() {
        let mut filter = JointKalmanFilter::default();
        filter.update(0.5, 0.5, 2.0);
        let est = filter.update(0.51, 0.5, 1.5);
        assert!(est.x.is_finite());
        assert!(est.speed.is_finite());
    }

    #[test]
    fn reset_reproduces_first_run() {
        let mut filter = JointKalmanFilter::default();
        let measurements: Vec<(f32, f32)> =
            (0..20).map(|i| (0.1 + i as f32 * 0.01, 0.9 - i as f32 * 0.02)).collect();

        let run = |filter: &mut JointKalmanFilter| -> Vec<(f32, f32)> {
            measurements
                .iter()
                .enumerate()
                .map(|(i, &(x, y))| {
                    let est = filter.update(x, y, i as f64 * DT);
                    (est.x, est.vx)
                })
                .collect()
        };

        let first = run(&mut filter);
        filter.reset();
        let second = run(&mut filter);
        assert_eq!(first, second);
    }
}
