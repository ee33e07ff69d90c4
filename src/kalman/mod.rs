//! Joint state estimation - constant-velocity Kalman filtering
//!
//! Re-exports only. All logic in submodules.

mod bank;
mod joint;

pub use bank::JointVelocityBank;
pub use joint::{JointEstimate, JointKalmanFilter, KalmanConfig};
