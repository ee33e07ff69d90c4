//! Kinetic Core - pose motion filtering and kinetic chain verification
//!
//! Turns a noisy per-frame stream of 2D body landmarks into stable joint
//! kinematics, and verifies that a completed athletic movement activated
//! its body segments in the correct proximal-to-distal order.
//!
//! Per-frame data flow:
//! raw landmarks → [`SkeletonFilter`] → joint extraction →
//! [`JointVelocityBank`] → [`FrameRecord`] appended to [`PoseHistory`].
//! Once the host signals the movement is complete, the history plus an
//! externally supplied phase window goes to [`KineticChainVerifier`].
//!
//! Pure in-process computation: no I/O, no global state, no threads.
//! Every component owns its mutable state and exposes an explicit
//! `reset()` for session boundaries.

mod angles;
pub mod chain;
pub mod filter;
pub mod kalman;
pub mod pose;

pub use angles::joint_angle;
pub use chain::{
    ChainAnalysis, ChainComparison, ChainConfig, FeedbackMessage, FeedbackSeverity, FrameRange,
    GapQuality, KineticChainVerifier, PhaseWindows, Segment, SegmentTiming, TimingGap, Violation,
};
pub use filter::{
    LowPassFilter, OneEuroConfig, OneEuroFilter, SkeletonConfig, SkeletonFilter,
    ThresholdVisibility, VisibilityPolicy,
};
pub use kalman::{JointEstimate, JointKalmanFilter, JointVelocityBank, KalmanConfig};
pub use pose::{extract_joints, FrameRecord, Landmark, PoseHistory, JOINT_NAMES, LANDMARK_COUNT};
