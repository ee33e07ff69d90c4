//! Adaptive landmark filtering - temporal smoothing and bone constraints
//!
//! Re-exports only. All logic in submodules.

mod low_pass;
mod one_euro;
mod skeleton;
mod visibility;

pub use low_pass::LowPassFilter;
pub use one_euro::{OneEuroConfig, OneEuroFilter};
pub use skeleton::{SkeletonConfig, SkeletonFilter};
pub use visibility::{ThresholdVisibility, VisibilityPolicy};
