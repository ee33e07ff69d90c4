//! Kinetic chain verification - segment activation order and timing
//!
//! Re-exports only. All logic in submodules.

mod segments;
mod verifier;

pub use segments::{Segment, SEGMENT_ORDER, TRANSITION_COUNT};
pub use verifier::{
    ChainAnalysis, ChainComparison, ChainConfig, FeedbackMessage, FeedbackSeverity, FrameRange,
    GapQuality, KineticChainVerifier, PhaseWindows, SegmentTiming, TimingGap, Violation,
};
