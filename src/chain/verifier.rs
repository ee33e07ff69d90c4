//! Kinetic chain verifier - peak ordering, timing gaps, quality score
//!
//! Consumes a completed movement's frame history plus an externally
//! supplied phase window, finds each segment's peak-velocity frame,
//! checks proximal-to-distal ordering within tolerance, and folds the
//! result into a single 0-100 chain quality score with diagnostic
//! feedback. All outputs are derived values; the verifier holds no
//! mutable state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::segments::{Segment, SEGMENT_ORDER, TRANSITION_COUNT};
use crate::pose::FrameRecord;

/// An inclusive frame-index range inside a movement
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
}

/// Externally supplied phase windows for one movement.
///
/// The verifier analyzes acceleration start through contact end; phase
/// segmentation itself happens outside this crate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PhaseWindows {
    pub acceleration: FrameRange,
    pub contact: FrameRange,
}

/// Verifier tolerances and thresholds
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Minimum history length before any verdict is attempted
    pub min_history_frames: usize,
    /// Minimum clipped window length before any verdict is attempted
    pub min_window_frames: usize,
    /// Inter-segment gap (frames) rated optimal
    pub optimal_gap: i64,
    /// Gap rated acceptable
    pub acceptable_gap: i64,
    /// Gap rated poor; anything beyond is very poor
    pub poor_gap: i64,
    /// Sequence percentage at or above which the chain counts as correct
    pub pass_percentage: f32,
    /// Sequence percentage at or above which affirmative feedback fires
    pub praise_percentage: f32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            min_history_frames: 15,
            min_window_frames: 5,
            optimal_gap: 2,
            acceptable_gap: 4,
            poor_gap: 8,
            pass_percentage: 70.0,
            praise_percentage: 85.0,
        }
    }
}

impl ChainConfig {
    /// Bucket an absolute inter-segment gap against the tolerance bands
    pub fn bucket_for(&self, frames: i64) -> GapQuality {
        if frames <= self.optimal_gap {
            GapQuality::Optimal
        } else if frames <= self.acceptable_gap {
            GapQuality::Acceptable
        } else if frames <= self.poor_gap {
            GapQuality::Poor
        } else {
            GapQuality::VeryPoor
        }
    }
}

/// Quality band for one inter-segment timing gap
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapQuality {
    Optimal,
    Acceptable,
    Poor,
    VeryPoor,
}

impl GapQuality {
    /// Contribution to the chain quality score
    pub fn score(&self) -> f32 {
        match self {
            GapQuality::Optimal => 100.0,
            GapQuality::Acceptable => 75.0,
            GapQuality::Poor => 50.0,
            GapQuality::VeryPoor => 25.0,
        }
    }
}

/// When and how hard a segment peaked
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct SegmentTiming {
    pub segment: Segment,
    /// Frame index of peak velocity within the supplied history,
    /// -1 if the segment never produced a valid measurement
    pub peak_frame: i64,
    pub peak_velocity: f32,
}

/// One ordering violation between consecutive segments
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Violation {
    /// The distal segment that activated out of order
    pub segment: Segment,
    pub expected: String,
    pub actual: String,
    /// Signed peak-frame gap (distal minus proximal); <= 0 for violations
    pub frame_gap: i64,
}

/// Timing gap between one consecutive segment pair
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TimingGap {
    pub from: Segment,
    pub to: Segment,
    /// Absolute gap in frames
    pub frames: i64,
    pub quality: GapQuality,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackSeverity {
    High,
    Medium,
    Positive,
}

/// One diagnostic message for the coaching layer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeedbackMessage {
    pub severity: FeedbackSeverity,
    pub message: String,
}

/// Complete verdict for one movement
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainAnalysis {
    /// Per-segment peak timings in chain order
    pub timings: Vec<SegmentTiming>,
    pub correct: bool,
    /// Passed ordering checks out of the fixed 6, as a percentage
    pub correct_percentage: f32,
    pub violations: Vec<Violation>,
    /// One entry per consecutive pair; None where timing data was missing
    pub timing_gaps: Vec<Option<TimingGap>>,
    /// 0-100 composite of sequence correctness and gap quality
    pub chain_quality: f32,
    pub feedback: Vec<FeedbackMessage>,
}

/// Difference between a user's verdict and a reference one
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainComparison {
    pub correct_match: bool,
    pub quality_delta: f32,
    /// Per-transition signed frame differences (user minus reference),
    /// None where either side lacks timing data
    pub transition_deltas: Vec<Option<i64>>,
}

/// Stateless verifier for completed movements
pub struct KineticChainVerifier {
    config: ChainConfig,
}

impl KineticChainVerifier {
    pub fn new(config: ChainConfig) -> Self {
        Self { config }
    }

    /// Analyze a completed movement.
    ///
    /// Returns `None` when the history or the clipped phase window is
    /// too short to say anything - a normal outcome the caller handles,
    /// not an error.
    pub fn analyze(&self, history: &[FrameRecord], phases: &PhaseWindows) -> Option<ChainAnalysis> {
        if history.len() < self.config.min_history_frames {
            return None;
        }

        let start = phases.acceleration.start.min(history.len() - 1);
        let end = phases.contact.end.min(history.len() - 1);
        if end < start || end - start + 1 < self.config.min_window_frames {
            return None;
        }

        let timings = self.find_peaks(history, start, end);
        let (violations, correct_percentage) = self.check_sequence(&timings);
        let correct = correct_percentage >= self.config.pass_percentage;
        let timing_gaps = self.timing_gaps(&timings);
        let chain_quality = self.score(correct_percentage, &timing_gaps);
        let feedback = self.synthesize_feedback(&violations, &timing_gaps, correct_percentage);

        debug!(
            correct,
            correct_percentage,
            chain_quality,
            violations = violations.len(),
            "kinetic chain verdict"
        );

        Some(ChainAnalysis {
            timings,
            correct,
            correct_percentage,
            violations,
            timing_gaps,
            chain_quality,
            feedback,
        })
    }

    /// Diff a user verdict against a reference one (e.g. a pro's serve).
    ///
    /// Purely a derived read; no new computation over frame data.
    pub fn compare_to_reference(user: &ChainAnalysis, reference: &ChainAnalysis) -> ChainComparison {
        let transition_deltas = (0..TRANSITION_COUNT)
            .map(|i| {
                let user_gap = transition_gap(&user.timings, i)?;
                let reference_gap = transition_gap(&reference.timings, i)?;
                Some(user_gap - reference_gap)
            })
            .collect();

        ChainComparison {
            correct_match: user.correct == reference.correct,
            quality_delta: user.chain_quality - reference.chain_quality,
            transition_deltas,
        }
    }

    /// Scan the window for each segment's peak-velocity frame.
    ///
    /// Per mapped joint, the Kalman speed on the current frame is
    /// preferred; the raw position delta between consecutive frames is
    /// the fallback when no estimate exists for that joint.
    fn find_peaks(&self, history: &[FrameRecord], start: usize, end: usize) -> Vec<SegmentTiming> {
        SEGMENT_ORDER
            .iter()
            .map(|&segment| {
                let mut peak_frame: i64 = -1;
                let mut peak_velocity = f32::NEG_INFINITY;

                for i in (start + 1)..=end {
                    if let Some(velocity) = segment_velocity(segment, &history[i - 1], &history[i])
                    {
                        if velocity > peak_velocity {
                            peak_velocity = velocity;
                            peak_frame = i as i64;
                        }
                    }
                }

                SegmentTiming {
                    segment,
                    peak_frame,
                    peak_velocity: if peak_frame >= 0 { peak_velocity } else { 0.0 },
                }
            })
            .collect()
    }

    /// Check the 6 consecutive pairs; pairs with missing data are
    /// skipped but still count in the fixed denominator.
    fn check_sequence(&self, timings: &[SegmentTiming]) -> (Vec<Violation>, f32) {
        let mut violations = Vec::new();
        let mut passed = 0usize;

        for pair in timings.windows(2) {
            let (earlier, later) = (&pair[0], &pair[1]);
            if earlier.peak_frame < 0 || later.peak_frame < 0 {
                continue;
            }
            let gap = later.peak_frame - earlier.peak_frame;
            if gap > 0 {
                passed += 1;
            } else {
                let actual = if gap == 0 {
                    format!("{} peaked on the same frame as {}", later.segment.name(), earlier.segment.name())
                } else {
                    format!(
                        "{} peaked {} frames before {}",
                        later.segment.name(),
                        -gap,
                        earlier.segment.name()
                    )
                };
                violations.push(Violation {
                    segment: later.segment,
                    expected: format!(
                        "{} peaks after {}",
                        later.segment.name(),
                        earlier.segment.name()
                    ),
                    actual,
                    frame_gap: gap,
                });
            }
        }

        // Fixed denominator: skipped pairs still divide the score so
        // sessions with different missing-data patterns stay comparable
        let percentage = passed as f32 / TRANSITION_COUNT as f32 * 100.0;
        (violations, percentage)
    }

    fn timing_gaps(&self, timings: &[SegmentTiming]) -> Vec<Option<TimingGap>> {
        timings
            .windows(2)
            .map(|pair| {
                let (earlier, later) = (&pair[0], &pair[1]);
                if earlier.peak_frame < 0 || later.peak_frame < 0 {
                    return None;
                }
                let frames = (later.peak_frame - earlier.peak_frame).abs();
                Some(TimingGap {
                    from: earlier.segment,
                    to: later.segment,
                    frames,
                    quality: self.config.bucket_for(frames),
                })
            })
            .collect()
    }

    /// 50/50 blend of sequence correctness and timing-gap quality; with
    /// no valid gaps the score is the sequence term alone
    fn score(&self, correct_percentage: f32, gaps: &[Option<TimingGap>]) -> f32 {
        let scores: Vec<f32> = gaps
            .iter()
            .flatten()
            .map(|gap| gap.quality.score())
            .collect();
        if scores.is_empty() {
            return correct_percentage;
        }
        let timing_term = scores.iter().sum::<f32>() / scores.len() as f32;
        0.5 * correct_percentage + 0.5 * timing_term
    }

    fn synthesize_feedback(
        &self,
        violations: &[Violation],
        gaps: &[Option<TimingGap>],
        correct_percentage: f32,
    ) -> Vec<FeedbackMessage> {
        let mut feedback = Vec::new();

        if let Some(first) = violations.first() {
            feedback.push(FeedbackMessage {
                severity: FeedbackSeverity::High,
                message: format!(
                    "{} activating too early: {}",
                    first.segment.name(),
                    first.segment.violation_hint()
                ),
            });
        }

        // Up to two callouts for the slowest problem transitions
        let mut slow: Vec<&TimingGap> = gaps
            .iter()
            .flatten()
            .filter(|gap| matches!(gap.quality, GapQuality::Poor | GapQuality::VeryPoor))
            .collect();
        slow.sort_by_key(|gap| std::cmp::Reverse(gap.frames));
        for gap in slow.into_iter().take(2) {
            feedback.push(FeedbackMessage {
                severity: FeedbackSeverity::Medium,
                message: format!(
                    "{} to {} transition took {} frames; tighten the chain",
                    gap.from.name(),
                    gap.to.name(),
                    gap.frames
                ),
            });
        }

        if violations.is_empty() && correct_percentage >= self.config.praise_percentage {
            feedback.push(FeedbackMessage {
                severity: FeedbackSeverity::Positive,
                message: "clean kinetic chain: segments fired in the right order".to_string(),
            });
        }

        feedback
    }
}

impl Default for KineticChainVerifier {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

/// Signed peak-frame gap for transition `i`, if both sides were detected
fn transition_gap(timings: &[SegmentTiming], i: usize) -> Option<i64> {
    let earlier = timings.get(i)?;
    let later = timings.get(i + 1)?;
    if earlier.peak_frame < 0 || later.peak_frame < 0 {
        return None;
    }
    Some(later.peak_frame - earlier.peak_frame)
}

/// Average instantaneous velocity for a segment between two frames.
///
/// Returns `None` when no mapped joint produced a measurement.
fn segment_velocity(segment: Segment, prev: &FrameRecord, curr: &FrameRecord) -> Option<f32> {
    let mut total = 0.0;
    let mut count = 0u32;

    for joint in segment.joints() {
        if let Some(speed) = curr
            .estimates
            .as_ref()
            .and_then(|estimates| estimates.get(*joint))
            .map(|est| est.speed)
        {
            total += speed;
            count += 1;
        } else if let (Some(&(px, py)), Some(&(cx, cy))) =
            (prev.joints.get(*joint), curr.joints.get(*joint))
        {
            let (dx, dy) = (cx - px, cy - py);
            total += (dx * dx + dy * dy).sqrt();
            count += 1;
        }
    }

    (count > 0).then(|| total / count as f32)
}
