//! Adaptive difficulty control for the practice phase.
//!
//! During practice, the task tunes its target-offset multiplier to hold the
//! participant inside a configured accuracy band. Every completed trial is
//! recorded; at a fixed cadence the controller inspects the most recent
//! window of outcomes, classifies performance, and nudges the multiplier.
//! Two consecutive in-band assessments end the adaptive phase.
//!
//! The controller is pure in-memory state: no I/O, no clocks. The trial loop
//! drives it strictly between trials.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for practice-phase difficulty adaptation.
///
/// `upstep` is applied when performance is above the band (the task should
/// get harder), `downstep` when below it (easier). Both are signed deltas on
/// the target-offset multiplier; since a larger multiplier makes the target
/// easier to discriminate, the usual deployment uses a negative `upstep` and
/// a positive `downstep`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PracticeConfig {
    /// Number of most-recent trials inspected per assessment.
    pub assessment_window: usize,
    /// Assessments run when the 1-based trial index is a multiple of this.
    pub assessment_interval: usize,
    /// No assessment before this many completed trials.
    pub min_trials: usize,
    /// Correct counts strictly below this classify as low performance.
    pub lower_bound: usize,
    /// Correct counts strictly above this classify as high performance.
    pub upper_bound: usize,
    /// Multiplier delta applied on high performance.
    pub upstep: f32,
    /// Multiplier delta applied on low performance.
    pub downstep: f32,
    /// Starting value for the target-offset multiplier.
    pub initial_offset_mod: f32,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            assessment_window: 20,
            assessment_interval: 10,
            min_trials: 20,
            lower_bound: 15,
            upper_bound: 17,
            upstep: -1.0,
            downstep: 1.0,
            initial_offset_mod: 5.0,
        }
    }
}

impl PracticeConfig {
    /// Multiplier delta for one performance category.
    pub fn adjustment_for(&self, performance: Performance) -> f32 {
        match performance {
            Performance::Low => self.downstep,
            Performance::Ideal => 0.0,
            Performance::High => self.upstep,
        }
    }
}

/// Performance category produced by one assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Performance {
    Low,
    Ideal,
    High,
}

impl Performance {
    pub fn label(self) -> &'static str {
        match self {
            Performance::Low => "low",
            Performance::Ideal => "ideal",
            Performance::High => "high",
        }
    }

    /// Parse a stored/transmitted category label.
    ///
    /// Inside the crate the enum makes unrepresentable categories impossible;
    /// this boundary is where an out-of-set category can still appear.
    pub fn from_label(label: &str) -> Result<Self, AssessError> {
        match label {
            "low" => Ok(Performance::Low),
            "ideal" => Ok(Performance::Ideal),
            "high" => Ok(Performance::High),
            _ => Err(AssessError::InvalidCategory),
        }
    }
}

/// Adaptive phase state. `Stable` is terminal: the practice loop must stop
/// issuing adaptive trials once it is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PracticePhase {
    #[default]
    Running,
    Stable,
}

/// Result of one performed assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assessment {
    /// 1-based trial index the assessment ran at.
    pub at_trial: usize,
    /// Correct count over the assessment window.
    pub correct_count: usize,
    pub performance: Performance,
    /// Delta applied to the offset multiplier (0 when ideal or stable).
    pub adjustment: f32,
    /// Whether this assessment completed the adaptive phase.
    pub stable: bool,
}

/// Assessment failures. Both indicate a broken caller or a broken
/// classification path, not a retryable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessError {
    /// Fewer outcomes recorded than the assessment window needs.
    InsufficientData { have: usize, need: usize },
    /// A category outside the enumerated set reached the adjustment step.
    InvalidCategory,
}

impl core::fmt::Display for AssessError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AssessError::InsufficientData { have, need } => write!(
                f,
                "insufficient trials for performance assessment ({have} recorded, {need} needed)"
            ),
            AssessError::InvalidCategory => {
                write!(f, "performance must be one of: low, ideal, high")
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AssessError {}

/// Practice-phase difficulty controller.
///
/// Owns the per-phase correctness history, the append-only performance log,
/// and the target-offset multiplier read by stimulus generation.
#[derive(Debug, Clone)]
pub struct DifficultyController {
    cfg: PracticeConfig,
    outcomes: Vec<bool>,
    performance_log: Vec<Performance>,
    offset_mod: f32,
    phase: PracticePhase,
}

impl DifficultyController {
    pub fn new(cfg: PracticeConfig) -> Self {
        let mut cfg = cfg;
        // A zero interval or window would make the cadence check meaningless.
        cfg.assessment_interval = cfg.assessment_interval.max(1);
        cfg.assessment_window = cfg.assessment_window.max(1);

        Self {
            offset_mod: cfg.initial_offset_mod,
            cfg,
            outcomes: Vec::new(),
            performance_log: Vec::new(),
            phase: PracticePhase::Running,
        }
    }

    pub fn config(&self) -> &PracticeConfig {
        &self.cfg
    }

    /// Current target-offset multiplier. Readable at any time; written only
    /// at assessment points.
    pub fn offset_mod(&self) -> f32 {
        self.offset_mod
    }

    pub fn phase(&self) -> PracticePhase {
        self.phase
    }

    pub fn is_stable(&self) -> bool {
        self.phase == PracticePhase::Stable
    }

    /// One entry per performed assessment, oldest first.
    pub fn performance_log(&self) -> &[Performance] {
        &self.performance_log
    }

    pub fn last_performance(&self) -> Option<Performance> {
        self.performance_log.last().copied()
    }

    pub fn outcomes_recorded(&self) -> usize {
        self.outcomes.len()
    }

    /// Correctness history for the current adaptive phase, oldest first.
    pub fn outcomes(&self) -> &[bool] {
        &self.outcomes
    }

    /// Append one trial's correctness outcome. Side effect only.
    pub fn record_trial_outcome(&mut self, correct: bool) {
        self.outcomes.push(correct);
    }

    /// Run an assessment if one is due at `trial_index` (1-based, counted
    /// within the adaptive phase).
    ///
    /// Returns `Ok(None)` when no assessment is due. On an assessment,
    /// classifies the last window of outcomes, appends to the performance
    /// log, applies the difficulty adjustment, and reports whether the phase
    /// just became stable.
    pub fn maybe_assess(&mut self, trial_index: usize) -> Result<Option<Assessment>, AssessError> {
        if trial_index < self.cfg.min_trials || trial_index % self.cfg.assessment_interval != 0 {
            return Ok(None);
        }

        if self.outcomes.len() < self.cfg.assessment_window {
            return Err(AssessError::InsufficientData {
                have: self.outcomes.len(),
                need: self.cfg.assessment_window,
            });
        }

        let window = &self.outcomes[self.outcomes.len() - self.cfg.assessment_window..];
        let correct_count = window.iter().filter(|&&ok| ok).count();
        let performance = self.classify(correct_count);
        self.performance_log.push(performance);

        // Two consecutive in-band assessments end the adaptive phase without
        // touching the multiplier.
        let n = self.performance_log.len();
        if n >= 2
            && self.performance_log[n - 1] == Performance::Ideal
            && self.performance_log[n - 2] == Performance::Ideal
        {
            self.phase = PracticePhase::Stable;
            return Ok(Some(Assessment {
                at_trial: trial_index,
                correct_count,
                performance,
                adjustment: 0.0,
                stable: true,
            }));
        }

        let adjustment = self.cfg.adjustment_for(performance);
        self.offset_mod += adjustment;

        Ok(Some(Assessment {
            at_trial: trial_index,
            correct_count,
            performance,
            adjustment,
            stable: false,
        }))
    }

    fn classify(&self, correct_count: usize) -> Performance {
        // Strict comparisons: counts exactly at a bound are in-band.
        if correct_count < self.cfg.lower_bound {
            Performance::Low
        } else if correct_count > self.cfg.upper_bound {
            Performance::High
        } else {
            Performance::Ideal
        }
    }

    /// Start a fresh adaptive phase: clears the correctness history and the
    /// performance log, restores the initial multiplier.
    pub fn reset(&mut self) {
        self.outcomes.clear();
        self.performance_log.clear();
        self.offset_mod = self.cfg.initial_offset_mod;
        self.phase = PracticePhase::Running;
    }

    #[cfg(feature = "std")]
    pub(crate) fn restore(
        cfg: PracticeConfig,
        outcomes: Vec<bool>,
        performance_log: Vec<Performance>,
        offset_mod: f32,
        phase: PracticePhase,
    ) -> Self {
        let mut ctl = Self::new(cfg);
        ctl.outcomes = outcomes;
        ctl.performance_log = performance_log;
        ctl.offset_mod = offset_mod;
        ctl.phase = phase;
        ctl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cfg() -> PracticeConfig {
        PracticeConfig {
            assessment_window: 20,
            assessment_interval: 10,
            min_trials: 20,
            lower_bound: 15,
            upper_bound: 17,
            upstep: 1.0,
            downstep: -1.0,
            initial_offset_mod: 5.0,
        }
    }

    fn record_n(ctl: &mut DifficultyController, correct: usize, incorrect: usize) {
        for _ in 0..correct {
            ctl.record_trial_outcome(true);
        }
        for _ in 0..incorrect {
            ctl.record_trial_outcome(false);
        }
    }

    #[test]
    fn no_assessment_before_min_trials() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 10, 0);

        assert_eq!(ctl.maybe_assess(10), Ok(None));
        assert_eq!(ctl.offset_mod(), 5.0);
        assert!(ctl.performance_log().is_empty());
    }

    #[test]
    fn no_assessment_off_cadence() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 25, 0);

        assert_eq!(ctl.maybe_assess(25), Ok(None));
        assert_eq!(ctl.offset_mod(), 5.0);
        assert!(ctl.performance_log().is_empty());
    }

    #[test]
    fn insufficient_data_leaves_state_untouched() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 12, 0);

        // Qualifying index, but only 12 outcomes recorded.
        let res = ctl.maybe_assess(20);
        assert_eq!(res, Err(AssessError::InsufficientData { have: 12, need: 20 }));
        assert_eq!(ctl.offset_mod(), 5.0);
        assert!(ctl.performance_log().is_empty());
        assert!(!ctl.is_stable());
    }

    #[test]
    fn high_performance_applies_upstep() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 18, 2);

        let a = ctl.maybe_assess(20).unwrap().unwrap();
        assert_eq!(a.performance, Performance::High);
        assert_eq!(a.correct_count, 18);
        assert_eq!(a.adjustment, 1.0);
        assert!(!a.stable);
        assert_eq!(ctl.offset_mod(), 6.0);
        assert_eq!(ctl.phase(), PracticePhase::Running);
    }

    #[test]
    fn low_performance_applies_downstep() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 12, 8);

        let a = ctl.maybe_assess(20).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Low);
        assert_eq!(a.correct_count, 12);
        assert_eq!(a.adjustment, -1.0);
        assert_eq!(ctl.offset_mod(), 4.0);
    }

    #[test]
    fn bound_counts_are_in_band() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 15, 5);
        let a = ctl.maybe_assess(20).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Ideal);
        assert_eq!(a.adjustment, 0.0);
        assert_eq!(ctl.offset_mod(), 5.0);

        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 17, 3);
        let a = ctl.maybe_assess(20).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Ideal);
        assert_eq!(ctl.offset_mod(), 5.0);
    }

    #[test]
    fn single_ideal_does_not_stabilize() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 16, 4);

        let a = ctl.maybe_assess(20).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Ideal);
        assert!(!a.stable);
        assert_eq!(ctl.phase(), PracticePhase::Running);
    }

    #[test]
    fn two_consecutive_ideals_stabilize_without_adjustment() {
        let mut ctl = DifficultyController::new(test_cfg());

        // First window: 16/20 correct.
        record_n(&mut ctl, 16, 4);
        let a = ctl.maybe_assess(20).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Ideal);
        assert!(!a.stable);

        // Ten more correct trials; the window over trials 11..30 holds the
        // first batch's tail (6 correct of 10) plus these, 16/20 again.
        record_n(&mut ctl, 10, 0);
        let a = ctl.maybe_assess(30).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Ideal);
        assert!(a.stable);
        assert_eq!(ctl.phase(), PracticePhase::Stable);
        assert_eq!(ctl.offset_mod(), 5.0);
    }

    #[test]
    fn ideal_interrupted_by_adjustment_does_not_stabilize() {
        let mut ctl = DifficultyController::new(test_cfg());

        record_n(&mut ctl, 16, 4);
        assert_eq!(
            ctl.maybe_assess(20).unwrap().unwrap().performance,
            Performance::Ideal
        );

        // Window over trials 11..30: 6 correct from the first batch's tail
        // plus 7 here, 13/20: low, adjusted.
        record_n(&mut ctl, 7, 3);
        let a = ctl.maybe_assess(30).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Low);
        assert!(!a.stable);

        // Window over trials 21..40: 7 + 10 = 17/20. Back in band once:
        // still running.
        record_n(&mut ctl, 10, 0);
        let a = ctl.maybe_assess(40).unwrap().unwrap();
        assert_eq!(a.performance, Performance::Ideal);
        assert!(!a.stable);
        assert_eq!(ctl.phase(), PracticePhase::Running);
    }

    #[test]
    fn reset_starts_a_fresh_phase() {
        let mut ctl = DifficultyController::new(test_cfg());
        record_n(&mut ctl, 18, 2);
        ctl.maybe_assess(20).unwrap();
        assert_eq!(ctl.offset_mod(), 6.0);

        ctl.reset();
        assert_eq!(ctl.offset_mod(), 5.0);
        assert_eq!(ctl.outcomes_recorded(), 0);
        assert!(ctl.performance_log().is_empty());
        assert_eq!(ctl.phase(), PracticePhase::Running);
    }

    #[test]
    fn labels_round_trip_and_reject_unknown() {
        for p in [Performance::Low, Performance::Ideal, Performance::High] {
            assert_eq!(Performance::from_label(p.label()), Ok(p));
        }
        assert_eq!(
            Performance::from_label("medium"),
            Err(AssessError::InvalidCategory)
        );
    }
}
