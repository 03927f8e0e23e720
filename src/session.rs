//! Practice session state.
//!
//! Owns everything the vigilance task needs between trials: the trial
//! factors for the upcoming trial, the lifetime response stats, and the
//! adaptive difficulty controller. One session is one participant run;
//! callers drive it strictly sequentially.
//!
//! The session never blocks or draws. Presentation layers read the trial
//! factors and event schedule, collect a response however they like, and
//! hand it back through [`PracticeSession::complete_trial`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::array::{ArrayConfig, ArrayLocation, LineArray};
use crate::practice::{
    AssessError, Assessment, DifficultyController, Performance, PracticeConfig, PracticePhase,
};
use crate::prng::Prng;
use crate::stats::TaskStats;

/// Session-level configuration: stimulus geometry, adaptation policy, and
/// the trial event timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    pub array: ArrayConfig,
    pub practice: PracticeConfig,
    /// Total trial length in ms (response collection ends earlier).
    pub inter_trial_interval_ms: u32,
    pub array_duration_ms: u32,
    pub response_window_ms: u32,
    /// Probability that a practice trial contains a target.
    pub target_rate: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            array: ArrayConfig::default(),
            practice: PracticeConfig::default(),
            inter_trial_interval_ms: 2000,
            array_duration_ms: 200,
            response_window_ms: 1000,
            target_rate: 0.5,
        }
    }
}

impl SessionConfig {
    /// Trial event schedule as (name, onset ms from trial start) pairs.
    pub fn trial_events(&self) -> [(&'static str, u32); 3] {
        let array_off = self.array_duration_ms;
        let response_timeout = array_off + self.response_window_ms;
        let end_trial = self.inter_trial_interval_ms;
        [
            ("array_off", array_off),
            ("response_timeout", response_timeout),
            ("end_trial", end_trial),
        ]
    }
}

/// One completed trial, as handed to the surrounding framework's logger.
/// Persistence format and destination are the framework's concern.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrialRecord {
    pub practicing: bool,
    pub block_num: u32,
    pub trial_num: u32,
    pub target_present: bool,
    pub location: ArrayLocation,
    /// Offset multiplier in effect for this trial; `None` on no-target
    /// trials.
    pub target_offset_mod: Option<f32>,
    /// Latest performance category at trial time (pre-assessment).
    pub practice_performance: Option<Performance>,
    pub rt_ms: Option<u32>,
    pub correct: bool,
    pub ended_early: bool,
}

#[derive(Debug, Clone)]
pub struct PracticeSession {
    cfg: SessionConfig,
    controller: DifficultyController,
    stats: TaskStats,
    prng: Prng,

    block_num: u32,
    /// 1-based index of the current trial within the block.
    trial_num: u32,
    practicing: bool,

    target_present: bool,
    location: ArrayLocation,
    last_assessment: Option<Assessment>,
}

impl PracticeSession {
    pub fn new(cfg: SessionConfig, seed: u64) -> Self {
        let mut session = Self {
            controller: DifficultyController::new(cfg.practice),
            cfg,
            stats: TaskStats::new(),
            prng: Prng::new(seed),
            block_num: 1,
            trial_num: 0,
            practicing: true,
            target_present: false,
            location: ArrayLocation::TopLeft,
            last_assessment: None,
        };
        session.new_trial();
        session
    }

    fn new_trial(&mut self) {
        self.trial_num += 1;
        self.target_present = self.prng.next_f32_01() < self.cfg.target_rate;
        let i = self.prng.gen_range_usize(0, ArrayLocation::ALL.len());
        self.location = ArrayLocation::ALL[i];
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn is_practicing(&self) -> bool {
        self.practicing
    }

    pub fn block_num(&self) -> u32 {
        self.block_num
    }

    pub fn trial_num(&self) -> u32 {
        self.trial_num
    }

    pub fn target_present(&self) -> bool {
        self.target_present
    }

    pub fn location(&self) -> ArrayLocation {
        self.location
    }

    pub fn offset_mod(&self) -> f32 {
        self.controller.offset_mod()
    }

    pub fn phase(&self) -> PracticePhase {
        self.controller.phase()
    }

    pub fn stats(&self) -> &TaskStats {
        &self.stats
    }

    pub fn last_assessment(&self) -> Option<Assessment> {
        self.last_assessment
    }

    pub fn last_performance(&self) -> Option<Performance> {
        self.controller.last_performance()
    }

    /// Sample the stimulus array for the current trial.
    pub fn generate_array(&mut self) -> LineArray {
        LineArray::generate(
            &self.cfg.array,
            &mut self.prng,
            self.target_present,
            self.controller.offset_mod(),
        )
    }

    /// Score the current trial and advance to the next one.
    ///
    /// `responded` is whether any response was made inside the response
    /// window. During practice the outcome feeds the difficulty controller;
    /// when the controller reports stability the practice block ends and
    /// subsequent trials are scored at fixed difficulty.
    pub fn complete_trial(
        &mut self,
        responded: bool,
        rt_ms: Option<u32>,
    ) -> Result<TrialRecord, AssessError> {
        self.finish_trial(responded, rt_ms, false)
    }

    /// End the current trial early (no response collected). The trial still
    /// counts and is scored as a non-response.
    pub fn abort_trial(&mut self) -> Result<TrialRecord, AssessError> {
        self.finish_trial(false, None, true)
    }

    fn finish_trial(
        &mut self,
        responded: bool,
        rt_ms: Option<u32>,
        ended_early: bool,
    ) -> Result<TrialRecord, AssessError> {
        let correct = self.stats.record_trial(self.target_present, responded);

        let record = TrialRecord {
            practicing: self.practicing,
            block_num: self.block_num,
            trial_num: self.trial_num,
            target_present: self.target_present,
            location: self.location,
            target_offset_mod: self
                .target_present
                .then(|| self.controller.offset_mod()),
            practice_performance: self.controller.last_performance(),
            rt_ms: if responded { rt_ms } else { None },
            correct,
            ended_early,
        };

        if self.practicing {
            self.controller.record_trial_outcome(correct);
            if let Some(assessment) = self.controller.maybe_assess(self.trial_num as usize)? {
                self.last_assessment = Some(assessment);
            }

            if self.controller.is_stable() {
                // Practice settled; further trials run at fixed difficulty.
                self.practicing = false;
                self.block_num += 1;
                self.trial_num = 0;
            }
        }

        self.new_trial();
        Ok(record)
    }

    /// Restart practice from scratch with the same configuration.
    pub fn reset(&mut self) {
        self.controller.reset();
        self.stats = TaskStats::new();
        self.block_num = 1;
        self.trial_num = 0;
        self.practicing = true;
        self.last_assessment = None;
        self.new_trial();
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Snapshot support: everything needed to resume a session across restarts.
// ─────────────────────────────────────────────────────────────────────────

#[cfg(all(feature = "std", feature = "serde"))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub cfg: SessionConfig,
    pub outcomes: Vec<bool>,
    pub performance_log: Vec<Performance>,
    pub offset_mod: f32,
    pub phase: PracticePhase,
    pub stats: TaskStats,
    pub block_num: u32,
    pub trial_num: u32,
    pub practicing: bool,
    pub target_present: bool,
    pub location: ArrayLocation,
    pub last_assessment: Option<Assessment>,
    pub prng_state: u64,
}

#[cfg(all(feature = "std", feature = "serde"))]
impl PracticeSession {
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cfg: self.cfg,
            outcomes: self.controller.outcomes().to_vec(),
            performance_log: self.controller.performance_log().to_vec(),
            offset_mod: self.controller.offset_mod(),
            phase: self.controller.phase(),
            stats: self.stats.clone(),
            block_num: self.block_num,
            trial_num: self.trial_num,
            practicing: self.practicing,
            target_present: self.target_present,
            location: self.location,
            last_assessment: self.last_assessment,
            prng_state: self.prng.state(),
        }
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        Self {
            controller: DifficultyController::restore(
                snapshot.cfg.practice,
                snapshot.outcomes,
                snapshot.performance_log,
                snapshot.offset_mod,
                snapshot.phase,
            ),
            cfg: snapshot.cfg,
            stats: snapshot.stats,
            prng: Prng::from_state(snapshot.prng_state),
            block_num: snapshot.block_num,
            trial_num: snapshot.trial_num,
            practicing: snapshot.practicing,
            target_present: snapshot.target_present,
            location: snapshot.location,
            last_assessment: snapshot.last_assessment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_seed(seed: u64) -> PracticeSession {
        PracticeSession::new(SessionConfig::default(), seed)
    }

    // Respond so that the trial comes out correct iff `want_correct`.
    fn drive_trial(s: &mut PracticeSession, want_correct: bool) -> TrialRecord {
        let respond = if want_correct {
            s.target_present()
        } else {
            !s.target_present()
        };
        let rt = respond.then_some(400);
        s.complete_trial(respond, rt).expect("assessment")
    }

    #[test]
    fn scoring_matches_target_and_response() {
        let mut s = session_with_seed(11);

        let target = s.target_present();
        let rec = s.complete_trial(target, target.then_some(500)).unwrap();
        assert!(rec.correct);
        assert_eq!(rec.target_present, target);
        assert_eq!(rec.trial_num, 1);
        assert!(rec.practicing);
        assert_eq!(rec.practice_performance, None);

        let target = s.target_present();
        let rec = s.complete_trial(!target, (!target).then_some(500)).unwrap();
        assert!(!rec.correct);
    }

    #[test]
    fn offset_mod_only_logged_on_target_trials() {
        let mut s = session_with_seed(5);
        for _ in 0..50 {
            let target = s.target_present();
            let rec = drive_trial(&mut s, true);
            if target {
                assert!(rec.target_offset_mod.is_some());
            } else {
                assert_eq!(rec.target_offset_mod, None);
            }
        }
    }

    #[test]
    fn aborted_trials_count_as_non_responses() {
        let mut s = session_with_seed(23);

        // Walk until a target trial comes up, then abort it: a miss.
        while !s.target_present() {
            drive_trial(&mut s, true);
        }
        let rec = s.abort_trial().unwrap();
        assert!(rec.ended_early);
        assert!(!rec.correct);
        assert_eq!(rec.rt_ms, None);
    }

    #[test]
    fn practice_ends_after_two_ideal_assessments() {
        let mut s = session_with_seed(314);

        // 16/20 correct in every window: wrong on every 5th trial.
        let mut trials = 0;
        for i in 1..=30 {
            assert!(s.is_practicing());
            let rec = drive_trial(&mut s, i % 5 != 0);
            trials = rec.trial_num;
        }

        assert_eq!(trials, 30);
        assert!(!s.is_practicing(), "stable after assessments at 20 and 30");
        assert_eq!(s.phase(), PracticePhase::Stable);
        assert_eq!(s.block_num(), 2);
        assert_eq!(s.trial_num(), 1);
        // Both assessments were in-band: multiplier untouched.
        assert_eq!(s.offset_mod(), s.config().practice.initial_offset_mod);
        assert_eq!(s.last_assessment().unwrap().performance, Performance::Ideal);
        assert!(s.last_assessment().unwrap().stable);
    }

    #[test]
    fn post_practice_trials_do_not_assess() {
        let mut s = session_with_seed(314);
        for i in 1..=30 {
            drive_trial(&mut s, i % 5 != 0);
        }
        assert!(!s.is_practicing());

        let offset = s.offset_mod();
        let log_len = s.controller.performance_log().len();
        for _ in 0..40 {
            let rec = drive_trial(&mut s, false);
            assert!(!rec.practicing);
        }
        assert_eq!(s.offset_mod(), offset);
        assert_eq!(s.controller.performance_log().len(), log_len);
    }

    #[test]
    fn consistently_strong_performance_tightens_offset() {
        let mut s = session_with_seed(99);

        // Perfect responding: every assessment is high, each applies the
        // (negative) upstep.
        for _ in 0..30 {
            drive_trial(&mut s, true);
        }
        let initial = s.config().practice.initial_offset_mod;
        let upstep = s.config().practice.upstep;
        assert_eq!(s.offset_mod(), initial + 2.0 * upstep);
        assert!(s.is_practicing());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshot_round_trips_mid_practice() {
        let mut s = session_with_seed(77);
        for i in 1..=25 {
            drive_trial(&mut s, i % 4 != 0);
        }

        let snap = s.snapshot();
        let mut restored = PracticeSession::from_snapshot(snap);

        assert_eq!(restored.trial_num(), s.trial_num());
        assert_eq!(restored.offset_mod(), s.offset_mod());
        assert_eq!(restored.is_practicing(), s.is_practicing());
        assert_eq!(restored.target_present(), s.target_present());

        // Identical PRNG state: both sessions continue identically.
        for _ in 0..20 {
            let a = drive_trial(&mut s, true);
            let b = drive_trial(&mut restored, true);
            assert_eq!(a, b);
        }
    }
}
