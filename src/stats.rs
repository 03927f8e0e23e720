use std::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifetime response bookkeeping for a session.
///
/// Outcomes are kept as signal-detection counts; `recent` holds a bounded
/// window of correctness for rate queries. The adaptive controller keeps its
/// own per-phase history; this struct is for reporting, not adaptation.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TaskStats {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
    pub correct_rejections: u32,
    pub trials: u32,
    pub recent: Vec<bool>,
}

const RECENT_CAP: usize = 200;

impl TaskStats {
    pub fn new() -> Self {
        Self {
            hits: 0,
            misses: 0,
            false_alarms: 0,
            correct_rejections: 0,
            trials: 0,
            recent: Vec::with_capacity(RECENT_CAP),
        }
    }

    /// Record one trial. Correct means hit or correct rejection.
    pub fn record_trial(&mut self, target_present: bool, responded: bool) -> bool {
        let correct = match (target_present, responded) {
            (true, true) => {
                self.hits += 1;
                true
            }
            (true, false) => {
                self.misses += 1;
                false
            }
            (false, true) => {
                self.false_alarms += 1;
                false
            }
            (false, false) => {
                self.correct_rejections += 1;
                true
            }
        };

        self.recent.push(correct);
        if self.recent.len() > RECENT_CAP {
            self.recent.remove(0);
        }

        self.trials += 1;
        correct
    }

    pub fn correct(&self) -> u32 {
        self.hits + self.correct_rejections
    }

    pub fn incorrect(&self) -> u32 {
        self.misses + self.false_alarms
    }

    pub fn accuracy(&self) -> f32 {
        if self.trials == 0 {
            0.5
        } else {
            self.correct() as f32 / self.trials as f32
        }
    }

    pub fn recent_rate(&self) -> f32 {
        if self.recent.is_empty() {
            return 0.5;
        }
        let correct_count = self.recent.iter().filter(|&&x| x).count();
        correct_count as f32 / self.recent.len() as f32
    }

    pub fn hit_rate(&self) -> f32 {
        let signal = self.hits + self.misses;
        if signal == 0 {
            0.0
        } else {
            self.hits as f32 / signal as f32
        }
    }

    pub fn false_alarm_rate(&self) -> f32 {
        let noise = self.false_alarms + self.correct_rejections;
        if noise == 0 {
            0.0
        } else {
            self.false_alarms as f32 / noise as f32
        }
    }
}
