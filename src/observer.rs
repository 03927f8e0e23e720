//! Simulated observer for closed-loop runs.
//!
//! Supplies yes/no responses so the adaptive practice loop can be exercised
//! without a display or input device:
//! - The session presents trial factors and the current offset multiplier.
//! - The observer responds with a hit probability that saturates as the
//!   target becomes more displaced, and a flat false-alarm rate otherwise.
//! - It is a driver for the adaptive loop, not a model of human vision.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prng::Prng;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ObserverConfig {
    /// Slope of the saturating hit-probability curve in the offset
    /// multiplier.
    pub sensitivity: f32,
    /// Ceiling loss: hits top out at `1 - lapse_rate`.
    pub lapse_rate: f32,
    /// Response probability on no-target trials (also the hit floor).
    pub false_alarm_rate: f32,
    /// Simulated response latency range in ms.
    pub latency_ms: (f32, f32),
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.35,
            lapse_rate: 0.05,
            false_alarm_rate: 0.10,
            latency_ms: (250.0, 900.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimulatedObserver {
    cfg: ObserverConfig,
    prng: Prng,
}

impl SimulatedObserver {
    pub fn new(cfg: ObserverConfig, seed: u64) -> Self {
        Self {
            cfg,
            prng: Prng::new(seed),
        }
    }

    pub fn config(&self) -> &ObserverConfig {
        &self.cfg
    }

    pub fn set_sensitivity(&mut self, sensitivity: f32) {
        self.cfg.sensitivity = sensitivity.max(0.0);
    }

    pub fn set_false_alarm_rate(&mut self, rate: f32) {
        self.cfg.false_alarm_rate = rate.clamp(0.0, 1.0);
    }

    /// Probability of responding on a target trial at the given offset
    /// multiplier.
    pub fn hit_probability(&self, offset_mod: f32) -> f32 {
        let drive = self.cfg.sensitivity * offset_mod.max(0.0);
        let p = 1.0 - (-drive).exp();
        p.clamp(self.cfg.false_alarm_rate, 1.0 - self.cfg.lapse_rate)
    }

    /// Simulate one trial. `Some(latency_ms)` when the observer responds.
    pub fn respond(&mut self, target_present: bool, offset_mod: f32) -> Option<u32> {
        let p = if target_present {
            self.hit_probability(offset_mod)
        } else {
            self.cfg.false_alarm_rate
        };

        if self.prng.next_f32_01() < p {
            let (lo, hi) = self.cfg.latency_ms;
            Some(self.prng.gen_range_f32(lo, hi.max(lo)) as u32)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_probability_rises_with_offset() {
        let obs = SimulatedObserver::new(ObserverConfig::default(), 1);
        let mut last = 0.0;
        for step in 0..10 {
            let p = obs.hit_probability(step as f32);
            assert!(p >= last);
            last = p;
        }
        assert!(obs.hit_probability(100.0) <= 1.0 - obs.config().lapse_rate + 1e-6);
    }

    #[test]
    fn zero_false_alarm_rate_never_responds_to_noise() {
        let cfg = ObserverConfig {
            false_alarm_rate: 0.0,
            ..ObserverConfig::default()
        };
        let mut obs = SimulatedObserver::new(cfg, 42);
        for _ in 0..500 {
            assert_eq!(obs.respond(false, 5.0), None);
        }
    }

    #[test]
    fn strong_targets_are_mostly_hit() {
        let mut obs = SimulatedObserver::new(ObserverConfig::default(), 7);
        let mut hits = 0;
        for _ in 0..1000 {
            if obs.respond(true, 20.0).is_some() {
                hits += 1;
            }
        }
        // Ceiling is 0.95; leave slack for sampling noise.
        assert!(hits > 900, "hits = {hits}");
    }
}
