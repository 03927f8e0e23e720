//! Line-array stimulus geometry.
//!
//! A trial presents five short horizontal lines in a row. Each flanker is
//! vertically jittered on a small lattice; on target trials the centre line's
//! jitter is the flanker maximum scaled by the current offset multiplier, so
//! the target is the only line that can stand out from the row.
//!
//! This module produces coordinates only. Drawing, screen units, and timing
//! belong to the presentation layer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prng::Prng;

/// Geometry of the five-line array. Lengths are in visual degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArrayConfig {
    pub line_length: f32,
    pub stroke_width: f32,
    /// Jitter lattice step.
    pub jitter_unit: f32,
    /// Exclusive upper bound on sampled flanker jitter.
    pub jitter_bound: f32,
    /// Gap between neighbouring line endpoints.
    pub flanker_gap: f32,
    /// Slot indices relative to the array centre.
    pub slots: [i32; 5],
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            line_length: 0.5,
            stroke_width: 0.1,
            jitter_unit: 0.02,
            jitter_bound: 0.06,
            flanker_gap: 0.15,
            slots: [-2, -1, 0, 1, 2],
        }
    }
}

impl ArrayConfig {
    /// Centre-to-centre distance between neighbouring lines.
    pub fn flanker_offset(&self) -> f32 {
        self.line_length + self.flanker_gap
    }

    /// Number of points on the jitter lattice `{0, unit, 2*unit, ..}`.
    fn jitter_steps(&self) -> usize {
        if self.jitter_unit <= 0.0 {
            return 1;
        }
        ((self.jitter_bound / self.jitter_unit).ceil() as usize).max(1)
    }
}

/// Quadrant the array is centred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArrayLocation {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl ArrayLocation {
    pub const ALL: [ArrayLocation; 4] = [
        ArrayLocation::TopLeft,
        ArrayLocation::TopRight,
        ArrayLocation::BottomLeft,
        ArrayLocation::BottomRight,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ArrayLocation::TopLeft => "top_left",
            ArrayLocation::TopRight => "top_right",
            ArrayLocation::BottomLeft => "bottom_left",
            ArrayLocation::BottomRight => "bottom_right",
        }
    }

    /// Anchor position in normalized screen coordinates: screen centre offset
    /// by a third of each half-extent.
    pub fn anchor_norm(self) -> (f32, f32) {
        let dx = 0.5 / 3.0;
        let dy = 0.5 / 3.0;
        match self {
            ArrayLocation::TopLeft => (0.5 - dx, 0.5 - dy),
            ArrayLocation::TopRight => (0.5 + dx, 0.5 - dy),
            ArrayLocation::BottomLeft => (0.5 - dx, 0.5 + dy),
            ArrayLocation::BottomRight => (0.5 + dx, 0.5 + dy),
        }
    }
}

/// One generated array: line centres relative to the array centre, plus the
/// target's unsigned jitter when a target is present.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LineArray {
    pub positions: Vec<(f32, f32)>,
    pub target_jitter: Option<f32>,
}

impl LineArray {
    /// Sample one array.
    ///
    /// `offset_mod` is the controller's current target-offset multiplier; it
    /// is only consulted on target trials.
    pub fn generate(
        cfg: &ArrayConfig,
        prng: &mut Prng,
        target_present: bool,
        offset_mod: f32,
    ) -> Self {
        let n = cfg.slots.len();
        let steps = cfg.jitter_steps();

        let mut jitter = [0.0f32; 5];
        for j in jitter.iter_mut() {
            *j = prng.gen_range_usize(0, steps) as f32 * cfg.jitter_unit;
        }

        let target_jitter = if target_present {
            // To be discriminable at all, the target's jitter must exceed
            // that of any flanker.
            let max_jitter = jitter.iter().fold(0.0f32, |m, &j| m.max(j));
            jitter[2] = max_jitter * offset_mod;
            Some(jitter[2])
        } else {
            None
        };

        let mut positions = Vec::with_capacity(n);
        for i in 0..n {
            let sign = if prng.gen_bool() { 1.0 } else { -1.0 };
            let x = cfg.slots[i] as f32 * cfg.flanker_offset();
            let y = jitter[i] * sign;
            positions.push((x, y));
        }

        Self {
            positions,
            target_jitter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_lines_spaced_by_flanker_offset() {
        let cfg = ArrayConfig::default();
        let mut prng = Prng::new(7);
        let arr = LineArray::generate(&cfg, &mut prng, false, 5.0);

        assert_eq!(arr.positions.len(), 5);
        assert_eq!(arr.target_jitter, None);
        for (i, &(x, _)) in arr.positions.iter().enumerate() {
            let expected = cfg.slots[i] as f32 * cfg.flanker_offset();
            assert!((x - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn flanker_jitter_stays_on_lattice_below_bound() {
        let cfg = ArrayConfig::default();
        let mut prng = Prng::new(99);

        for _ in 0..200 {
            let arr = LineArray::generate(&cfg, &mut prng, false, 5.0);
            for &(_, y) in &arr.positions {
                let j = y.abs();
                assert!(j < cfg.jitter_bound);
                let steps = j / cfg.jitter_unit;
                assert!((steps - steps.round()).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn target_jitter_dominates_flankers() {
        let cfg = ArrayConfig::default();
        let mut prng = Prng::new(3);

        for _ in 0..200 {
            let arr = LineArray::generate(&cfg, &mut prng, true, 5.0);
            let target = arr.target_jitter.expect("target trial");
            assert!((arr.positions[2].1.abs() - target).abs() < 1e-6);
            for (i, &(_, y)) in arr.positions.iter().enumerate() {
                if i != 2 {
                    assert!(target >= y.abs());
                }
            }
        }
    }

    #[test]
    fn anchors_sit_a_third_off_centre() {
        let (x, y) = ArrayLocation::TopLeft.anchor_norm();
        assert!(x < 0.5 && y < 0.5);
        let (x, y) = ArrayLocation::BottomRight.anchor_norm();
        assert!(x > 0.5 && y > 0.5);

        for loc in ArrayLocation::ALL {
            let (x, y) = loc.anchor_norm();
            assert!(((x - 0.5).abs() - 0.5 / 3.0).abs() < 1e-6);
            assert!(((y - 0.5).abs() - 0.5 / 3.0).abs() < 1e-6);
        }
    }
}
