//! # vigil
//!
//! Core logic for a line-discrimination vigilance task with an adaptive
//! practice phase.
//!
//! The participant watches brief five-line arrays and responds when the
//! centre line is displaced from the row. During practice, a difficulty
//! controller watches a rolling window of correctness outcomes and tunes the
//! target's offset multiplier until performance settles inside a configured
//! band.
//!
//! ## Quick Start
//!
//! ```
//! use vigil::prelude::*;
//!
//! let mut controller = DifficultyController::new(PracticeConfig::default());
//!
//! // One outcome per completed trial; assess on the controller's cadence.
//! for trial in 1..=20 {
//!     controller.record_trial_outcome(trial % 5 != 0);
//!     if let Some(assessment) = controller.maybe_assess(trial).unwrap() {
//!         // 16/20 correct sits inside the default [15, 17] band.
//!         assert_eq!(assessment.performance, Performance::Ideal);
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Standard library support
//! - `serde`: Enable serialization/deserialization
//!
//! ## no_std Support
//!
//! The controller and PRNG work without `std`:
//! ```toml
//! vigil = { version = "0.1", default-features = false }
//! ```
//!
//! ## Modules
//!
//! - [`practice`]: Adaptive difficulty controller
//! - [`array`]: Line-array stimulus geometry
//! - [`session`]: Practice session state and trial bookkeeping
//! - [`observer`]: Simulated observer for closed-loop runs

// no_std support
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod practice;
pub mod prng;

#[cfg(feature = "std")]
pub mod array;

#[cfg(feature = "std")]
pub mod observer;

#[cfg(feature = "std")]
pub mod session;

#[cfg(feature = "std")]
pub mod stats;

#[cfg(all(feature = "std", feature = "serde"))]
pub mod storage;

/// Prelude module for convenient imports.
///
/// ```
/// use vigil::prelude::*;
/// ```
pub mod prelude {
    pub use crate::practice::{
        AssessError, Assessment, DifficultyController, Performance, PracticeConfig, PracticePhase,
    };
    pub use crate::prng::Prng;

    #[cfg(feature = "std")]
    pub use crate::array::{ArrayConfig, ArrayLocation, LineArray};
    #[cfg(feature = "std")]
    pub use crate::observer::{ObserverConfig, SimulatedObserver};
    #[cfg(feature = "std")]
    pub use crate::session::{PracticeSession, SessionConfig, TrialRecord};
    #[cfg(feature = "std")]
    pub use crate::stats::TaskStats;
}
