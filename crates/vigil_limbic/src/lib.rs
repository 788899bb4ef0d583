//! # Vigil Limbic
//!
//! Fast, non-deliberative sensitivity control. The agent's behavioral state
//! (plus how much it trusts whoever it is dealing with) decides how loudly
//! each sensory error channel should speak:
//!
//! - a defensive agent listens hard to distance and velocity and barely looks
//!   at faces
//! - a greeting agent does the opposite
//! - a deeply focused agent turns everything down
//!
//! Gains move toward their per-state targets through a continuous-time
//! exponential filter, so convergence speed does not depend on how often the
//! decision layer calls in.

mod gain;
mod profile;

pub use gain::{GainSnapshot, GainVector, SensoryGainController};
pub use profile::{profile, profile_gain, STATE_PROFILES};
