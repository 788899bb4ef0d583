//! Sensory Gain Controller - behavioral state → per-channel error gain
//!
//! The controller holds two vectors: the target implied by the current
//! behavioral state and trust, and the smoothed gain actually handed to the
//! error-weighting stage. Both always stay inside `[min_gain, max_gain]`.

use crate::profile::{profile, profile_gain};
use serde::{Deserialize, Serialize};
use vigil_core::math::sanitize;
use vigil_core::{BehavioralState, Channel, GainConfig, CHANNEL_COUNT};

/// Shortest time step the smoothing filter will integrate over.
const MIN_DT: f32 = 0.001;

/// One multiplicative gain per sensory channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainVector([f32; CHANNEL_COUNT]);

impl Default for GainVector {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl GainVector {
    pub fn uniform(value: f32) -> Self {
        Self([value; CHANNEL_COUNT])
    }

    pub fn from_array(gains: [f32; CHANNEL_COUNT]) -> Self {
        Self(gains)
    }

    pub fn as_array(&self) -> &[f32; CHANNEL_COUNT] {
        &self.0
    }

    pub fn get(&self, channel: Channel) -> f32 {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, value: f32) {
        self.0[channel.index()] = value;
    }

    /// Clamp every channel into `[min, max]`.
    pub fn clamped(mut self, min: f32, max: f32) -> Self {
        for g in &mut self.0 {
            *g = g.clamp(min, max);
        }
        self
    }

    /// Per-channel interpolation toward `other`.
    pub fn lerp(&self, other: &GainVector, t: f32) -> GainVector {
        let t = t.clamp(0.0, 1.0);
        let mut out = self.0;
        for (o, target) in out.iter_mut().zip(other.0.iter()) {
            *o += (target - *o) * t;
        }
        GainVector(out)
    }

    /// Largest absolute per-channel difference.
    pub fn max_delta(&self, other: &GainVector) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }

    /// Scale a per-channel error vector by these gains.
    pub fn apply(&self, errors: &[f32; CHANNEL_COUNT]) -> [f32; CHANNEL_COUNT] {
        let mut out = *errors;
        for (e, g) in out.iter_mut().zip(self.0.iter()) {
            *e *= g;
        }
        out
    }
}

/// Serializable view of the controller.
#[derive(Debug, Clone, Serialize)]
pub struct GainSnapshot {
    pub state: BehavioralState,
    pub trust: f32,
    pub current: GainVector,
    pub target: GainVector,
    pub converged: bool,
}

/// Maps behavioral state and trust to smoothed per-channel gains.
///
/// Unlike the allocator and novelty tracker this has no interval gate: every
/// `update` call integrates exactly once, so a state switch is visible on the
/// very next tick.
#[derive(Debug, Clone)]
pub struct SensoryGainController {
    config: GainConfig,
    state: BehavioralState,
    trust: f32,
    current: GainVector,
    target: GainVector,
}

impl Default for SensoryGainController {
    fn default() -> Self {
        Self::new(GainConfig::default())
    }
}

impl SensoryGainController {
    pub fn new(config: GainConfig) -> Self {
        let neutral =
            profile(BehavioralState::Neutral).clamped(config.min_gain, config.max_gain);
        Self {
            config,
            state: BehavioralState::Neutral,
            trust: 0.0,
            current: neutral,
            target: neutral,
        }
    }

    /// Advance one decision tick.
    ///
    /// `trust` is expected in [-1, 1] and is clamped there.
    pub fn update(&mut self, state: BehavioralState, trust: f32, dt: f32) {
        if state != self.state {
            tracing::debug!("Gain profile switch: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
        self.trust = sanitize(trust, 0.0).clamp(-1.0, 1.0);
        self.target = self.compute_target();

        let dt = sanitize(dt, MIN_DT).max(MIN_DT);
        let lerp_factor = 1.0 - (-self.config.transition_speed * dt).exp();
        self.current = self
            .current
            .lerp(&self.target, lerp_factor)
            .clamped(self.config.min_gain, self.config.max_gain);
    }

    /// Same as [`update`](Self::update) but takes a raw state identifier,
    /// clamped onto the known states.
    pub fn update_raw(&mut self, state_id: i64, trust: f32, dt: f32) {
        self.update(BehavioralState::from_index(state_id), trust, dt);
    }

    fn compute_target(&self) -> GainVector {
        let bias = self.trust * self.config.trust_social_bias;
        let mut target = profile(self.state);
        // Trust opens the social channel and relaxes the spatial ones.
        target.set(Channel::Gaze, target.get(Channel::Gaze) + bias);
        target.set(
            Channel::Distance,
            target.get(Channel::Distance) - bias * 0.5,
        );
        target.set(
            Channel::Velocity,
            target.get(Channel::Velocity) - bias * 0.5,
        );
        target.clamped(self.config.min_gain, self.config.max_gain)
    }

    /// Smoothed gain for a channel.
    pub fn gain(&self, channel: Channel) -> f32 {
        self.current.get(channel)
    }

    /// Smoothed gain by raw channel index; 1.0 for an unknown index.
    pub fn gain_at(&self, index: usize) -> f32 {
        self.current.as_array().get(index).copied().unwrap_or(1.0)
    }

    pub fn gains(&self) -> &GainVector {
        &self.current
    }

    /// Pre-smoothing target for a channel.
    pub fn target_gain(&self, channel: Channel) -> f32 {
        self.target.get(channel)
    }

    pub fn targets(&self) -> &GainVector {
        &self.target
    }

    /// Raw profile value, without trust or clamping.
    pub fn profile_gain(&self, state: BehavioralState, channel: Channel) -> f32 {
        profile_gain(state, channel)
    }

    pub fn active_state(&self) -> BehavioralState {
        self.state
    }

    /// True when every channel is within tolerance of its target.
    pub fn is_converged(&self) -> bool {
        self.current.max_delta(&self.target) <= self.config.convergence_tolerance
    }

    /// Apply the current gains to a per-channel error vector.
    pub fn weighted_errors(&self, errors: &[f32; CHANNEL_COUNT]) -> [f32; CHANNEL_COUNT] {
        self.current.apply(errors)
    }

    pub fn snapshot(&self) -> GainSnapshot {
        GainSnapshot {
            state: self.state,
            trust: self.trust,
            current: self.current,
            target: self.target,
            converged: self.is_converged(),
        }
    }
}
