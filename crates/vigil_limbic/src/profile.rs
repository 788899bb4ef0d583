//! Per-state gain profiles.
//!
//! Rows follow `BehavioralState` order, columns follow `Channel` order
//! (distance, velocity, angle, gaze, behavior). Exact values are tuning;
//! the relative ordering between states is what behavior depends on.

use crate::gain::GainVector;
use vigil_core::{BehavioralState, Channel, CHANNEL_COUNT};

pub const STATE_PROFILES: [[f32; CHANNEL_COUNT]; BehavioralState::COUNT] = [
    // Neutral: baseline
    [1.0, 1.0, 1.0, 1.0, 1.0],
    // Alert: watch faces and conduct
    [1.1, 1.2, 1.1, 1.5, 1.6],
    // Approach: track range and gaze, ignore conduct
    [1.5, 1.1, 1.0, 1.4, 0.7],
    // Withdraw: spatial threat channels up, gaze down
    [1.6, 1.8, 1.5, 0.5, 1.1],
    // Wander
    [0.7, 0.7, 0.7, 0.7, 0.7],
    // Focus
    [0.4, 0.4, 0.4, 0.4, 0.4],
    // Greeting: faces matter, motion does not
    [1.0, 0.6, 0.7, 1.7, 1.2],
    // Playful
    [0.6, 1.2, 1.0, 1.5, 1.5],
];

/// Full profile row for a state.
pub fn profile(state: BehavioralState) -> GainVector {
    GainVector::from_array(STATE_PROFILES[state.index()])
}

/// Profile gain for one (state, channel) pair.
pub fn profile_gain(state: BehavioralState, channel: Channel) -> f32 {
    STATE_PROFILES[state.index()][channel.index()]
}
