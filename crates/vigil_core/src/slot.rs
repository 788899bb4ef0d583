//! Slot, actor and category vocabulary.
//!
//! A slot is a position in a fixed-capacity table, not an actor identity.
//! Binding actors to slots belongs to an external registry; each subsystem
//! keeps its own table keyed by the same index space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of actor slots every subsystem tracks.
pub const SLOT_CAPACITY: usize = 16;

/// Number of sensory error channels.
pub const CHANNEL_COUNT: usize = 5;

/// Opaque identity of an observed actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Inferred behavioral intent of an actor, as reported by the belief component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Approach,
    Neutral,
    Threat,
    Friendly,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Approach,
        Intent::Neutral,
        Intent::Threat,
        Intent::Friendly,
    ];
}

/// Named sensory error channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Distance,
    Velocity,
    Angle,
    Gaze,
    Behavior,
}

impl Channel {
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::Distance,
        Channel::Velocity,
        Channel::Angle,
        Channel::Gaze,
        Channel::Behavior,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Discrete behavioral state chosen by the external decision component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehavioralState {
    #[default]
    Neutral,
    /// Heightened awareness
    Alert,
    /// Goal-directed approach
    Approach,
    /// Defensive withdrawal
    Withdraw,
    /// Low-vigilance wander
    Wander,
    /// Deep focus
    Focus,
    /// Social greeting
    Greeting,
    /// Playful engagement
    Playful,
}

impl BehavioralState {
    pub const COUNT: usize = 8;

    pub const ALL: [BehavioralState; Self::COUNT] = [
        BehavioralState::Neutral,
        BehavioralState::Alert,
        BehavioralState::Approach,
        BehavioralState::Withdraw,
        BehavioralState::Wander,
        BehavioralState::Focus,
        BehavioralState::Greeting,
        BehavioralState::Playful,
    ];

    /// Map a raw state identifier onto the closed set, clamping out-of-range
    /// values to the nearest end.
    pub fn from_index(index: i64) -> Self {
        let clamped = index.clamp(0, Self::COUNT as i64 - 1) as usize;
        Self::ALL[clamped]
    }

    pub fn index(self) -> usize {
        self as usize
    }
}
