//! External collaborators the salience core reads from and writes to.
//!
//! The core never owns beliefs, prediction errors, relationship memory or
//! proximity sensing. It consumes them through these traits. Callers pass
//! `None` for a collaborator that is not wired; the affected term then
//! contributes zero.

use crate::slot::{ActorId, Channel, Intent};
use serde::{Deserialize, Serialize};

/// Per-slot intent inference (belief component).
pub trait BeliefSource {
    /// Highest-probability intent for the slot, `None` when nothing is inferred.
    fn dominant_intent(&self, slot: usize) -> Option<Intent>;

    /// Posterior probability of `intent` for the slot.
    fn posterior(&self, slot: usize, intent: Intent) -> f32;
}

/// Per-slot prediction error (error-estimation component).
pub trait FreeEnergySource {
    /// Aggregate free energy for the slot.
    fn free_energy(&self, slot: usize) -> f32;

    /// Prediction error on a single channel.
    fn channel_error(&self, slot: usize, channel: Channel) -> f32;
}

/// How well the agent knows an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Familiarity {
    /// Never encountered
    Stranger,
    /// Remembered, but not favorably
    Known,
    /// Remembered with favorable history
    Favored,
}

/// Drift parameters handed to the relationship memory on every consolidation pass.
///
/// The memory component owns the drift math; the consolidation state machine
/// only decides when a pass happens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsolidationParams {
    /// Equilibrium trust value retained beliefs drift toward
    pub trust_target: f32,
    /// Fraction of the gap to `trust_target` closed per pass
    pub trust_rate: f32,
    /// Extra reinforcement for favorable memories
    pub favorable_reinforcement: f32,
    /// Softening applied to negative trust
    pub negative_softening: f32,
}

/// Retained relationship state (relationship-memory component).
pub trait RelationshipMemory {
    fn familiarity(&self, actor: &ActorId) -> Familiarity;

    /// Drift retained relationships toward equilibrium.
    fn consolidate(&mut self, params: &ConsolidationParams);
}

/// Proximity sensing (presence component).
pub trait PresenceSensor {
    fn any_actor_present(&self) -> bool;

    fn closest_actor(&self) -> Option<ActorId>;
}
