//! In-memory relationship book.
//!
//! A reference [`RelationshipMemory`]: per-actor trust in [-1, 1] plus the
//! drift applied on each consolidation pass. Production callers usually bring
//! their own persisted memory component; this one backs the CLI and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use vigil_core::math::sanitize;
use vigil_core::{ActorId, ConsolidationParams, Familiarity, RelationshipMemory};

/// Trust at or above which a remembered actor counts as favored.
pub const FAVORABLE_TRUST: f32 = 0.3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub trust: f32,
    pub encounters: u32,
}

impl Relationship {
    pub fn is_favorable(&self) -> bool {
        self.trust >= FAVORABLE_TRUST
    }

    /// One consolidation pass.
    ///
    /// Trust first relaxes toward the target, then favorable memories are
    /// reinforced and negative ones softened toward zero.
    fn drift(&mut self, params: &ConsolidationParams) {
        let mut trust = self.trust + (params.trust_target - self.trust) * params.trust_rate;
        if trust >= FAVORABLE_TRUST {
            trust += params.favorable_reinforcement;
        } else if trust < 0.0 {
            trust -= trust * params.negative_softening;
        }
        self.trust = trust.clamp(-1.0, 1.0);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipBook {
    entries: HashMap<ActorId, Relationship>,
}

impl RelationshipBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an encounter, creating a neutral entry for a new actor.
    pub fn record_encounter(&mut self, actor: &ActorId) -> &Relationship {
        let entry = self.entries.entry(actor.clone()).or_default();
        entry.encounters += 1;
        entry
    }

    /// Shift an actor's trust by `delta`, clamped to [-1, 1].
    pub fn adjust_trust(&mut self, actor: &ActorId, delta: f32) {
        let entry = self.entries.entry(actor.clone()).or_default();
        entry.trust = (entry.trust + sanitize(delta, 0.0)).clamp(-1.0, 1.0);
    }

    /// Trust for an actor, 0.0 when unknown.
    pub fn trust(&self, actor: &ActorId) -> f32 {
        self.entries.get(actor).map_or(0.0, |r| r.trust)
    }

    pub fn get(&self, actor: &ActorId) -> Option<&Relationship> {
        self.entries.get(actor)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, &Relationship)> {
        self.entries.iter()
    }
}

impl RelationshipMemory for RelationshipBook {
    fn familiarity(&self, actor: &ActorId) -> Familiarity {
        match self.entries.get(actor) {
            None => Familiarity::Stranger,
            Some(r) if r.is_favorable() => Familiarity::Favored,
            Some(_) => Familiarity::Known,
        }
    }

    fn consolidate(&mut self, params: &ConsolidationParams) {
        for relationship in self.entries.values_mut() {
            relationship.drift(params);
        }
        tracing::debug!("Consolidated {} relationships", self.entries.len());
    }
}
