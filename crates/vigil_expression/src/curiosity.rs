//! Novelty-driven curiosity.
//!
//! Each tracked actor carries a novelty score. It starts high for strangers
//! and lower for familiar faces, spikes when the actor does something
//! unexpected, and habituates a little on every firing. It never reaches
//! zero: a floor keeps a low-grade interest alive in everyone.
//!
//! Within one firing the surprise spikes are applied before habituation.

use serde::Serialize;
use vigil_core::math::sanitize;
use vigil_core::{
    ActorId, BeliefSource, Channel, CuriosityConfig, Familiarity, FreeEnergySource, Intent,
    IntervalGate, RelationshipMemory, SLOT_CAPACITY,
};

/// Read-only novelty lookup, consumed by the attention allocator.
pub trait NoveltySource {
    fn novelty(&self, slot: usize) -> f32;
}

/// External readings the tracker consumes on each firing.
pub struct CuriosityInputs<'a> {
    pub beliefs: &'a dyn BeliefSource,
    pub free_energy: Option<&'a dyn FreeEnergySource>,
    pub memory: Option<&'a dyn RelationshipMemory>,
    /// Slot the agent is currently focused on
    pub focus_slot: Option<usize>,
    /// Identity of the focused actor, when known
    pub focus_actor: Option<&'a ActorId>,
}

/// Novelty bookkeeping for one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NoveltySlot {
    pub tracked: bool,
    pub novelty: f32,
    pub last_intent: Option<Intent>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoveltySnapshot {
    pub aggregate_curiosity: f32,
    pub focus_curiosity: f32,
    pub curiosity_bias: f32,
    pub slots: Vec<(usize, NoveltySlot)>,
}

#[derive(Debug)]
pub struct NoveltyTracker {
    config: CuriosityConfig,
    gate: IntervalGate,
    slots: [NoveltySlot; SLOT_CAPACITY],
    aggregate: f32,
    focus_curiosity: f32,
}

impl Default for NoveltyTracker {
    fn default() -> Self {
        Self::new(CuriosityConfig::default())
    }
}

impl NoveltyTracker {
    pub fn new(config: CuriosityConfig) -> Self {
        Self {
            gate: IntervalGate::new(config.update_interval),
            config,
            slots: [NoveltySlot::default(); SLOT_CAPACITY],
            aggregate: 0.0,
            focus_curiosity: 0.0,
        }
    }

    pub fn config(&self) -> &CuriosityConfig {
        &self.config
    }

    /// Advance the interval gate; recompute novelty when it fires.
    pub fn tick(&mut self, dt: f32, inputs: &CuriosityInputs<'_>) -> bool {
        if !self.gate.advance(dt) {
            return false;
        }
        self.recompute(inputs);
        true
    }

    /// Recompute immediately, bypassing the gate.
    pub fn recompute(&mut self, inputs: &CuriosityInputs<'_>) {
        for index in 0..SLOT_CAPACITY {
            self.update_slot(index, inputs);
        }

        self.aggregate = self
            .slots
            .iter()
            .filter(|s| s.tracked)
            .map(|s| s.novelty)
            .fold(0.0, f32::max);
        self.focus_curiosity = inputs
            .focus_slot
            .and_then(|i| self.slots.get(i))
            .filter(|s| s.tracked)
            .map_or(0.0, |s| s.novelty);

        tracing::trace!(
            "Curiosity: aggregate={:.3}, focus={:.3}, tracked={}",
            self.aggregate,
            self.focus_curiosity,
            self.tracked_count()
        );
    }

    fn update_slot(&mut self, index: usize, inputs: &CuriosityInputs<'_>) {
        // Deliberately not the allocator's activity test: this one looks at
        // the two leading intent categories regardless of which is dominant.
        let presence = sanitize(inputs.beliefs.posterior(index, Intent::Approach), 0.0)
            + sanitize(inputs.beliefs.posterior(index, Intent::Neutral), 0.0);
        let active = presence > self.config.activity_threshold;
        let dominant = inputs.beliefs.dominant_intent(index);

        if !active {
            if self.slots[index].tracked {
                tracing::debug!("Curiosity: slot {} released", index);
                self.slots[index] = NoveltySlot::default();
            }
            return;
        }

        if !self.slots[index].tracked {
            let familiarity = self.familiarity_for(index, inputs);
            let initial = self.initial_novelty(familiarity);
            tracing::debug!(
                "Curiosity: slot {} tracked as {:?}, novelty={:.2}",
                index,
                familiarity,
                initial
            );
            self.slots[index] = NoveltySlot {
                tracked: true,
                novelty: initial,
                last_intent: dominant,
            };
            return;
        }

        let cfg = &self.config;
        let slot = &mut self.slots[index];

        if dominant != slot.last_intent {
            slot.novelty = (slot.novelty + cfg.intent_surprise).min(1.0);
        }

        if let Some(errors) = inputs.free_energy {
            let unexplained = sanitize(errors.channel_error(index, Channel::Behavior), 0.0);
            if unexplained > cfg.unexplained_threshold {
                let spike = (unexplained - cfg.unexplained_threshold) * cfg.unexplained_gain;
                slot.novelty = (slot.novelty + spike).min(1.0);
            }
        }

        slot.last_intent = dominant;

        let habituation = cfg.habituation_rate * cfg.update_interval;
        slot.novelty = (slot.novelty - habituation).clamp(cfg.novelty_floor, 1.0);
    }

    /// Identity only resolves through the focus path; any other slot is
    /// treated as a first encounter.
    fn familiarity_for(&self, index: usize, inputs: &CuriosityInputs<'_>) -> Familiarity {
        if inputs.focus_slot != Some(index) {
            return Familiarity::Stranger;
        }
        match (inputs.focus_actor, inputs.memory) {
            (Some(actor), Some(memory)) => memory.familiarity(actor),
            _ => Familiarity::Stranger,
        }
    }

    fn initial_novelty(&self, familiarity: Familiarity) -> f32 {
        let tier = match familiarity {
            Familiarity::Stranger => self.config.first_encounter_novelty,
            Familiarity::Known => self.config.known_novelty,
            Familiarity::Favored => self.config.favored_novelty,
        };
        tier.clamp(self.config.novelty_floor, 1.0)
    }

    /// Highest novelty among tracked slots, in [0, 1].
    pub fn aggregate_curiosity(&self) -> f32 {
        self.aggregate
    }

    /// Novelty of the focused slot at the last firing.
    pub fn focus_curiosity(&self) -> f32 {
        self.focus_curiosity
    }

    /// Amount to subtract from external state-transition thresholds.
    pub fn curiosity_bias(&self) -> f32 {
        self.aggregate * self.config.curiosity_strength
    }

    /// Novelty for a slot; 0 when untracked or out of range.
    pub fn novelty(&self, slot: usize) -> f32 {
        self.slots.get(slot).map_or(0.0, |s| s.novelty)
    }

    pub fn is_tracked(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.tracked)
    }

    pub fn tracked_count(&self) -> usize {
        self.slots.iter().filter(|s| s.tracked).count()
    }

    pub fn snapshot(&self) -> NoveltySnapshot {
        NoveltySnapshot {
            aggregate_curiosity: self.aggregate,
            focus_curiosity: self.focus_curiosity,
            curiosity_bias: self.curiosity_bias(),
            slots: self
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.tracked)
                .map(|(i, s)| (i, *s))
                .collect(),
        }
    }
}

impl NoveltySource for NoveltyTracker {
    fn novelty(&self, slot: usize) -> f32 {
        NoveltyTracker::novelty(self, slot)
    }
}
