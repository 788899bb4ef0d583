//! Scripted collaborators for unit tests.

use std::collections::HashMap;
use vigil_core::{
    ActorId, BeliefSource, Channel, ConsolidationParams, Familiarity, FreeEnergySource, Intent,
    RelationshipMemory, SLOT_CAPACITY,
};

/// Beliefs set slot by slot; unset slots have no intent and zero posteriors.
#[derive(Debug, Default)]
pub struct ScriptedBeliefs {
    slots: HashMap<usize, (Option<Intent>, HashMap<Intent, f32>)>,
}

impl ScriptedBeliefs {
    /// Dominant intent with the given posterior; other intents get zero.
    pub fn set(&mut self, slot: usize, intent: Intent, posterior: f32) {
        let mut posteriors = HashMap::new();
        posteriors.insert(intent, posterior);
        self.slots.insert(slot, (Some(intent), posteriors));
    }

    pub fn set_posterior(&mut self, slot: usize, intent: Intent, posterior: f32) {
        self.slots
            .entry(slot)
            .or_insert_with(|| (None, HashMap::new()))
            .1
            .insert(intent, posterior);
    }

    pub fn set_dominant(&mut self, slot: usize, intent: Option<Intent>) {
        self.slots
            .entry(slot)
            .or_insert_with(|| (None, HashMap::new()))
            .0 = intent;
    }

    pub fn clear(&mut self, slot: usize) {
        self.slots.remove(&slot);
    }
}

impl BeliefSource for ScriptedBeliefs {
    fn dominant_intent(&self, slot: usize) -> Option<Intent> {
        self.slots.get(&slot).and_then(|(i, _)| *i)
    }

    fn posterior(&self, slot: usize, intent: Intent) -> f32 {
        self.slots
            .get(&slot)
            .and_then(|(_, p)| p.get(&intent).copied())
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Default)]
pub struct ScriptedErrors {
    pub free_energy: [f32; SLOT_CAPACITY],
    pub behavior: [f32; SLOT_CAPACITY],
}

impl FreeEnergySource for ScriptedErrors {
    fn free_energy(&self, slot: usize) -> f32 {
        self.free_energy.get(slot).copied().unwrap_or(0.0)
    }

    fn channel_error(&self, slot: usize, channel: Channel) -> f32 {
        match channel {
            Channel::Behavior => self.behavior.get(slot).copied().unwrap_or(0.0),
            _ => 0.0,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScriptedMemory {
    pub known: HashMap<ActorId, Familiarity>,
}

impl RelationshipMemory for ScriptedMemory {
    fn familiarity(&self, actor: &ActorId) -> Familiarity {
        self.known
            .get(actor)
            .copied()
            .unwrap_or(Familiarity::Stranger)
    }

    fn consolidate(&mut self, _params: &ConsolidationParams) {}
}
