//! Salience core - drives the four subsystems from one per-frame tick
//!
//! Order within a tick is fixed: novelty, attention, gain, consolidation.
//! The novelty tracker sees the focus chosen by the allocator's *previous*
//! firing, and the allocator sees novelty from the tracker's last firing.
//! Their interval gates stay independent.

use crate::consolidation::{
    ConsolidationPhase, ConsolidationSnapshot, OfflineConsolidator, PhaseTransition, Resumption,
};
use crate::relationships::RelationshipBook;
use serde::Serialize;
use tokio::sync::watch;
use vigil_core::{
    BehavioralState, BeliefSource, FreeEnergySource, PresenceSensor, RelationshipMemory,
    VigilConfig, CHANNEL_COUNT,
};
use vigil_expression::{
    AttentionAllocator, AttentionInputs, AttentionSnapshot, CuriosityInputs, NoveltySnapshot,
    NoveltyTracker,
};
use vigil_limbic::{GainSnapshot, SensoryGainController};

/// Everything the core reads from the outside world in one frame.
pub struct Senses<'a> {
    pub beliefs: &'a dyn BeliefSource,
    pub free_energy: Option<&'a dyn FreeEnergySource>,
    pub presence: &'a dyn PresenceSensor,
    /// Output of the external state-selection layer
    pub behavioral_state: BehavioralState,
    /// Trust toward the current focus, in [-1, 1]
    pub trust: f32,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub novelty_fired: bool,
    pub attention_fired: bool,
    pub transition: Option<PhaseTransition>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoreSnapshot {
    pub elapsed_secs: f64,
    pub attention: AttentionSnapshot,
    pub novelty: NoveltySnapshot,
    pub gain: GainSnapshot,
    pub consolidation: ConsolidationSnapshot,
}

/// Owns the allocator, novelty tracker, gain controller and consolidation
/// machine, plus the relationship memory they share.
#[derive(Debug)]
pub struct SalienceCore<M: RelationshipMemory = RelationshipBook> {
    attention: AttentionAllocator,
    novelty: NoveltyTracker,
    gain: SensoryGainController,
    consolidation: OfflineConsolidator,
    memory: M,
    elapsed: f64,
}

impl SalienceCore<RelationshipBook> {
    pub fn with_config(config: &VigilConfig) -> Self {
        Self::new(config, RelationshipBook::new())
    }
}

impl<M: RelationshipMemory> SalienceCore<M> {
    pub fn new(config: &VigilConfig, memory: M) -> Self {
        Self {
            attention: AttentionAllocator::new(config.attention.clone()),
            novelty: NoveltyTracker::new(config.curiosity.clone()),
            gain: SensoryGainController::new(config.gain.clone()),
            consolidation: OfflineConsolidator::new(config.consolidation.clone()),
            memory,
            elapsed: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32, senses: &Senses<'_>) -> TickReport {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt as f64;
        }

        let focus_actor = senses.presence.closest_actor();
        let novelty_fired = self.novelty.tick(
            dt,
            &CuriosityInputs {
                beliefs: senses.beliefs,
                free_energy: senses.free_energy,
                memory: Some(&self.memory as &dyn RelationshipMemory),
                focus_slot: self.attention.focus_slot(),
                focus_actor: focus_actor.as_ref(),
            },
        );

        let attention_fired = self.attention.tick(
            dt,
            &AttentionInputs {
                beliefs: senses.beliefs,
                novelty: Some(&self.novelty),
                free_energy: senses.free_energy,
            },
        );

        self.gain.update(senses.behavioral_state, senses.trust, dt);

        let transition = self.consolidation.update(
            dt,
            senses.presence,
            Some(&mut self.memory as &mut dyn RelationshipMemory),
        );

        TickReport {
            novelty_fired,
            attention_fired,
            transition,
        }
    }

    /// Gain- and precision-weighted prediction errors for one slot.
    pub fn weighted_errors(
        &self,
        slot: usize,
        errors: &[f32; CHANNEL_COUNT],
    ) -> [f32; CHANNEL_COUNT] {
        let precision = self.attention.precision_multiplier(slot);
        let mut weighted = self.gain.weighted_errors(errors);
        for e in &mut weighted {
            *e *= precision;
        }
        weighted
    }

    /// Threshold reduction for the state-selection layer.
    pub fn curiosity_bias(&self) -> f32 {
        self.novelty.curiosity_bias()
    }

    pub fn phase(&self) -> ConsolidationPhase {
        self.consolidation.phase()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<ConsolidationPhase> {
        self.consolidation.subscribe()
    }

    pub fn take_pending_resumption(&mut self) -> Option<Resumption> {
        self.consolidation.take_pending_resumption()
    }

    pub fn attention(&self) -> &AttentionAllocator {
        &self.attention
    }

    pub fn novelty(&self) -> &NoveltyTracker {
        &self.novelty
    }

    pub fn gain(&self) -> &SensoryGainController {
        &self.gain
    }

    pub fn consolidation(&self) -> &OfflineConsolidator {
        &self.consolidation
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed
    }

    pub fn snapshot(&self) -> CoreSnapshot {
        CoreSnapshot {
            elapsed_secs: self.elapsed,
            attention: self.attention.snapshot(),
            novelty: self.novelty.snapshot(),
            gain: self.gain.snapshot(),
            consolidation: self.consolidation.snapshot(),
        }
    }
}
