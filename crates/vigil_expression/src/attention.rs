//! Budgeted attention allocation across tracked actors.
//!
//! Every firing converts per-slot priorities into a distribution over a fixed
//! budget: priorities are normalized, clamped to `[min_attention,
//! max_attention]`, corrected once if the clamped sum strays from the budget,
//! and finally smoothed into the persistent attention levels.
//!
//! Priority order for the dominant intent: threat > approach > friendly > neutral.

use crate::curiosity::NoveltySource;
use serde::Serialize;
use vigil_core::math::{lerp, move_towards, sanitize};
use vigil_core::{
    AttentionConfig, BeliefSource, FreeEnergySource, Intent, IntervalGate, SLOT_CAPACITY,
};

/// Below this total priority nothing is worth attending to.
const MIN_TOTAL_PRIORITY: f32 = 0.001;

/// Smallest decay step for untracked slots, so they reach zero in finite time.
const UNTRACKED_MIN_STEP: f32 = 0.001;

/// External readings the allocator consumes on each firing.
pub struct AttentionInputs<'a> {
    pub beliefs: &'a dyn BeliefSource,
    pub novelty: Option<&'a dyn NoveltySource>,
    pub free_energy: Option<&'a dyn FreeEnergySource>,
}

/// Attention bookkeeping for one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AttentionSlot {
    pub tracked: bool,
    pub dominant_intent: Option<Intent>,
    pub raw_priority: f32,
    pub target_attention: f32,
    /// Smoothed level, persists across firings
    pub attention_level: f32,
}

/// Serializable view of the allocator.
#[derive(Debug, Clone, Serialize)]
pub struct AttentionSnapshot {
    pub focus_slot: Option<usize>,
    pub total_priority: f32,
    pub remaining_budget: f32,
    pub attended_count: usize,
    pub slots: Vec<(usize, AttentionSlot)>,
}

/// Distributes a fixed attention budget across actor slots.
#[derive(Debug, Clone)]
pub struct AttentionAllocator {
    config: AttentionConfig,
    gate: IntervalGate,
    slots: [AttentionSlot; SLOT_CAPACITY],
    total_priority: f32,
    remaining_budget: f32,
    focus: Option<usize>,
}

impl Default for AttentionAllocator {
    fn default() -> Self {
        Self::new(AttentionConfig::default())
    }
}

impl AttentionAllocator {
    pub fn new(config: AttentionConfig) -> Self {
        Self {
            gate: IntervalGate::new(config.update_interval),
            remaining_budget: config.total_budget,
            config,
            slots: [AttentionSlot::default(); SLOT_CAPACITY],
            total_priority: 0.0,
            focus: None,
        }
    }

    pub fn config(&self) -> &AttentionConfig {
        &self.config
    }

    /// Advance the interval gate; recompute the distribution when it fires.
    ///
    /// Returns whether a recomputation happened.
    pub fn tick(&mut self, dt: f32, inputs: &AttentionInputs<'_>) -> bool {
        if !self.gate.advance(dt) {
            return false;
        }
        self.recompute(inputs);
        true
    }

    /// Recompute the full distribution immediately, bypassing the gate.
    pub fn recompute(&mut self, inputs: &AttentionInputs<'_>) {
        let active = self.score_slots(inputs);
        let budget = self.config.total_budget;

        if active == 0 || self.total_priority < MIN_TOTAL_PRIORITY {
            for slot in &mut self.slots {
                slot.target_attention = 0.0;
            }
            self.set_focus(None);
            self.remaining_budget = budget;
            // Levels still fade instead of freezing at their last value.
            let speed = self.config.transition_speed;
            for slot in &mut self.slots {
                slot.attention_level = decay_level(slot.attention_level, speed);
            }
            tracing::trace!("Attention: nothing to attend (active={})", active);
            return;
        }

        self.assign_targets();
        self.smooth_levels();

        tracing::trace!(
            "Attention: total_priority={:.3}, remaining={:.3}, focus={:?}",
            self.total_priority,
            self.remaining_budget,
            self.focus
        );
    }

    /// Read beliefs and boosts into raw priorities. Returns the active slot count.
    fn score_slots(&mut self, inputs: &AttentionInputs<'_>) -> usize {
        let mut total = 0.0;
        let mut active = 0;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let intent = inputs.beliefs.dominant_intent(index);
            let posterior = intent
                .map(|i| sanitize(inputs.beliefs.posterior(index, i), 0.0))
                .unwrap_or(0.0);

            let intent = match intent {
                Some(i) if posterior >= self.config.activity_threshold => i,
                _ => {
                    if slot.tracked {
                        tracing::debug!("Attention: slot {} released", index);
                    }
                    slot.tracked = false;
                    slot.dominant_intent = None;
                    slot.raw_priority = 0.0;
                    slot.target_attention = 0.0;
                    continue;
                }
            };

            if !slot.tracked {
                tracing::debug!("Attention: slot {} tracked ({:?})", index, intent);
            }
            slot.tracked = true;
            slot.dominant_intent = Some(intent);

            let novelty = inputs
                .novelty
                .map(|n| sanitize(n.novelty(index), 0.0))
                .unwrap_or(0.0);
            let free_energy = inputs
                .free_energy
                .map(|f| sanitize(f.free_energy(index), 0.0))
                .unwrap_or(0.0);

            slot.raw_priority = (base_priority(&self.config, intent)
                + novelty * self.config.novelty_weight
                + free_energy * self.config.free_energy_weight)
                .max(0.0);

            total += slot.raw_priority;
            active += 1;
        }

        self.total_priority = total;
        active
    }

    /// Normalize, clamp, and apply the single rescale pass.
    fn assign_targets(&mut self) {
        let budget = self.config.total_budget;
        let (min, max) = (self.config.min_attention, self.config.max_attention);

        let mut used = 0.0;
        for slot in self.slots.iter_mut().filter(|s| s.tracked) {
            slot.target_attention = (slot.raw_priority / self.total_priority * budget).clamp(min, max);
            used += slot.target_attention;
        }

        // One correction only; whatever the second clamp leaves is accepted.
        if used > 0.0 && (used - budget).abs() > self.config.rescale_tolerance {
            let scale = budget / used;
            for slot in self.slots.iter_mut().filter(|s| s.tracked) {
                slot.target_attention = (slot.target_attention * scale).clamp(min, max);
            }
        }
    }

    /// Move levels toward targets and refresh focus and remaining budget.
    fn smooth_levels(&mut self) {
        let speed = self.config.transition_speed;
        let mut sum = 0.0;
        let mut best: Option<(usize, f32)> = None;

        for index in 0..SLOT_CAPACITY {
            let level = self.slots[index].attention_level;
            if self.slots[index].tracked {
                let target = self.slots[index].target_attention;
                let next = lerp(level, target, speed);
                self.slots[index].attention_level = next;
                sum += next;
                if best.map_or(true, |(_, b)| next > b) {
                    best = Some((index, next));
                }
            } else {
                self.slots[index].attention_level = decay_level(level, speed);
            }
        }

        self.remaining_budget = (self.config.total_budget - sum).max(0.0);
        self.set_focus(best.filter(|(_, level)| *level > 0.0).map(|(i, _)| i));
    }

    fn set_focus(&mut self, focus: Option<usize>) {
        if focus != self.focus {
            tracing::debug!("Attention focus: {:?} -> {:?}", self.focus, focus);
            self.focus = focus;
        }
    }

    // ------------------------------------------------------------------
    // Accessors. Out-of-range slots read as neutral defaults.
    // ------------------------------------------------------------------

    pub fn attention_level(&self, slot: usize) -> f32 {
        self.slots.get(slot).map_or(0.0, |s| s.attention_level)
    }

    pub fn target_attention(&self, slot: usize) -> f32 {
        self.slots.get(slot).map_or(0.0, |s| s.target_attention)
    }

    pub fn raw_priority(&self, slot: usize) -> f32 {
        self.slots.get(slot).map_or(0.0, |s| s.raw_priority)
    }

    pub fn is_tracked(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.tracked)
    }

    pub fn slot(&self, slot: usize) -> Option<&AttentionSlot> {
        self.slots.get(slot)
    }

    /// Slot with the highest smoothed attention, if any.
    pub fn focus_slot(&self) -> Option<usize> {
        self.focus
    }

    pub fn remaining_budget(&self) -> f32 {
        self.remaining_budget
    }

    pub fn total_priority(&self) -> f32 {
        self.total_priority
    }

    /// Tracked slots holding more than a trace of attention.
    pub fn attended_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.tracked && s.attention_level > self.config.attended_threshold)
            .count()
    }

    /// Sensitivity multiplier for the error-weighting stage, in [0.5, 2.0].
    ///
    /// 1.0 for an out-of-range slot.
    pub fn precision_multiplier(&self, slot: usize) -> f32 {
        match self.slots.get(slot) {
            Some(s) => {
                let ratio = (s.attention_level / self.config.max_attention).clamp(0.0, 1.0);
                0.5 + 1.5 * ratio
            }
            None => 1.0,
        }
    }

    pub fn snapshot(&self) -> AttentionSnapshot {
        AttentionSnapshot {
            focus_slot: self.focus,
            total_priority: self.total_priority,
            remaining_budget: self.remaining_budget,
            attended_count: self.attended_count(),
            slots: self
                .slots
                .iter()
                .enumerate()
                .filter(|(_, s)| s.tracked || s.attention_level > 0.0)
                .map(|(i, s)| (i, *s))
                .collect(),
        }
    }
}

/// Fade an untracked level toward zero at the smoothing rate.
fn decay_level(level: f32, speed: f32) -> f32 {
    let step = (level * speed).max(UNTRACKED_MIN_STEP);
    move_towards(level, 0.0, step)
}

fn base_priority(config: &AttentionConfig, intent: Intent) -> f32 {
    match intent {
        Intent::Threat => config.threat_priority,
        Intent::Approach => config.approach_priority,
        Intent::Friendly => config.friendly_priority,
        Intent::Neutral => config.neutral_priority,
    }
}
