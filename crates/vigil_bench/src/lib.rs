//! Trajectory simulation tests for the salience core.
//!
//! Validates behavior over long simulated time spans:
//! - An hour alone (consolidation cadence, relationship drift)
//! - Crowd churn (budget and novelty bounds under constant arrivals/departures)
//! - Long habituation (novelty settles on its floor, never below)
//! - Behavioral-state cycling (gain tracks every profile)

use vigil_core::{
    ActorId, BehavioralState, BeliefSource, Channel, FreeEnergySource, Intent, PresenceSensor,
    SLOT_CAPACITY,
};
use vigil_memory::{SalienceCore, Senses};

/// One occupant of a slot.
#[derive(Debug, Clone)]
pub struct Occupant {
    pub actor: ActorId,
    pub intent: Intent,
    pub posterior: f32,
    pub surprise: f32,
}

/// Fixed-capacity scripted crowd acting as every external collaborator.
#[derive(Debug, Clone, Default)]
pub struct Crowd {
    slots: [Option<Occupant>; SLOT_CAPACITY],
}

impl Crowd {
    pub fn enter(&mut self, slot: usize, actor: &str, intent: Intent, posterior: f32) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(Occupant {
                actor: ActorId::new(actor),
                intent,
                posterior,
                surprise: 0.0,
            });
        }
    }

    pub fn leave(&mut self, slot: usize) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = None;
        }
    }

    pub fn occupant_mut(&mut self, slot: usize) -> Option<&mut Occupant> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn senses(&self, state: BehavioralState, trust: f32) -> Senses<'_> {
        Senses {
            beliefs: self,
            free_energy: Some(self),
            presence: self,
            behavioral_state: state,
            trust,
        }
    }
}

impl BeliefSource for Crowd {
    fn dominant_intent(&self, slot: usize) -> Option<Intent> {
        self.slots.get(slot)?.as_ref().map(|o| o.intent)
    }

    fn posterior(&self, slot: usize, intent: Intent) -> f32 {
        let Some(Some(o)) = self.slots.get(slot) else {
            return 0.0;
        };
        if o.intent == intent {
            o.posterior
        } else if intent == Intent::Neutral {
            1.0 - o.posterior
        } else {
            0.0
        }
    }
}

impl FreeEnergySource for Crowd {
    fn free_energy(&self, slot: usize) -> f32 {
        self.slots
            .get(slot)
            .and_then(Option::as_ref)
            .map_or(0.0, |o| o.surprise)
    }

    fn channel_error(&self, slot: usize, channel: Channel) -> f32 {
        match channel {
            Channel::Behavior => self.free_energy(slot),
            _ => 0.0,
        }
    }
}

impl PresenceSensor for Crowd {
    fn any_actor_present(&self) -> bool {
        self.occupied() > 0
    }

    fn closest_actor(&self) -> Option<ActorId> {
        self.slots.iter().flatten().next().map(|o| o.actor.clone())
    }
}

/// Simulate `total_secs` of the core in `step_secs` increments.
pub fn simulate(
    core: &mut SalienceCore,
    crowd: &Crowd,
    state: BehavioralState,
    total_secs: f64,
    step_secs: f32,
) {
    let steps = (total_secs / step_secs as f64).round() as usize;
    for _ in 0..steps {
        core.tick(step_secs, &crowd.senses(state, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::VigilConfig;
    use vigil_memory::ConsolidationPhase;

    /// An hour with nobody around: the machine idles, consolidates on
    /// schedule and drifts every relationship toward equilibrium.
    #[test]
    fn test_hour_alone() {
        let config = VigilConfig::default();
        let mut core = SalienceCore::with_config(&config);
        let friend = ActorId::new("friend");
        let rival = ActorId::new("rival");
        let acquaintance = ActorId::new("acquaintance");
        core.memory_mut().adjust_trust(&friend, 0.9);
        core.memory_mut().adjust_trust(&rival, -0.9);
        core.memory_mut().adjust_trust(&acquaintance, 0.2);

        let empty = Crowd::default();
        simulate(&mut core, &empty, BehavioralState::Wander, 3600.0, 0.25);

        assert_eq!(core.phase(), ConsolidationPhase::Idle);
        let machine = core.consolidation();
        // 30 s absence + 3 s wind-down before idling begins
        assert!(
            (machine.accumulated_idle() - 3567.0).abs() < 1.0,
            "idle={}",
            machine.accumulated_idle()
        );
        let expected = (machine.accumulated_idle() / 10.0).floor() as u32;
        assert_eq!(machine.consolidation_count(), expected);

        let memory = core.memory();
        assert!(
            memory.trust(&rival) > -0.05,
            "rival trust should soften toward 0, got {}",
            memory.trust(&rival)
        );
        assert!(
            memory.trust(&acquaintance).abs() < 0.01,
            "mild trust should relax to 0, got {}",
            memory.trust(&acquaintance)
        );
        // Favorable memories are held up by reinforcement: the fixed point of
        // t - 0.02 t + 0.01 is 0.5.
        assert!(
            (memory.trust(&friend) - 0.5).abs() < 0.02,
            "friend trust should settle near 0.5, got {}",
            memory.trust(&friend)
        );
    }

    /// Ten minutes of constant churn across every slot.
    #[test]
    fn test_crowd_churn_stays_bounded() {
        let config = VigilConfig::default();
        let mut core = SalienceCore::with_config(&config);
        let mut crowd = Crowd::default();
        let intents = Intent::ALL;

        let dt = 1.0 / 30.0;
        let steps = (600.0 / dt) as usize;
        for step in 0..steps {
            // Deterministic churn: every half second some slot changes.
            if step % 15 == 0 {
                let k = step / 15;
                let slot = (k * 7) % SLOT_CAPACITY;
                if k % 3 == 0 {
                    crowd.leave(slot);
                } else {
                    let intent = intents[k % intents.len()];
                    let posterior = 0.3 + 0.07 * (k % 10) as f32;
                    crowd.enter(slot, &format!("actor-{}", k % 23), intent, posterior);
                    if let Some(o) = crowd.occupant_mut(slot) {
                        o.surprise = (k % 5) as f32 * 0.4;
                    }
                }
            }
            core.tick(dt, &crowd.senses(BehavioralState::Alert, 0.0));

            let attention = core.attention();
            let total: f32 = (0..SLOT_CAPACITY).map(|s| attention.attention_level(s)).sum();
            let ceiling = config.attention.total_budget
                + SLOT_CAPACITY as f32 * config.attention.min_attention;
            assert!(total <= ceiling + 1e-4, "step {}: total {}", step, total);

            let novelty = core.novelty();
            for slot in 0..SLOT_CAPACITY {
                if novelty.is_tracked(slot) {
                    let n = novelty.novelty(slot);
                    assert!(
                        (config.curiosity.novelty_floor..=1.0).contains(&n),
                        "step {}: slot {} novelty {}",
                        step,
                        slot,
                        n
                    );
                }
            }
        }
        assert_eq!(core.phase(), ConsolidationPhase::Active);
    }

    /// Five minutes with one calm visitor: novelty settles on the floor
    /// and stays there.
    #[test]
    fn test_long_habituation() {
        let config = VigilConfig::default();
        let mut core = SalienceCore::with_config(&config);
        let mut crowd = Crowd::default();
        crowd.enter(0, "visitor", Intent::Neutral, 0.7);

        simulate(&mut core, &crowd, BehavioralState::Neutral, 300.0, 0.1);

        let floor = config.curiosity.novelty_floor;
        assert!((core.novelty().novelty(0) - floor).abs() < 1e-6);
        assert!((core.curiosity_bias() - floor * config.curiosity.curiosity_strength).abs() < 1e-6);

        // A burst of unexplained behavior wakes curiosity up again.
        if let Some(o) = crowd.occupant_mut(0) {
            o.surprise = 1.5;
        }
        simulate(&mut core, &crowd, BehavioralState::Neutral, 1.0, 0.1);
        assert!(core.novelty().novelty(0) > 0.4);
    }

    /// Cycle through every behavioral state; gains converge on each profile.
    #[test]
    fn test_state_cycling() {
        let config = VigilConfig::default();
        let mut core = SalienceCore::with_config(&config);
        let empty = Crowd::default();

        for state in BehavioralState::ALL {
            simulate(&mut core, &empty, state, 4.0, 1.0 / 30.0);
            let gain = core.gain();
            assert!(gain.is_converged(), "{:?} did not converge", state);
            for channel in Channel::ALL {
                let expected = gain
                    .profile_gain(state, channel)
                    .clamp(config.gain.min_gain, config.gain.max_gain);
                assert!(
                    (gain.gain(channel) - expected).abs() < 0.02,
                    "{:?}/{:?}: {} vs {}",
                    state,
                    channel,
                    gain.gain(channel),
                    expected
                );
            }
        }
    }
}
