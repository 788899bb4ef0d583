//! Property-based tests for the consolidation state machine.
//!
//! Arbitrary presence/absence sequences with arbitrary step sizes must keep
//! the machine's bookkeeping consistent: pass counts match idle time, the
//! intensity stays in [0, 1] and cancellation always resets the phase timer.

use proptest::prelude::*;
use vigil_core::{ActorId, ConsolidationConfig, ConsolidationParams, Familiarity};
use vigil_core::{PresenceSensor, RelationshipMemory};
use vigil_memory::{ConsolidationPhase, OfflineConsolidator, RelationshipBook};

struct Presence(bool);

impl PresenceSensor for Presence {
    fn any_actor_present(&self) -> bool {
        self.0
    }

    fn closest_actor(&self) -> Option<ActorId> {
        self.0.then(|| ActorId::new("someone"))
    }
}

#[derive(Default)]
struct Counter(u64);

impl RelationshipMemory for Counter {
    fn familiarity(&self, _actor: &ActorId) -> Familiarity {
        Familiarity::Stranger
    }

    fn consolidate(&mut self, _params: &ConsolidationParams) {
        self.0 += 1;
    }
}

fn quick_config() -> ConsolidationConfig {
    ConsolidationConfig {
        no_actor_secs: 1.0,
        transition_out_secs: 0.5,
        wake_secs: 0.5,
        consolidation_interval_secs: 0.75,
        ..ConsolidationConfig::default()
    }
}

/// Runs of (present?, step count, dt).
fn arb_script() -> impl Strategy<Value = Vec<(bool, usize, f32)>> {
    prop::collection::vec((any::<bool>(), 1usize..40, 0.01f32..0.3), 1..30)
}

proptest! {
    #[test]
    fn consolidation_count_matches_idle_time(script in arb_script()) {
        let config = quick_config();
        let interval = config.consolidation_interval_secs;
        let mut machine = OfflineConsolidator::new(config);
        let mut memory = Counter::default();

        for (present, steps, dt) in script {
            let presence = Presence(present);
            for _ in 0..steps {
                let before = machine.phase();
                let transition = machine.update(dt, &presence, Some(&mut memory));

                if machine.phase() == ConsolidationPhase::Idle {
                    let expected = (machine.accumulated_idle() / interval).floor() as u32;
                    prop_assert_eq!(machine.consolidation_count(), expected);
                }
                if before == ConsolidationPhase::TransitioningOut && present {
                    prop_assert_eq!(machine.phase(), ConsolidationPhase::Active);
                    prop_assert_eq!(machine.phase_timer(), 0.0);
                }
                if let Some(t) = transition {
                    prop_assert_eq!(t.from, before);
                    prop_assert_eq!(t.to, machine.phase());
                    prop_assert_eq!(machine.phase_timer(), 0.0);
                }

                let intensity = machine.idle_intensity();
                prop_assert!((0.0..=1.0).contains(&intensity));
                prop_assert_eq!(machine.total_consolidations(), memory.0);
            }
        }
    }

    #[test]
    fn idle_time_is_monotonic_within_an_episode(steps in prop::collection::vec(0.01f32..0.5, 1..200)) {
        let mut machine = OfflineConsolidator::new(quick_config());
        let absent = Presence(false);
        let mut last = 0.0f32;
        for dt in steps {
            machine.update(dt, &absent, None);
            let idle = machine.accumulated_idle();
            prop_assert!(idle >= last);
            last = idle;
        }
    }

    #[test]
    fn relationship_trust_stays_bounded(
        trusts in prop::collection::vec(-1.0f32..=1.0, 1..20),
        passes in 1usize..300,
    ) {
        let mut book = RelationshipBook::new();
        for (i, trust) in trusts.iter().enumerate() {
            book.adjust_trust(&ActorId::new(format!("actor-{}", i)), *trust);
        }
        let params = ConsolidationConfig::default().params();
        for _ in 0..passes {
            book.consolidate(&params);
        }
        for (_, relationship) in book.iter() {
            prop_assert!((-1.0..=1.0).contains(&relationship.trust));
        }
    }
}
