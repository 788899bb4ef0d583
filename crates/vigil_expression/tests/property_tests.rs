//! Property-based tests for attention allocation and novelty tracking.
//!
//! Random posterior/error sequences must never push attention levels out of
//! their per-slot bounds, blow the budget beyond what the clamp allows, or
//! move novelty outside [floor, 1] for a tracked slot.

use proptest::prelude::*;
use vigil_core::{
    AttentionConfig, BeliefSource, Channel, CuriosityConfig, FreeEnergySource, Intent,
    SLOT_CAPACITY,
};
use vigil_expression::{
    AttentionAllocator, AttentionInputs, CuriosityInputs, NoveltySource, NoveltyTracker,
};

/// One frame of per-slot readings: (dominant intent, posterior, behavior error, free energy).
#[derive(Debug, Clone)]
struct Frame(Vec<(Option<Intent>, f32, f32, f32)>);

impl BeliefSource for Frame {
    fn dominant_intent(&self, slot: usize) -> Option<Intent> {
        self.0.get(slot).and_then(|s| s.0)
    }

    fn posterior(&self, slot: usize, intent: Intent) -> f32 {
        match self.0.get(slot) {
            Some((Some(dominant), p, _, _)) if *dominant == intent => *p,
            Some((Some(_), p, _, _)) if intent == Intent::Neutral => (1.0 - p) * 0.5,
            _ => 0.0,
        }
    }
}

impl FreeEnergySource for Frame {
    fn free_energy(&self, slot: usize) -> f32 {
        self.0.get(slot).map_or(0.0, |s| s.3)
    }

    fn channel_error(&self, slot: usize, channel: Channel) -> f32 {
        match channel {
            Channel::Behavior => self.0.get(slot).map_or(0.0, |s| s.2),
            _ => 0.0,
        }
    }
}

fn arb_intent() -> impl Strategy<Value = Option<Intent>> {
    prop_oneof![
        Just(None),
        Just(Some(Intent::Approach)),
        Just(Some(Intent::Neutral)),
        Just(Some(Intent::Threat)),
        Just(Some(Intent::Friendly)),
    ]
}

fn arb_frame() -> impl Strategy<Value = Frame> {
    prop::collection::vec(
        (arb_intent(), 0.0f32..=1.0, 0.0f32..3.0, 0.0f32..5.0),
        SLOT_CAPACITY,
    )
    .prop_map(Frame)
}

proptest! {
    #[test]
    fn attention_levels_stay_bounded(frames in prop::collection::vec(arb_frame(), 1..40)) {
        let config = AttentionConfig::default();
        let mut allocator = AttentionAllocator::new(config.clone());
        let mut tracker = NoveltyTracker::default();

        for frame in &frames {
            tracker.recompute(&CuriosityInputs {
                beliefs: frame,
                free_energy: Some(frame),
                memory: None,
                focus_slot: allocator.focus_slot(),
                focus_actor: None,
            });
            allocator.recompute(&AttentionInputs {
                beliefs: frame,
                novelty: Some(&tracker),
                free_energy: Some(frame),
            });

            let mut sum = 0.0;
            for slot in 0..SLOT_CAPACITY {
                let level = allocator.attention_level(slot);
                prop_assert!(level.is_finite());
                prop_assert!(level >= 0.0 && level <= config.max_attention + 1e-5,
                    "slot {} level {}", slot, level);
                let multiplier = allocator.precision_multiplier(slot);
                prop_assert!((0.5..=2.0 + 1e-5).contains(&multiplier));
                sum += level;
            }
            // One rescale, then re-clamping to the minimum can overshoot by at
            // most one minimum per slot.
            let ceiling = config.total_budget + SLOT_CAPACITY as f32 * config.min_attention;
            prop_assert!(sum <= ceiling + 1e-4, "sum {} > {}", sum, ceiling);
        }
    }

    #[test]
    fn novelty_stays_within_floor_and_one(frames in prop::collection::vec(arb_frame(), 1..60)) {
        let config = CuriosityConfig::default();
        let mut tracker = NoveltyTracker::new(config.clone());

        for frame in &frames {
            tracker.recompute(&CuriosityInputs {
                beliefs: frame,
                free_energy: Some(frame),
                memory: None,
                focus_slot: None,
                focus_actor: None,
            });
            for slot in 0..SLOT_CAPACITY {
                let n = tracker.novelty(slot);
                if tracker.is_tracked(slot) {
                    prop_assert!(n >= config.novelty_floor - 1e-6 && n <= 1.0,
                        "slot {} novelty {}", slot, n);
                } else {
                    prop_assert_eq!(n, 0.0);
                }
            }
            let aggregate = tracker.aggregate_curiosity();
            prop_assert!((0.0..=1.0).contains(&aggregate));
            prop_assert!(tracker.curiosity_bias() <= config.curiosity_strength + 1e-6);
        }
    }

    #[test]
    fn out_of_range_slots_read_neutral(slot in SLOT_CAPACITY..10_000usize) {
        let allocator = AttentionAllocator::default();
        let tracker = NoveltyTracker::default();
        prop_assert_eq!(allocator.attention_level(slot), 0.0);
        prop_assert_eq!(allocator.precision_multiplier(slot), 1.0);
        prop_assert!(!allocator.is_tracked(slot));
        prop_assert_eq!(tracker.novelty(slot), 0.0);
        prop_assert_eq!(NoveltySource::novelty(&tracker, slot), 0.0);
    }
}
