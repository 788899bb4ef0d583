//! Property-based tests for the sensory gain controller.
//!
//! Gains must stay within [min_gain, max_gain] for every state, every trust
//! value and every call cadence, both before and after smoothing.

use proptest::prelude::*;
use vigil_core::{BehavioralState, Channel, GainConfig};
use vigil_limbic::SensoryGainController;

fn arb_state() -> impl Strategy<Value = BehavioralState> {
    (0usize..BehavioralState::COUNT).prop_map(|i| BehavioralState::ALL[i])
}

proptest! {
    #[test]
    fn gains_always_within_bounds(
        steps in prop::collection::vec((arb_state(), -1.0f32..=1.0, 0.0f32..0.5), 1..200),
    ) {
        let config = GainConfig::default();
        let mut controller = SensoryGainController::new(config.clone());
        for (state, trust, dt) in steps {
            controller.update(state, trust, dt);
            for channel in Channel::ALL {
                let current = controller.gain(channel);
                let target = controller.target_gain(channel);
                prop_assert!(current >= config.min_gain && current <= config.max_gain,
                    "current {:?}={} out of range in {:?}", channel, current, state);
                prop_assert!(target >= config.min_gain && target <= config.max_gain,
                    "target {:?}={} out of range in {:?}", channel, target, state);
                prop_assert!(current.is_finite());
            }
        }
    }

    /// Holding one state long enough always converges.
    #[test]
    fn holding_a_state_converges(state in arb_state(), trust in -1.0f32..=1.0) {
        let mut controller = SensoryGainController::default();
        for _ in 0..300 {
            controller.update(state, trust, 0.05);
        }
        prop_assert!(controller.is_converged());
        prop_assert_eq!(controller.active_state(), state);
    }

    /// Angle and behavior targets ignore trust entirely.
    #[test]
    fn trust_leaves_angle_and_behavior_alone(state in arb_state(), trust in -1.0f32..=1.0) {
        let mut trusting = SensoryGainController::default();
        let mut neutral = SensoryGainController::default();
        trusting.update(state, trust, 0.1);
        neutral.update(state, 0.0, 0.1);
        prop_assert_eq!(trusting.target_gain(Channel::Angle), neutral.target_gain(Channel::Angle));
        prop_assert_eq!(trusting.target_gain(Channel::Behavior), neutral.target_gain(Channel::Behavior));
    }
}
