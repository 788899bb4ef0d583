//! Scripted scenarios.
//!
//! A [`Stage`] stands in for every external collaborator the core reads
//! (beliefs, prediction error, presence). A [`Director`] rewrites the stage
//! over time according to the chosen [`Scenario`], with seeded jitter so runs
//! are reproducible.

use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use vigil_core::{
    ActorId, BehavioralState, BeliefSource, Channel, FreeEnergySource, Intent, PresenceSensor,
    SLOT_CAPACITY,
};
use vigil_memory::Senses;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// A stranger shows up, warms up and eventually leaves
    Encounter,
    /// Guests come and go; an intruder shows up halfway
    Crowd,
    /// A companion leaves for a long time and comes back
    Departure,
}

#[derive(Debug, Clone)]
struct Figure {
    actor: ActorId,
    intent: Intent,
    posterior: f32,
    behavior_error: f32,
}

#[derive(Debug, Default)]
pub struct Stage {
    slots: [Option<Figure>; SLOT_CAPACITY],
    departures: Vec<ActorId>,
}

impl Stage {
    /// Put `actor` in `slot`, or update them if already there.
    pub fn cast(&mut self, slot: usize, actor: &str, intent: Intent, posterior: f32) {
        let Some(entry) = self.slots.get_mut(slot) else {
            return;
        };
        let posterior = posterior.clamp(0.0, 1.0);
        if let Some(figure) = entry.as_mut().filter(|f| f.actor.as_str() == actor) {
            figure.intent = intent;
            figure.posterior = posterior;
            return;
        }
        if let Some(previous) = entry.take() {
            self.departures.push(previous.actor);
        }
        *entry = Some(Figure {
            actor: ActorId::new(actor),
            intent,
            posterior,
            behavior_error: 0.0,
        });
    }

    pub fn dismiss(&mut self, slot: usize) {
        if let Some(figure) = self.slots.get_mut(slot).and_then(Option::take) {
            self.departures.push(figure.actor);
        }
    }

    pub fn set_behavior_error(&mut self, slot: usize, error: f32) {
        if let Some(Some(figure)) = self.slots.get_mut(slot) {
            figure.behavior_error = error;
        }
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Actors that left since the last call.
    pub fn take_departures(&mut self) -> Vec<ActorId> {
        std::mem::take(&mut self.departures)
    }

    /// How the closest actor's behavior should move their trust this tick.
    pub fn trust_delta(&self, dt: f32) -> Option<(ActorId, f32)> {
        let figure = self.slots.iter().flatten().next()?;
        let rate = match figure.intent {
            Intent::Friendly => 0.02,
            Intent::Approach => 0.005,
            Intent::Neutral => 0.0,
            Intent::Threat => -0.05,
        };
        Some((figure.actor.clone(), rate * figure.posterior * dt))
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

    fn figure(&self, slot: usize) -> Option<&Figure> {
        self.slots.get(slot).and_then(Option::as_ref)
    }
}

impl BeliefSource for Stage {
    fn dominant_intent(&self, slot: usize) -> Option<Intent> {
        self.figure(slot).map(|f| f.intent)
    }

    /// The remaining mass is split evenly over the other intents.
    fn posterior(&self, slot: usize, intent: Intent) -> f32 {
        match self.figure(slot) {
            Some(f) if f.intent == intent => f.posterior,
            Some(f) => (1.0 - f.posterior) / (Intent::ALL.len() - 1) as f32,
            None => 0.0,
        }
    }
}

impl FreeEnergySource for Stage {
    fn free_energy(&self, slot: usize) -> f32 {
        self.figure(slot).map_or(0.0, |f| f.behavior_error * 0.5)
    }

    fn channel_error(&self, slot: usize, channel: Channel) -> f32 {
        match channel {
            Channel::Behavior => self.figure(slot).map_or(0.0, |f| f.behavior_error),
            _ => 0.0,
        }
    }
}

impl PresenceSensor for Stage {
    fn any_actor_present(&self) -> bool {
        self.occupied() > 0
    }

    /// Lowest occupied slot stands in for the closest actor.
    fn closest_actor(&self) -> Option<ActorId> {
        self.slots.iter().flatten().next().map(|f| f.actor.clone())
    }
}

/// Drives a [`Stage`] through a scenario.
pub struct Director {
    scenario: Scenario,
    duration: f32,
    rng: StdRng,
    next_event: f32,
    guests: u32,
}

impl Director {
    pub fn new(scenario: Scenario, seed: u64, duration: f32) -> Self {
        Self {
            scenario,
            duration,
            rng: StdRng::seed_from_u64(seed),
            next_event: 0.0,
            guests: 0,
        }
    }

    /// Relationships the scenario assumes already exist.
    pub fn prior_relationships(&self) -> Vec<(ActorId, f32)> {
        match self.scenario {
            Scenario::Encounter => Vec::new(),
            Scenario::Crowd => vec![
                (ActorId::new("guest-1"), 0.5),
                (ActorId::new("guest-2"), -0.4),
            ],
            Scenario::Departure => vec![
                (ActorId::new("companion"), 0.6),
                (ActorId::new("rival"), -0.7),
            ],
        }
    }

    /// Update the stage for time `t` and return the behavioral state the
    /// (external) decision layer would pick.
    pub fn direct(&mut self, t: f32, stage: &mut Stage) -> BehavioralState {
        let state = match self.scenario {
            Scenario::Encounter => self.encounter(t, stage),
            Scenario::Crowd => self.crowd(t, stage),
            Scenario::Departure => self.departure(t, stage),
        };
        self.glitch(stage);
        state
    }

    fn jitter(&mut self, base: f32) -> f32 {
        (base + self.rng.gen_range(-0.05..0.05)).clamp(0.0, 1.0)
    }

    /// Occasional bursts of unexplained behavior, otherwise calm.
    fn glitch(&mut self, stage: &mut Stage) {
        for slot in 0..SLOT_CAPACITY {
            if !stage.is_occupied(slot) {
                continue;
            }
            let error = if self.rng.gen_bool(0.002) {
                self.rng.gen_range(0.8..1.6)
            } else {
                0.0
            };
            stage.set_behavior_error(slot, error);
        }
    }

    fn encounter(&mut self, t: f32, stage: &mut Stage) -> BehavioralState {
        let leave_at = self.duration * 0.75;
        if t < 5.0 {
            BehavioralState::Wander
        } else if t < 15.0 {
            let p = self.jitter(0.6);
            stage.cast(0, "stranger", Intent::Neutral, p);
            BehavioralState::Alert
        } else if t < 40.0 {
            let p = self.jitter(0.7);
            stage.cast(0, "stranger", Intent::Approach, p);
            BehavioralState::Approach
        } else if t < leave_at {
            let p = self.jitter(0.8);
            stage.cast(0, "stranger", Intent::Friendly, p);
            BehavioralState::Greeting
        } else {
            stage.dismiss(0);
            BehavioralState::Wander
        }
    }

    fn crowd(&mut self, t: f32, stage: &mut Stage) -> BehavioralState {
        if t >= self.next_event {
            self.next_event = t + 1.0;
            let slot = self.rng.gen_range(0..SLOT_CAPACITY - 1);
            if stage.is_occupied(slot) {
                if self.rng.gen_bool(0.3) {
                    stage.dismiss(slot);
                }
            } else if self.rng.gen_bool(0.5) {
                self.guests += 1;
                let name = format!("guest-{}", self.rng.gen_range(1..=12));
                let intent = match self.rng.gen_range(0..3) {
                    0 => Intent::Approach,
                    1 => Intent::Neutral,
                    _ => Intent::Friendly,
                };
                let p = self.jitter(0.7);
                stage.cast(slot, &name, intent, p);
            }
        }

        let intruder_window = self.duration * 0.25..self.duration * 0.4;
        let last = SLOT_CAPACITY - 1;
        if intruder_window.contains(&t) {
            let p = self.jitter(0.9);
            stage.cast(last, "intruder", Intent::Threat, p);
            BehavioralState::Withdraw
        } else {
            if stage.is_occupied(last) {
                stage.dismiss(last);
            }
            match stage.occupied() {
                0 => BehavioralState::Wander,
                1..=2 => BehavioralState::Neutral,
                _ => BehavioralState::Playful,
            }
        }
    }

    fn departure(&mut self, t: f32, stage: &mut Stage) -> BehavioralState {
        if t < 10.0 {
            let p = self.jitter(0.85);
            stage.cast(0, "companion", Intent::Friendly, p);
            BehavioralState::Greeting
        } else if t < self.duration - 10.0 {
            stage.dismiss(0);
            BehavioralState::Wander
        } else {
            let p = self.jitter(0.8);
            stage.cast(0, "companion", Intent::Approach, p);
            BehavioralState::Approach
        }
    }

    /// Number of distinct guest arrivals so far (crowd scenario).
    pub fn guests(&self) -> u32 {
        self.guests
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(scenario: Scenario, seed: u64, until: f32) -> (Stage, Director) {
        let mut stage = Stage::default();
        let mut director = Director::new(scenario, seed, 120.0);
        let dt = 0.1;
        let mut t = 0.0;
        while t < until {
            director.direct(t, &mut stage);
            t += dt;
        }
        (stage, director)
    }

    #[test]
    fn test_posteriors_sum_to_one() {
        let mut stage = Stage::default();
        stage.cast(3, "x", Intent::Threat, 0.7);
        let total: f32 = Intent::ALL.iter().map(|i| stage.posterior(3, *i)).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(stage.posterior(4, Intent::Threat), 0.0);
    }

    #[test]
    fn test_recast_records_departure() {
        let mut stage = Stage::default();
        stage.cast(0, "a", Intent::Neutral, 0.5);
        stage.cast(0, "a", Intent::Friendly, 0.9);
        assert!(stage.take_departures().is_empty());
        stage.cast(0, "b", Intent::Neutral, 0.5);
        stage.dismiss(0);
        assert_eq!(
            stage.take_departures(),
            vec![ActorId::new("a"), ActorId::new("b")]
        );
        assert!(!stage.any_actor_present());
    }

    #[test]
    fn test_encounter_beats() {
        let (stage, _) = play(Scenario::Encounter, 1, 3.0);
        assert!(!stage.any_actor_present());

        let (stage, _) = play(Scenario::Encounter, 1, 20.0);
        assert_eq!(stage.dominant_intent(0), Some(Intent::Approach));

        let (stage, _) = play(Scenario::Encounter, 1, 100.0);
        assert!(!stage.any_actor_present());
    }

    #[test]
    fn test_departure_companion_returns() {
        let (stage, _) = play(Scenario::Departure, 9, 60.0);
        assert!(!stage.any_actor_present());
        let (stage, _) = play(Scenario::Departure, 9, 115.0);
        assert_eq!(stage.closest_actor(), Some(ActorId::new("companion")));
    }

    #[test]
    fn test_same_seed_same_crowd() {
        let (a, da) = play(Scenario::Crowd, 42, 90.0);
        let (b, db) = play(Scenario::Crowd, 42, 90.0);
        assert_eq!(da.guests(), db.guests());
        for slot in 0..SLOT_CAPACITY {
            assert_eq!(a.dominant_intent(slot), b.dominant_intent(slot));
            assert_eq!(a.posterior(slot, Intent::Neutral), b.posterior(slot, Intent::Neutral));
        }
    }

    #[test]
    fn test_intruder_window() {
        let (stage, _) = play(Scenario::Crowd, 5, 40.0);
        assert_eq!(
            stage.dominant_intent(SLOT_CAPACITY - 1),
            Some(Intent::Threat)
        );
        let (stage, _) = play(Scenario::Crowd, 5, 60.0);
        assert!(!stage.is_occupied(SLOT_CAPACITY - 1));
    }

    #[test]
    fn test_trust_delta_follows_intent() {
        let mut stage = Stage::default();
        assert!(stage.trust_delta(0.1).is_none());
        stage.cast(2, "pal", Intent::Friendly, 1.0);
        let (actor, delta) = stage.trust_delta(1.0).unwrap();
        assert_eq!(actor, ActorId::new("pal"));
        assert!(delta > 0.0);
        stage.cast(2, "pal", Intent::Threat, 1.0);
        assert!(stage.trust_delta(1.0).unwrap().1 < 0.0);
    }
}
