//! Offline Consolidation - relationship drift while nobody is around
//!
//! Four-phase lifecycle driven by a single presence signal:
//!
//! ```text
//!   Active ──(no actor for no_actor_secs)──▶ TransitioningOut
//!     ▲                                        │        │
//!     │◀──────────(actor reappears)────────────┘        │ transition_out_secs
//!     │                                                 ▼
//!     └──(wake_secs, resumption)── TransitioningIn ◀── Idle ──(actor seen)
//! ```
//!
//! While Idle the machine periodically hands the relationship memory a set of
//! drift parameters. It only decides *when* a pass happens; the memory
//! component owns the drift itself.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use tokio::sync::watch;
use vigil_core::{ActorId, ConsolidationConfig, PresenceSensor, RelationshipMemory};

/// Consolidation lifecycle phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationPhase {
    /// Normal operation, actors around or recently seen
    #[default]
    Active,
    /// Winding down after a long absence
    TransitioningOut,
    /// Consolidating
    Idle,
    /// Waking up because someone arrived
    TransitioningIn,
}

/// A phase change observed during one `update` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    pub from: ConsolidationPhase,
    pub to: ConsolidationPhase,
}

/// One-shot event raised when the agent is fully awake again.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resumption {
    /// Actor whose arrival ended the idle episode, if identifiable
    pub actor: Option<ActorId>,
    /// Seconds spent in Idle during the episode that just ended
    pub idle_duration: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsolidationSnapshot {
    pub phase: ConsolidationPhase,
    pub phase_timer: f32,
    pub absence_timer: f32,
    pub accumulated_idle: f32,
    pub consolidation_count: u32,
    pub total_consolidations: u64,
    pub idle_intensity: f32,
    pub resumption_pending: bool,
    pub resumption_actor: Option<ActorId>,
}

/// The offline consolidation state machine
#[derive(Debug)]
pub struct OfflineConsolidator {
    config: ConsolidationConfig,
    phase: ConsolidationPhase,
    /// Seconds since the last transition
    phase_timer: f32,
    /// Continuous seconds with no actor present, only counted while Active
    absence_timer: f32,
    /// Idle seconds in the current episode, zeroed on return to Active
    accumulated_idle: f32,
    /// Passes run in the current episode
    consolidation_count: u32,
    total_consolidations: u64,
    /// Intensity at the moment we left Idle, ramped down from while waking
    wake_from: f32,
    resumption_actor: Option<ActorId>,
    pending: Option<Resumption>,
    phase_tx: watch::Sender<ConsolidationPhase>,
}

impl Default for OfflineConsolidator {
    fn default() -> Self {
        Self::new(ConsolidationConfig::default())
    }
}

impl OfflineConsolidator {
    pub fn new(config: ConsolidationConfig) -> Self {
        let (phase_tx, _) = watch::channel(ConsolidationPhase::Active);
        Self {
            config,
            phase: ConsolidationPhase::Active,
            phase_timer: 0.0,
            absence_timer: 0.0,
            accumulated_idle: 0.0,
            consolidation_count: 0,
            total_consolidations: 0,
            wake_from: 0.0,
            resumption_actor: None,
            pending: None,
            phase_tx,
        }
    }

    pub fn config(&self) -> &ConsolidationConfig {
        &self.config
    }

    /// Get a watch receiver for phase changes
    pub fn subscribe(&self) -> watch::Receiver<ConsolidationPhase> {
        self.phase_tx.subscribe()
    }

    /// Advance the machine by `dt` seconds.
    ///
    /// At most one transition happens per call. `memory` may be `None`, in
    /// which case passes are still counted but nothing is mutated.
    pub fn update(
        &mut self,
        dt: f32,
        presence: &dyn PresenceSensor,
        memory: Option<&mut dyn RelationshipMemory>,
    ) -> Option<PhaseTransition> {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let present = presence.any_actor_present();

        match self.phase {
            ConsolidationPhase::Active => {
                if present {
                    self.absence_timer = 0.0;
                } else {
                    self.absence_timer += dt;
                }
                self.phase_timer += dt;
                if self.absence_timer >= self.config.no_actor_secs {
                    return self.transition(ConsolidationPhase::TransitioningOut);
                }
            }
            ConsolidationPhase::TransitioningOut => {
                if present {
                    return self.transition(ConsolidationPhase::Active);
                }
                self.phase_timer += dt;
                if self.phase_timer >= self.config.transition_out_secs {
                    return self.transition(ConsolidationPhase::Idle);
                }
            }
            ConsolidationPhase::Idle => {
                if present {
                    self.resumption_actor = presence.closest_actor();
                    self.wake_from = self.idle_intensity();
                    return self.transition(ConsolidationPhase::TransitioningIn);
                }
                self.phase_timer += dt;
                self.accumulated_idle += dt;
                self.run_due_passes(memory);
            }
            ConsolidationPhase::TransitioningIn => {
                // Waking is not cancelled if the actor walks off again.
                self.phase_timer += dt;
                if self.phase_timer >= self.config.wake_secs {
                    self.pending = Some(Resumption {
                        actor: self.resumption_actor.clone(),
                        idle_duration: self.accumulated_idle,
                    });
                    return self.transition(ConsolidationPhase::Active);
                }
            }
        }
        None
    }

    /// Keep the episode's pass count equal to `floor(idle / interval)`.
    fn run_due_passes(&mut self, mut memory: Option<&mut dyn RelationshipMemory>) {
        let interval = self.config.consolidation_interval_secs.max(f32::EPSILON);
        let due = (self.accumulated_idle / interval).floor() as u32;
        let params = self.config.params();
        while self.consolidation_count < due {
            if let Some(memory) = memory.as_mut() {
                memory.consolidate(&params);
            }
            self.consolidation_count += 1;
            self.total_consolidations += 1;
            tracing::info!(
                "Consolidation pass {} (idle {:.1}s, target={:.2}, rate={:.3})",
                self.consolidation_count,
                self.accumulated_idle,
                params.trust_target,
                params.trust_rate
            );
        }
    }

    fn transition(&mut self, to: ConsolidationPhase) -> Option<PhaseTransition> {
        let from = self.phase;
        tracing::info!("Consolidation phase: {:?} -> {:?}", from, to);

        self.phase = to;
        self.phase_timer = 0.0;
        match to {
            ConsolidationPhase::Active => {
                self.absence_timer = 0.0;
                self.accumulated_idle = 0.0;
            }
            ConsolidationPhase::Idle => {
                self.consolidation_count = 0;
                self.accumulated_idle = 0.0;
            }
            ConsolidationPhase::TransitioningOut | ConsolidationPhase::TransitioningIn => {}
        }

        self.phase_tx.send_replace(to);
        Some(PhaseTransition { from, to })
    }

    /// Clear and return the pending resumption, if any.
    pub fn take_pending_resumption(&mut self) -> Option<Resumption> {
        self.pending.take()
    }

    pub fn has_pending_resumption(&self) -> bool {
        self.pending.is_some()
    }

    /// Actor captured when the last idle episode ended.
    pub fn resumption_actor(&self) -> Option<&ActorId> {
        self.resumption_actor.as_ref()
    }

    pub fn phase(&self) -> ConsolidationPhase {
        self.phase
    }

    pub fn phase_timer(&self) -> f32 {
        self.phase_timer
    }

    pub fn accumulated_idle(&self) -> f32 {
        self.accumulated_idle
    }

    pub fn consolidation_count(&self) -> u32 {
        self.consolidation_count
    }

    pub fn total_consolidations(&self) -> u64 {
        self.total_consolidations
    }

    /// Ambient intensity for presentation layers, in [0, 1].
    ///
    /// Zero while Active, ramps up through TransitioningOut, oscillates
    /// around the plateau while Idle and ramps back down while waking.
    pub fn idle_intensity(&self) -> f32 {
        let cfg = &self.config;
        let value = match self.phase {
            ConsolidationPhase::Active => 0.0,
            ConsolidationPhase::TransitioningOut => {
                cfg.idle_plateau * progress(self.phase_timer, cfg.transition_out_secs)
            }
            ConsolidationPhase::Idle => {
                let phase = TAU * self.accumulated_idle / cfg.idle_period_secs.max(f32::EPSILON);
                cfg.idle_plateau + cfg.idle_oscillation * phase.sin()
            }
            ConsolidationPhase::TransitioningIn => {
                self.wake_from * (1.0 - progress(self.phase_timer, cfg.wake_secs))
            }
        };
        value.clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> ConsolidationSnapshot {
        ConsolidationSnapshot {
            phase: self.phase,
            phase_timer: self.phase_timer,
            absence_timer: self.absence_timer,
            accumulated_idle: self.accumulated_idle,
            consolidation_count: self.consolidation_count,
            total_consolidations: self.total_consolidations,
            idle_intensity: self.idle_intensity(),
            resumption_pending: self.pending.is_some(),
            resumption_actor: self.resumption_actor.clone(),
        }
    }
}

fn progress(elapsed: f32, duration: f32) -> f32 {
    (elapsed / duration.max(f32::EPSILON)).clamp(0.0, 1.0)
}
