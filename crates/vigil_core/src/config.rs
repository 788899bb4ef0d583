use crate::error::ConfigError;
use crate::senses::ConsolidationParams;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VigilConfig {
    pub attention: AttentionConfig,
    pub curiosity: CuriosityConfig,
    pub gain: GainConfig,
    pub consolidation: ConsolidationConfig,
    pub simulation: SimulationConfig,
}

impl VigilConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: VigilConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Try to load from path; if that fails, return defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::info!("Config file not found or invalid ({:#}), using defaults", e);
                let mut cfg = Self::default();
                cfg.apply_env_overrides();
                if let Err(e) = cfg.validate() {
                    tracing::warn!("Env override rejected ({}), using pure defaults", e);
                    return Self::default();
                }
                cfg
            }
        }
    }

    /// Apply environment variable overrides on top of file-based config.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = env_f32("VIGIL_ATTENTION_INTERVAL") {
            self.attention.update_interval = v;
        }
        if let Some(v) = env_f32("VIGIL_CURIOSITY_INTERVAL") {
            self.curiosity.update_interval = v;
        }
        if let Some(v) = env_f32("VIGIL_NO_ACTOR_SECS") {
            self.consolidation.no_actor_secs = v;
        }
        if let Some(v) = env_f32("VIGIL_CONSOLIDATION_INTERVAL") {
            self.consolidation.consolidation_interval_secs = v;
        }
        if let Some(v) = env_f32("VIGIL_TICK_HZ") {
            self.simulation.tick_hz = v;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.attention.validate()?;
        self.curiosity.validate()?;
        self.gain.validate()?;
        self.consolidation.validate()?;
        positive("simulation", "tick_hz", self.simulation.tick_hz)?;
        Ok(())
    }
}

fn env_f32(key: &str) -> Option<f32> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring {}={:?}: not a number", key, raw);
            None
        }
    }
}

fn positive(section: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive {
            section,
            field,
            value,
        })
    }
}

fn non_negative(section: &'static str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Negative {
            section,
            field,
            value,
        })
    }
}

fn ordered(
    section: &'static str,
    (low, low_value): (&'static str, f32),
    (high, high_value): (&'static str, f32),
) -> Result<(), ConfigError> {
    if low_value <= high_value {
        Ok(())
    } else {
        Err(ConfigError::InvertedBounds {
            section,
            low,
            low_value,
            high,
            high_value,
        })
    }
}

// ============================================================================
// Sub-configs
// ============================================================================

/// Attention allocator tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Seconds between recomputations. Default: 0.5.
    pub update_interval: f32,
    /// Attention shared by all tracked slots. Default: 1.0.
    pub total_budget: f32,
    pub min_attention: f32,
    pub max_attention: f32,
    /// Fraction of the gap to target closed per recomputation.
    pub transition_speed: f32,
    pub threat_priority: f32,
    pub approach_priority: f32,
    pub friendly_priority: f32,
    pub neutral_priority: f32,
    pub novelty_weight: f32,
    pub free_energy_weight: f32,
    /// Minimum dominant-intent posterior for a slot to count as active.
    pub activity_threshold: f32,
    /// Allowed deviation of the clamped sum from the budget before rescaling.
    pub rescale_tolerance: f32,
    /// Attention level above which a tracked slot counts as attended.
    pub attended_threshold: f32,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            update_interval: 0.5,
            total_budget: 1.0,
            min_attention: 0.02,
            max_attention: 0.6,
            transition_speed: 0.3,
            threat_priority: 4.0,
            approach_priority: 2.0,
            friendly_priority: 1.5,
            neutral_priority: 1.0,
            novelty_weight: 1.0,
            free_energy_weight: 0.5,
            activity_threshold: 0.01,
            rescale_tolerance: 0.01,
            attended_threshold: 0.01,
        }
    }
}

impl AttentionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("attention", "update_interval", self.update_interval)?;
        positive("attention", "total_budget", self.total_budget)?;
        positive("attention", "max_attention", self.max_attention)?;
        positive("attention", "transition_speed", self.transition_speed)?;
        ordered(
            "attention",
            ("min_attention", self.min_attention),
            ("max_attention", self.max_attention),
        )
    }
}

/// Novelty/curiosity tracker tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CuriosityConfig {
    /// Seconds between recomputations. Default: 0.5.
    pub update_interval: f32,
    /// Initial novelty for a never-seen actor.
    pub first_encounter_novelty: f32,
    /// Initial novelty for a remembered, not favorable actor.
    pub known_novelty: f32,
    /// Initial novelty for a remembered, favorable actor.
    pub favored_novelty: f32,
    /// Spike added when the dominant intent changes.
    pub intent_surprise: f32,
    /// Behavior-channel error above which a surprise spike is added.
    pub unexplained_threshold: f32,
    /// Spike per unit of behavior error above threshold.
    pub unexplained_gain: f32,
    /// Novelty lost per second of habituation.
    pub habituation_rate: f32,
    /// Novelty never decays below this.
    pub novelty_floor: f32,
    /// Scale from aggregate curiosity to threshold bias.
    pub curiosity_strength: f32,
    /// Minimum summed posterior for a slot to count as active.
    pub activity_threshold: f32,
}

impl Default for CuriosityConfig {
    fn default() -> Self {
        Self {
            update_interval: 0.5,
            first_encounter_novelty: 0.9,
            known_novelty: 0.5,
            favored_novelty: 0.25,
            intent_surprise: 0.3,
            unexplained_threshold: 0.5,
            unexplained_gain: 0.5,
            habituation_rate: 0.05,
            novelty_floor: 0.05,
            curiosity_strength: 0.2,
            activity_threshold: 0.01,
        }
    }
}

impl CuriosityConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("curiosity", "update_interval", self.update_interval)?;
        positive("curiosity", "novelty_floor", self.novelty_floor)?;
        positive("curiosity", "habituation_rate", self.habituation_rate)?;
        positive("curiosity", "intent_surprise", self.intent_surprise)?;
        non_negative("curiosity", "unexplained_gain", self.unexplained_gain)?;
        non_negative("curiosity", "curiosity_strength", self.curiosity_strength)?;
        ordered(
            "curiosity",
            ("novelty_floor", self.novelty_floor),
            ("first_encounter_novelty", self.first_encounter_novelty),
        )?;
        ordered(
            "curiosity",
            ("first_encounter_novelty", self.first_encounter_novelty),
            ("ceiling", 1.0),
        )
    }
}

/// Sensory gain controller tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GainConfig {
    pub min_gain: f32,
    pub max_gain: f32,
    /// Rate constant (1/s) of the exponential smoothing filter.
    pub transition_speed: f32,
    /// How strongly trust shifts social channels.
    pub trust_social_bias: f32,
    /// Per-channel distance to target counted as converged.
    pub convergence_tolerance: f32,
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            min_gain: 0.2,
            max_gain: 2.0,
            transition_speed: 3.0,
            trust_social_bias: 0.3,
            convergence_tolerance: 0.02,
        }
    }
}

impl GainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("gain", "min_gain", self.min_gain)?;
        positive("gain", "transition_speed", self.transition_speed)?;
        ordered(
            "gain",
            ("min_gain", self.min_gain),
            ("max_gain", self.max_gain),
        )
    }
}

/// Offline consolidation timing and drift parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Seconds without any actor before winding down.
    pub no_actor_secs: f32,
    pub transition_out_secs: f32,
    pub wake_secs: f32,
    /// Seconds of idle time between consolidation passes.
    pub consolidation_interval_secs: f32,
    pub trust_target: f32,
    pub trust_rate: f32,
    pub favorable_reinforcement: f32,
    pub negative_softening: f32,
    /// Mean idle intensity while idle.
    pub idle_plateau: f32,
    /// Amplitude of the idle oscillation.
    pub idle_oscillation: f32,
    pub idle_period_secs: f32,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            no_actor_secs: 30.0,
            transition_out_secs: 3.0,
            wake_secs: 2.0,
            consolidation_interval_secs: 10.0,
            trust_target: 0.0,
            trust_rate: 0.02,
            favorable_reinforcement: 0.01,
            negative_softening: 0.03,
            idle_plateau: 0.8,
            idle_oscillation: 0.15,
            idle_period_secs: 6.0,
        }
    }
}

impl ConsolidationConfig {
    pub fn params(&self) -> ConsolidationParams {
        ConsolidationParams {
            trust_target: self.trust_target,
            trust_rate: self.trust_rate,
            favorable_reinforcement: self.favorable_reinforcement,
            negative_softening: self.negative_softening,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("consolidation", "no_actor_secs", self.no_actor_secs)?;
        positive("consolidation", "transition_out_secs", self.transition_out_secs)?;
        positive("consolidation", "wake_secs", self.wake_secs)?;
        positive(
            "consolidation",
            "consolidation_interval_secs",
            self.consolidation_interval_secs,
        )?;
        positive("consolidation", "idle_period_secs", self.idle_period_secs)?;
        positive("consolidation", "trust_rate", self.trust_rate)?;
        ordered(
            "consolidation",
            ("trust_rate", self.trust_rate),
            ("ceiling", 1.0),
        )?;
        non_negative(
            "consolidation",
            "favorable_reinforcement",
            self.favorable_reinforcement,
        )?;
        non_negative("consolidation", "negative_softening", self.negative_softening)
    }
}

/// Scenario runner settings (binary only).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_hz: f32,
    pub duration_secs: f32,
    /// Sleep between ticks instead of running as fast as possible.
    pub realtime: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_hz: 30.0,
            duration_secs: 120.0,
            realtime: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
