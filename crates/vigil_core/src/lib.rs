//! # Vigil Core
//!
//! Shared ground for the salience subsystems of a simulated social agent.
//!
//! Every subsystem keeps its own slot-indexed state; this crate only defines
//! the vocabulary they agree on:
//!
//! - **Slots**: fixed-capacity indices, one per tracked actor
//! - **Senses**: traits for the external collaborators (beliefs, prediction
//!   error, relationship memory, presence)
//! - **Cadence**: the interval gate used by self-throttling subsystems
//! - **Config**: layered TOML + environment configuration

pub mod cadence;
pub mod config;
pub mod error;
pub mod math;
pub mod senses;
pub mod slot;

pub use cadence::IntervalGate;
pub use config::{
    AttentionConfig, ConsolidationConfig, CuriosityConfig, GainConfig, SimulationConfig,
    VigilConfig,
};
pub use error::ConfigError;
pub use senses::{
    BeliefSource, ConsolidationParams, Familiarity, FreeEnergySource, PresenceSensor,
    RelationshipMemory,
};
pub use slot::{ActorId, BehavioralState, Channel, Intent, CHANNEL_COUNT, SLOT_CAPACITY};
