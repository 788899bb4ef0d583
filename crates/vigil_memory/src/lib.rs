pub mod consolidation;
pub mod coordinator;
pub mod relationships;

pub use consolidation::{
    ConsolidationPhase, ConsolidationSnapshot, OfflineConsolidator, PhaseTransition, Resumption,
};
pub use coordinator::{CoreSnapshot, SalienceCore, Senses, TickReport};
pub use relationships::{Relationship, RelationshipBook, FAVORABLE_TRUST};
