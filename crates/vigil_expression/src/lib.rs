//! # Vigil Expression
//!
//! Where the agent looks, and why.
//!
//! - [`AttentionAllocator`] splits a fixed attention budget across the
//!   tracked actors, weighting threats above approaches above friendly and
//!   neutral actors, boosted by novelty and prediction error.
//! - [`NoveltyTracker`] keeps a per-actor unfamiliarity score that spikes on
//!   surprise and habituates over time, and turns it into a curiosity bias for
//!   the decision layer.
//!
//! Both recompute on their own interval gate. Neither waits for the other.

mod attention;
mod curiosity;

#[cfg(test)]
pub(crate) mod testing;

pub use attention::{AttentionAllocator, AttentionInputs, AttentionSlot, AttentionSnapshot};
pub use curiosity::{CuriosityInputs, NoveltySlot, NoveltySnapshot, NoveltySource, NoveltyTracker};
