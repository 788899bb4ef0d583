//! Interval gating for self-throttling subsystems.
//!
//! The allocator and the novelty tracker each own one of these and recompute
//! only when it fires. The two gates are never shared, so either subsystem
//! may read a value from the other that is up to one interval old.

use serde::Serialize;

/// Elapsed-time accumulator that fires once whenever `interval` is reached.
#[derive(Debug, Clone, Serialize)]
pub struct IntervalGate {
    interval: f32,
    elapsed: f32,
}

impl IntervalGate {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    /// Accumulate `dt` seconds. Returns true (and resets) when the interval is reached.
    ///
    /// Overshoot past the interval is dropped, so the effective period is
    /// quantized up to a whole number of caller ticks.
    ///
    /// Negative or non-finite `dt` is ignored.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}
