use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{section}.{field} must be positive, got {value}")]
    NonPositive {
        section: &'static str,
        field: &'static str,
        value: f32,
    },

    #[error("{section}.{field} must not be negative, got {value}")]
    Negative {
        section: &'static str,
        field: &'static str,
        value: f32,
    },

    #[error("{section}: {low} ({low_value}) exceeds {high} ({high_value})")]
    InvertedBounds {
        section: &'static str,
        low: &'static str,
        low_value: f32,
        high: &'static str,
        high_value: f32,
    },
}
