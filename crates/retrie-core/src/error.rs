//! Configuration error types.

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while building or validating a retry configuration.
///
/// These are always returned synchronously, before any execution state
/// exists, and are never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An integer field was below zero
    #[error("{field} must be a non-negative integer, got {value}")]
    Negative {
        /// camelCase name of the offending field
        field: &'static str,
        /// Value as supplied
        value: f64,
    },

    /// An integer field carried a fractional part
    #[error("{field} must be an integer, got {value}")]
    NotAnInteger {
        /// camelCase name of the offending field
        field: &'static str,
        /// Value as supplied
        value: f64,
    },

    /// An integer field does not fit its target type
    #[error("{field} is out of range, got {value}")]
    OutOfRange {
        /// camelCase name of the offending field
        field: &'static str,
        /// Value as supplied
        value: f64,
    },

    /// Backoff increment or multiplier was negative, NaN or infinite
    #[error("backoff must be a finite, non-negative number, got {0}")]
    InvalidBackoff(f64),

    /// Backoff type string was not recognized
    #[error("backoffType must be either 'linear' or 'exponential', got '{0}'")]
    UnknownBackoffType(String),

    /// Delay ceiling is below the initial delay
    #[error("maxTimeout ({max_ms}ms) must be greater than or equal to minTimeout ({min_ms}ms)")]
    TimeoutRange {
        /// Initial delay in milliseconds
        min_ms: u128,
        /// Delay ceiling in milliseconds
        max_ms: u128,
    },

    /// Options document could not be parsed
    #[error("Invalid options document: {0}")]
    Parse(#[from] serde_json::Error),
}
