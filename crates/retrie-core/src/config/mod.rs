//! Retry configuration.
//!
//! [`RetrieConfig`] is the typed, validated configuration an execution runs
//! with. [`RetrieOptions`] is the loose input layer: every field optional,
//! deserializable from camelCase documents, validated field by field before
//! defaults are applied.

mod options;

pub use options::RetrieOptions;

use crate::backoff::{self, BackoffType};
use crate::error::{ConfigError, Result};
use std::time::Duration;

/// Default number of retries after the first attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay before the first retry
pub const DEFAULT_MIN_TIMEOUT: Duration = Duration::from_millis(1000);
/// Default delay ceiling
pub const DEFAULT_MAX_TIMEOUT: Duration = Duration::from_millis(60_000);
/// Default increment (linear) or multiplier (exponential)
pub const DEFAULT_BACKOFF: f64 = 100.0;

/// Configuration for a single retry execution.
///
/// Fields are public so the struct can be written literally, which is why
/// the engine calls [`RetrieConfig::validate`] again before starting.
///
/// # Default Configuration
///
/// - `max_retries`: 3 (4 attempts in total)
/// - `min_timeout`: 1000ms
/// - `max_timeout`: 60s
/// - `backoff`: 100 (milliseconds added per retry)
/// - `backoff_type`: linear
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay applied after the first failure
    pub min_timeout: Duration,

    /// Ceiling for every delay
    pub max_timeout: Duration,

    /// Increment in milliseconds (linear) or multiplier (exponential)
    pub backoff: f64,

    /// Growth mode for the delay
    pub backoff_type: BackoffType,
}

impl Default for RetrieConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            min_timeout: DEFAULT_MIN_TIMEOUT,
            max_timeout: DEFAULT_MAX_TIMEOUT,
            backoff: DEFAULT_BACKOFF,
            backoff_type: BackoffType::Linear,
        }
    }
}

impl RetrieConfig {
    /// Create a new builder starting from the defaults.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use retrie_core::config::RetrieConfig;
    /// use std::time::Duration;
    ///
    /// let config = RetrieConfig::builder()
    ///     .max_retries(5)
    ///     .min_timeout(Duration::from_millis(250))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.max_retries, 5);
    /// ```
    pub fn builder() -> RetrieConfigBuilder {
        RetrieConfigBuilder::default()
    }

    /// Check the invariants the type system cannot express.
    ///
    /// - `backoff` is finite and non-negative
    /// - `max_timeout >= min_timeout`
    pub fn validate(&self) -> Result<()> {
        let outcome = self.check();
        #[cfg(feature = "tracing")]
        if let Err(err) = &outcome {
            tracing::debug!(error = %err, "rejected retry configuration");
        }
        outcome
    }

    fn check(&self) -> Result<()> {
        if !self.backoff.is_finite() || self.backoff < 0.0 {
            return Err(ConfigError::InvalidBackoff(self.backoff));
        }
        if self.max_timeout < self.min_timeout {
            return Err(ConfigError::TimeoutRange {
                min_ms: self.min_timeout.as_millis(),
                max_ms: self.max_timeout.as_millis(),
            });
        }
        Ok(())
    }

    /// Delay that follows `current` under this configuration.
    pub fn next_timeout(&self, current: Duration) -> Duration {
        backoff::next_timeout(current, self)
    }

    /// Attempts made when every attempt fails.
    pub fn total_attempts(&self) -> u64 {
        u64::from(self.max_retries) + 1
    }
}

/// Builder for [`RetrieConfig`].
///
/// Unset fields keep their defaults; [`build`](Self::build) validates.
#[derive(Debug, Default)]
pub struct RetrieConfigBuilder {
    max_retries: Option<u32>,
    min_timeout: Option<Duration>,
    max_timeout: Option<Duration>,
    backoff: Option<f64>,
    backoff_type: Option<BackoffType>,
}

impl RetrieConfigBuilder {
    /// Set the number of retries after the first attempt.
    ///
    /// Default: 3
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Set the delay applied after the first failure.
    ///
    /// Default: 1000ms
    pub fn min_timeout(mut self, timeout: Duration) -> Self {
        self.min_timeout = Some(timeout);
        self
    }

    /// Set the delay ceiling.
    ///
    /// Default: 60s
    pub fn max_timeout(mut self, timeout: Duration) -> Self {
        self.max_timeout = Some(timeout);
        self
    }

    /// Set the increment (milliseconds, linear) or multiplier (exponential).
    ///
    /// Default: 100
    pub fn backoff(mut self, backoff: f64) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Set how the delay grows.
    ///
    /// Default: [`BackoffType::Linear`]
    pub fn backoff_type(mut self, backoff_type: BackoffType) -> Self {
        self.backoff_type = Some(backoff_type);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<RetrieConfig> {
        let config = RetrieConfig {
            max_retries: self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            min_timeout: self.min_timeout.unwrap_or(DEFAULT_MIN_TIMEOUT),
            max_timeout: self.max_timeout.unwrap_or(DEFAULT_MAX_TIMEOUT),
            backoff: self.backoff.unwrap_or(DEFAULT_BACKOFF),
            backoff_type: self.backoff_type.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
