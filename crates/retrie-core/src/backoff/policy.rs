//! Linear and exponential delay progression.

use crate::config::RetrieConfig;
use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// How the delay between retries grows.
///
/// # Examples
///
/// ```rust
/// use retrie_core::backoff::BackoffType;
/// use std::time::Duration;
///
/// let max = Duration::from_secs(1);
/// let next = BackoffType::Linear.apply(Duration::from_millis(100), 200.0, max);
/// assert_eq!(next, Duration::from_millis(300));
///
/// let next = BackoffType::Exponential.apply(Duration::from_millis(400), 4.0, max);
/// assert_eq!(next, max);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackoffType {
    /// Add `backoff` milliseconds on every retry
    #[default]
    Linear,

    /// Multiply the delay by `backoff` on every retry
    Exponential,
}

impl BackoffType {
    /// Name as accepted by [`FromStr`] and the options layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Exponential => "exponential",
        }
    }

    /// Compute the delay following `current`, clamped to `max`.
    ///
    /// For [`BackoffType::Linear`], `backoff` is an increment in milliseconds.
    /// For [`BackoffType::Exponential`], it is a multiplier; a multiplier of
    /// zero collapses the delay to zero.
    pub fn apply(&self, current: Duration, backoff: f64, max: Duration) -> Duration {
        let current_ns = current.as_nanos() as f64;
        let next_ns = match self {
            Self::Linear => current_ns + backoff * NANOS_PER_MILLI,
            Self::Exponential => current_ns * backoff,
        };
        clamp(next_ns, max)
    }
}

impl fmt::Display for BackoffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackoffType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "exponential" => Ok(Self::Exponential),
            other => Err(ConfigError::UnknownBackoffType(other.to_string())),
        }
    }
}

/// Delay to apply after the one currently scheduled.
///
/// Pure: depends only on `current` and the configuration.
pub fn next_timeout(current: Duration, config: &RetrieConfig) -> Duration {
    config
        .backoff_type
        .apply(current, config.backoff, config.max_timeout)
}

fn clamp(nanos: f64, max: Duration) -> Duration {
    // NaN falls through to the ceiling as well
    if !(nanos < max.as_nanos() as f64) {
        return max;
    }
    if nanos <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_nanos(nanos.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn config(backoff_type: BackoffType, backoff: f64, min_ms: u64, max_ms: u64) -> RetrieConfig {
        RetrieConfig {
            max_retries: 10,
            min_timeout: Duration::from_millis(min_ms),
            max_timeout: Duration::from_millis(max_ms),
            backoff,
            backoff_type,
        }
    }

    #[test]
    fn test_linear_progression() {
        let cfg = config(BackoffType::Linear, 200.0, 100, 1000);

        let mut timeout = cfg.min_timeout;
        let mut seen = Vec::new();
        for _ in 0..6 {
            timeout = next_timeout(timeout, &cfg);
            seen.push(timeout.as_millis());
        }

        assert_eq!(seen, vec![300, 500, 700, 900, 1000, 1000]);
    }

    #[test]
    fn test_exponential_progression() {
        let cfg = config(BackoffType::Exponential, 2.0, 100, 1000);

        let mut timeout = cfg.min_timeout;
        let mut seen = Vec::new();
        for _ in 0..5 {
            timeout = next_timeout(timeout, &cfg);
            seen.push(timeout.as_millis());
        }

        assert_eq!(seen, vec![200, 400, 800, 1000, 1000]);
    }

    #[test]
    fn test_fractional_multiplier() {
        let cfg = config(BackoffType::Exponential, 1.5, 225, 10_000);
        assert_eq!(
            next_timeout(Duration::from_millis(225), &cfg),
            Duration::from_micros(337_500)
        );
    }

    #[test]
    fn test_zero_multiplier_collapses_delay() {
        let cfg = config(BackoffType::Exponential, 0.0, 500, 1000);
        assert_eq!(next_timeout(cfg.min_timeout, &cfg), Duration::ZERO);
        assert_eq!(next_timeout(Duration::ZERO, &cfg), Duration::ZERO);
    }

    #[test]
    fn test_zero_increment_keeps_delay() {
        let cfg = config(BackoffType::Linear, 0.0, 500, 1000);
        assert_eq!(next_timeout(cfg.min_timeout, &cfg), cfg.min_timeout);
    }

    #[rstest]
    #[case("linear", BackoffType::Linear)]
    #[case("exponential", BackoffType::Exponential)]
    fn test_parse_known_types(#[case] input: &str, #[case] expected: BackoffType) {
        let parsed: BackoffType = input.parse().unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.to_string(), input);
    }

    #[rstest]
    #[case("Linear")]
    #[case("fibonacci")]
    #[case("")]
    fn test_parse_rejects_unknown(#[case] input: &str) {
        let err = input.parse::<BackoffType>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackoffType(s) if s == input));
    }

    proptest! {
        /// Property: the delay never exceeds the ceiling
        #[test]
        fn prop_never_exceeds_max(
            exponential in any::<bool>(),
            backoff in 0.0f64..1_000.0,
            min_ms in 0u64..10_000,
            extra_ms in 0u64..100_000,
            steps in 1usize..20,
        ) {
            let kind = if exponential { BackoffType::Exponential } else { BackoffType::Linear };
            let cfg = config(kind, backoff, min_ms, min_ms + extra_ms);

            let mut timeout = cfg.min_timeout;
            for _ in 0..steps {
                timeout = next_timeout(timeout, &cfg);
                prop_assert!(timeout <= cfg.max_timeout);
            }
        }

        /// Property: linear backoff is min(max, previous + increment)
        #[test]
        fn prop_linear_matches_formula(
            backoff in 0u64..5_000,
            current_ms in 0u64..50_000,
            max_ms in 0u64..100_000,
        ) {
            let cfg = config(BackoffType::Linear, backoff as f64, 0, max_ms);
            let expected = Duration::from_millis((current_ms + backoff).min(max_ms));
            prop_assert_eq!(next_timeout(Duration::from_millis(current_ms), &cfg), expected);
        }

        /// Property: exponential backoff with an integral multiplier is exact
        #[test]
        fn prop_exponential_matches_formula(
            multiplier in 0u64..10,
            current_ms in 0u64..50_000,
            max_ms in 0u64..1_000_000,
        ) {
            let cfg = config(BackoffType::Exponential, multiplier as f64, 0, max_ms);
            let expected = Duration::from_millis((current_ms * multiplier).min(max_ms));
            prop_assert_eq!(next_timeout(Duration::from_millis(current_ms), &cfg), expected);
        }
    }
}
