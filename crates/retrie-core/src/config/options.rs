//! Loosely typed configuration input.

use super::RetrieConfig;
use crate::backoff::BackoffType;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 2^32, the first value a `u32` cannot hold
const U32_LIMIT: f64 = 4_294_967_296.0;
/// 2^64, the first value a `u64` cannot hold
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

/// Partial retry configuration, as read from a document or supplied by a
/// caller who only wants to override a few values.
///
/// Numbers are carried as `f64` so that negative and fractional values can be
/// reported precisely instead of failing inside the deserializer. Omitted
/// fields fall back to the [`RetrieConfig`] defaults.
///
/// # Examples
///
/// ```rust
/// use retrie_core::config::RetrieOptions;
/// use std::time::Duration;
///
/// let options = RetrieOptions::from_json(r#"{ "maxRetries": 5, "backoffType": "exponential", "backoff": 2 }"#)?;
/// let config = options.into_config()?;
///
/// assert_eq!(config.max_retries, 5);
/// assert_eq!(config.min_timeout, Duration::from_millis(1000));
/// # Ok::<(), retrie_core::ConfigError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetrieOptions {
    /// Retries after the first attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<f64>,

    /// Initial delay in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_timeout: Option<f64>,

    /// Delay ceiling in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout: Option<f64>,

    /// Increment in milliseconds (linear) or multiplier (exponential)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<f64>,

    /// `"linear"` or `"exponential"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_type: Option<String>,
}

impl RetrieOptions {
    /// Parse options from a JSON document.
    pub fn from_json(document: &str) -> Result<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Check every supplied field without applying defaults.
    pub fn validate(&self) -> Result<()> {
        if let Some(value) = self.max_retries {
            integer("maxRetries", value, U32_LIMIT)?;
        }
        if let Some(value) = self.min_timeout {
            integer("minTimeout", value, U64_LIMIT)?;
        }
        if let Some(value) = self.max_timeout {
            integer("maxTimeout", value, U64_LIMIT)?;
        }
        if let Some(value) = self.backoff {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidBackoff(value));
            }
        }
        if let Some(kind) = &self.backoff_type {
            kind.parse::<BackoffType>()?;
        }
        Ok(())
    }

    /// Validate, fill in defaults and produce a [`RetrieConfig`].
    pub fn into_config(self) -> Result<RetrieConfig> {
        self.validate()?;

        let defaults = RetrieConfig::default();
        let config = RetrieConfig {
            max_retries: self
                .max_retries
                .map_or(defaults.max_retries, |v| v as u32),
            min_timeout: self
                .min_timeout
                .map_or(defaults.min_timeout, |v| Duration::from_millis(v as u64)),
            max_timeout: self
                .max_timeout
                .map_or(defaults.max_timeout, |v| Duration::from_millis(v as u64)),
            backoff: self.backoff.unwrap_or(defaults.backoff),
            backoff_type: match self.backoff_type {
                Some(kind) => kind.parse()?,
                None => defaults.backoff_type,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl From<&RetrieConfig> for RetrieOptions {
    fn from(config: &RetrieConfig) -> Self {
        Self {
            max_retries: Some(f64::from(config.max_retries)),
            min_timeout: Some(config.min_timeout.as_millis() as f64),
            max_timeout: Some(config.max_timeout.as_millis() as f64),
            backoff: Some(config.backoff),
            backoff_type: Some(config.backoff_type.to_string()),
        }
    }
}

impl TryFrom<RetrieOptions> for RetrieConfig {
    type Error = ConfigError;

    fn try_from(options: RetrieOptions) -> Result<Self> {
        options.into_config()
    }
}

/// `limit` is exclusive.
fn integer(field: &'static str, value: f64, limit: f64) -> Result<()> {
    if value.is_nan() || value.fract() != 0.0 {
        return Err(ConfigError::NotAnInteger { field, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    if value >= limit {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_options_yield_defaults() {
        let config = RetrieOptions::default().into_config().unwrap();
        assert_eq!(config, RetrieConfig::default());
    }

    #[test]
    fn test_partial_json_overrides() {
        let options = RetrieOptions::from_json(
            r#"{ "maxRetries": 3, "minTimeout": 100, "maxTimeout": 1000, "backoff": 200, "backoffType": "linear" }"#,
        )
        .unwrap();
        let config = options.into_config().unwrap();

        assert_eq!(config.max_retries, 3);
        assert_eq!(config.min_timeout, Duration::from_millis(100));
        assert_eq!(config.max_timeout, Duration::from_millis(1000));
        assert_eq!(config.backoff, 200.0);
        assert_eq!(config.backoff_type, BackoffType::Linear);
    }

    #[test]
    fn test_toml_document() {
        let options: RetrieOptions = toml::from_str(
            r#"
            maxRetries = 5
            minTimeout = 250
            backoff = 1.5
            backoffType = "exponential"
            "#,
        )
        .unwrap();
        let config = RetrieConfig::try_from(options).unwrap();

        assert_eq!(config.max_retries, 5);
        assert_eq!(config.min_timeout, Duration::from_millis(250));
        assert_eq!(config.max_timeout, Duration::from_millis(60_000));
        assert_eq!(config.backoff_type, BackoffType::Exponential);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = RetrieOptions::from_json(r#"{ "retries": 3 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[rstest]
    #[case(r#"{ "maxRetries": -1 }"#, "maxRetries")]
    #[case(r#"{ "minTimeout": -100 }"#, "minTimeout")]
    #[case(r#"{ "maxTimeout": -0.0001e6 }"#, "maxTimeout")]
    fn test_negative_rejected(#[case] document: &str, #[case] expected: &str) {
        let err = RetrieOptions::from_json(document)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(
            matches!(err, ConfigError::Negative { field, .. } if field == expected),
            "unexpected error: {err:?}"
        );
    }

    #[rstest]
    #[case(r#"{ "maxRetries": 1.5 }"#, "maxRetries")]
    #[case(r#"{ "minTimeout": 99.9 }"#, "minTimeout")]
    fn test_fraction_rejected(#[case] document: &str, #[case] expected: &str) {
        let err = RetrieOptions::from_json(document)
            .unwrap()
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotAnInteger { field, .. } if field == expected));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let options = RetrieOptions {
            max_retries: Some(1e12),
            ..RetrieOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ConfigError::OutOfRange { field: "maxRetries", .. })
        ));
    }

    #[rstest]
    #[case(RetrieOptions { max_retries: Some(4_294_967_296.0), ..RetrieOptions::default() }, "maxRetries")]
    #[case(RetrieOptions { min_timeout: Some(18_446_744_073_709_551_616.0), ..RetrieOptions::default() }, "minTimeout")]
    #[case(RetrieOptions { max_timeout: Some(18_446_744_073_709_551_616.0), ..RetrieOptions::default() }, "maxTimeout")]
    fn test_first_unrepresentable_value_rejected(#[case] options: RetrieOptions, #[case] expected: &str) {
        let err = options.into_config().unwrap_err();
        assert!(
            matches!(err, ConfigError::OutOfRange { field, .. } if field == expected),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_largest_values_accepted() {
        let options = RetrieOptions {
            max_retries: Some(4_294_967_295.0),
            max_timeout: Some(18_446_744_073_709_549_568.0),
            ..RetrieOptions::default()
        };
        let config = options.into_config().unwrap();

        assert_eq!(config.max_retries, u32::MAX);
        assert_eq!(config.max_timeout, Duration::from_millis(18_446_744_073_709_549_568));
    }

    #[test]
    fn test_negative_backoff_rejected() {
        let options = RetrieOptions {
            backoff: Some(-2.0),
            ..RetrieOptions::default()
        };
        assert!(matches!(
            options.into_config(),
            Err(ConfigError::InvalidBackoff(_))
        ));
    }

    #[test]
    fn test_unknown_backoff_type_rejected() {
        let err = RetrieOptions::from_json(r#"{ "backoffType": "random" }"#)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBackoffType(kind) if kind == "random"));
    }

    #[test]
    fn test_inverted_range_rejected_after_defaults() {
        // minTimeout above the default ceiling
        let err = RetrieOptions::from_json(r#"{ "minTimeout": 120000 }"#)
            .unwrap()
            .into_config()
            .unwrap_err();
        assert!(matches!(err, ConfigError::TimeoutRange { .. }));
    }

    #[test]
    fn test_config_serializes_back_to_options() {
        let config = RetrieConfig::default();
        let options = RetrieOptions::from(&config);

        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["backoffType"], "linear");
        assert_eq!(json["minTimeout"], 1000.0);

        assert_eq!(options.into_config().unwrap(), config);
    }
}
