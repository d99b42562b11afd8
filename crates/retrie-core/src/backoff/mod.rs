//! Backoff policy.
//!
//! Maps the delay currently scheduled and a [`RetrieConfig`](crate::config::RetrieConfig)
//! to the delay that follows it. No jitter is applied: the same inputs
//! always produce the same delay.
//!
//! # Examples
//!
//! ```rust
//! use retrie_core::backoff::{next_timeout, BackoffType};
//! use retrie_core::config::RetrieConfig;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), retrie_core::ConfigError> {
//! let config = RetrieConfig::builder()
//!     .min_timeout(Duration::from_millis(100))
//!     .max_timeout(Duration::from_secs(1))
//!     .backoff(2.0)
//!     .backoff_type(BackoffType::Exponential)
//!     .build()?;
//!
//! assert_eq!(next_timeout(config.min_timeout, &config), Duration::from_millis(200));
//! # Ok(())
//! # }
//! ```

mod policy;

pub use policy::{BackoffType, next_timeout};
