#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Core building blocks for the retrie retry executor.
//!
//! This crate holds the pieces of a retry execution that do not need a
//! runtime:
//!
//! - **Backoff policy** via [`backoff::next_timeout`]
//!   - Linear: `min(max_timeout, current + backoff)`
//!   - Exponential: `min(max_timeout, current * backoff)`
//! - **Configuration** via [`RetrieConfig`] and its builder
//! - **Loose input** via [`RetrieOptions`], deserializable from camelCase
//!   JSON or TOML and validated field by field
//! - **Configuration errors** via [`ConfigError`]
//!
//! The engine that drives attempts lives in the `retrie` crate.
//!
//! # Examples
//!
//! ```rust
//! use retrie_core::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), ConfigError> {
//! let config = RetrieConfig::builder()
//!     .max_retries(3)
//!     .min_timeout(Duration::from_millis(100))
//!     .backoff(200.0)
//!     .build()?;
//!
//! let second = config.next_timeout(config.min_timeout);
//! assert_eq!(second, Duration::from_millis(300));
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod config;
pub mod error;

pub use config::{RetrieConfig, RetrieConfigBuilder, RetrieOptions};
pub use error::ConfigError;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use retrie_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{BackoffType, next_timeout};
    pub use crate::config::{RetrieConfig, RetrieConfigBuilder, RetrieOptions};
    pub use crate::error::ConfigError;
}
