#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Cancellable retry-with-backoff executor.
//!
//! `retrie` invokes a fallible async operation until it succeeds, the retry
//! budget runs out, or the execution is cancelled, waiting a growing delay
//! between attempts.
//!
//! - **Handle** via [`Retrie`]: await it for the outcome, read a
//!   [`RetrieState`] snapshot at any time, or cancel
//! - **Control** via [`RetrieControl`]: a cloneable cancel/state accessor,
//!   also passed to the operation so it can stop its own execution
//! - **Pluggable delay** via the [`Delay`] trait, interruptible by
//!   cancellation ([`TokioDelay`] by default)
//! - **Configuration** re-exported from `retrie-core`: [`RetrieConfig`],
//!   [`RetrieOptions`], [`BackoffType`]
//!
//! # Examples
//!
//! ```rust
//! use retrie::prelude::*;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RetrieConfig::builder()
//!     .max_retries(3)
//!     .min_timeout(Duration::from_millis(10))
//!     .backoff(2.0)
//!     .backoff_type(BackoffType::Exponential)
//!     .build()?;
//!
//! let mut handle = retrie(|control| async move {
//!     if control.state().retries < 2 {
//!         Err("transient".to_string())
//!     } else {
//!         Ok("done")
//!     }
//! }, config)?;
//!
//! assert_eq!((&mut handle).await, Ok("done"));
//! assert_eq!(handle.state().retries, 2);
//! # Ok(())
//! # }
//! ```
//!
//! Cancelling from another task wakes a pending delay immediately:
//!
//! ```rust
//! use retrie::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let handle = retrie(|_control| async { Err::<(), _>("down".to_string()) }, RetrieConfig::default())?;
//! let control = handle.control();
//!
//! tokio::spawn(async move { control.cancel_with("shutting down".to_string()) });
//!
//! let err = handle.await.unwrap_err();
//! assert!(err.is_cancelled());
//! # Ok(())
//! # }
//! ```

pub mod delay;
pub mod engine;
pub mod error;
pub mod handle;
pub mod state;

pub use delay::{Delay, Interrupt, TokioDelay, Trigger, Wake};
pub use engine::{RetrieBuilder, builder, retrie};
pub use error::RetrieError;
pub use handle::{Retrie, RetrieControl};
pub use retrie_core::backoff::{self, BackoffType};
pub use retrie_core::{ConfigError, RetrieConfig, RetrieConfigBuilder, RetrieOptions};
pub use state::{Outcome, RetrieState};

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use retrie::prelude::*;
/// ```
pub mod prelude {
    pub use crate::delay::{Delay, TokioDelay};
    pub use crate::engine::retrie;
    pub use crate::error::RetrieError;
    pub use crate::handle::{Retrie, RetrieControl};
    pub use crate::state::{Outcome, RetrieState};
    pub use retrie_core::prelude::*;
}
