//! Terminal error types for a retry execution
//!
//! Per-attempt failures are recovered by retrying and never surface on their
//! own. Only the terminal error reaches the caller, through the handle.

use std::error::Error;
use std::fmt;

/// Result type delivered by a [`Retrie`](crate::Retrie) handle
pub type Result<T, E> = std::result::Result<T, RetrieError<E>>;

/// Terminal failure of a retry execution.
///
/// `Display` is the message of the underlying cause, so an exhausted
/// execution reads exactly like its last failure. Use the variant (or the
/// `finished`/`cancelled` flags of the state snapshot) to tell them apart.
#[derive(Debug, Clone, PartialEq)]
pub enum RetrieError<E> {
    /// Every attempt failed; carries the failure of the last one
    Exhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// Failure returned by the final attempt
        last: E,
    },

    /// The execution was cancelled before reaching a terminal outcome
    ///
    /// The cause is the reason given to `cancel_with`, otherwise the last
    /// failure observed before cancellation, otherwise `None`.
    Cancelled {
        /// Why the execution stopped, if known
        cause: Option<E>,
    },

    /// The driver task ended without settling an outcome (the operation panicked)
    Aborted,
}

impl<E> RetrieError<E> {
    /// Whether the retry budget ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    /// Whether the execution was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// The operation failure or cancellation reason, if there is one
    pub fn cause(&self) -> Option<&E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Cancelled { cause } => cause.as_ref(),
            Self::Aborted => None,
        }
    }

    /// Consume the error, returning the underlying cause
    pub fn into_cause(self) -> Option<E> {
        match self {
            Self::Exhausted { last, .. } => Some(last),
            Self::Cancelled { cause } => cause,
            Self::Aborted => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetrieError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted { last, .. } => write!(f, "{}", last),
            Self::Cancelled { cause: Some(cause) } => write!(f, "{}", cause),
            Self::Cancelled { cause: None } => write!(f, "cancelled"),
            Self::Aborted => write!(f, "retry task ended without settling an outcome"),
        }
    }
}

impl<E: Error + 'static> Error for RetrieError<E> {
    // Display already renders the cause, so skip a level like `#[error(transparent)]`
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause().and_then(|cause| cause.source())
    }
}
