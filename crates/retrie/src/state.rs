//! Execution state and outcome model
//!
//! The engine owns the live [`RetrieState`]; callers only ever see copies.

use crate::error::RetrieError;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Settled result of an execution, as recorded in the state.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T, E> {
    /// The operation produced a value
    Success(T),

    /// The execution failed or was cancelled
    Error(RetrieError<E>),
}

impl<T, E> Outcome<T, E> {
    /// Whether this is a success
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The produced value, if any
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// The terminal error, if any
    pub fn error(&self) -> Option<&RetrieError<E>> {
        match self {
            Self::Success(_) => None,
            Self::Error(err) => Some(err),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, RetrieError<E>> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Error(err) => Err(err),
        }
    }
}

/// Snapshot of a retry execution.
///
/// Returned by value: mutating a snapshot never affects the execution.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrieState<T, E> {
    /// When the execution was created
    pub started_at: DateTime<Utc>,

    /// Failed attempts whose delay has been consumed
    ///
    /// Stays 0 for the whole first attempt and its delay.
    pub retries: u32,

    /// Delay that will be (or was last) applied
    pub timeout: Duration,

    /// Whether cancellation won
    pub cancelled: bool,

    /// Whether the execution ran to success or ran out of retries
    pub finished: bool,

    /// Whether an attempt or delay is still pending
    pub active: bool,

    /// Set exactly once, together with the terminal transition
    pub result: Option<Outcome<T, E>>,
}

impl<T, E> RetrieState<T, E> {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            started_at: Utc::now(),
            retries: 0,
            timeout,
            cancelled: false,
            finished: false,
            active: true,
            result: None,
        }
    }

    /// Time since the execution was created
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}
