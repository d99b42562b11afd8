//! Handles onto a running execution.
//!
//! All mutation of an execution's state goes through [`Shared::lock`]. The
//! `active` flag is checked and the terminal transition applied under that
//! one lock, so when the attempt loop and `cancel` race, whichever takes
//! the lock first settles the outcome and the other becomes a no-op.
//!
//! The attempt loop does not invoke the operation until the [`Retrie`]
//! handle releases it: on first use (poll, inspection, cancellation or
//! [`Retrie::control`]) or when the handle is dropped.

use crate::delay::{Interrupt, Trigger};
use crate::error::{Result, RetrieError};
use crate::state::{Outcome, RetrieState};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{Notify, oneshot};
use tracing::{info, warn};

/// State shared between the attempt loop and every handle.
pub(crate) struct Shared<T, E> {
    inner: Mutex<Inner<T, E>>,
    trigger: Trigger,
    start: Notify,
}

pub(crate) struct Inner<T, E> {
    pub(crate) state: RetrieState<T, E>,
    pub(crate) last_error: Option<E>,
    sender: Option<oneshot::Sender<Result<T, E>>>,
}

impl<T: Clone, E: Clone> Inner<T, E> {
    /// Record the terminal outcome and deliver it to the handle.
    ///
    /// Callers must have checked `state.active` under the same lock.
    pub(crate) fn settle(&mut self, outcome: Result<T, E>) {
        debug_assert!(self.sender.is_some(), "retrie outcome settled twice");

        self.state.active = false;
        self.state.result = Some(match &outcome {
            Ok(value) => Outcome::Success(value.clone()),
            Err(err) => Outcome::Error(err.clone()),
        });

        if let Some(sender) = self.sender.take() {
            // The handle may already be gone; the state still records the outcome.
            let _ = sender.send(outcome);
        }
    }
}

impl<T, E> Inner<T, E> {
    /// Settle with [`RetrieError::Aborted`] if nothing else has.
    ///
    /// Returns whether this call performed the terminal transition.
    pub(crate) fn abort(&mut self) -> bool {
        if !self.state.active {
            return false;
        }

        self.state.active = false;
        self.state.result = Some(Outcome::Error(RetrieError::Aborted));
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(Err(RetrieError::Aborted));
        }
        true
    }
}

impl<T, E> Shared<T, E> {
    pub(crate) fn new(timeout: Duration) -> (Arc<Self>, oneshot::Receiver<Result<T, E>>) {
        let (sender, receiver) = oneshot::channel();
        let shared = Arc::new(Self {
            inner: Mutex::new(Inner {
                state: RetrieState::new(timeout),
                last_error: None,
                sender: Some(sender),
            }),
            trigger: Trigger::new(),
            start: Notify::new(),
        });
        (shared, receiver)
    }

    /// Lock the execution record.
    ///
    /// A panic while holding the lock leaves the record consistent (every
    /// transition is a handful of field writes), so poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Inner<T, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn interrupt(&self) -> Interrupt {
        self.trigger.subscribe()
    }

    /// Let the attempt loop begin; later calls are no-ops for the loop.
    pub(crate) fn release(&self) {
        self.start.notify_one();
    }

    /// Complete once [`release`](Self::release) has been called.
    pub(crate) async fn released(&self) {
        self.start.notified().await;
    }
}

/// Cloneable control over a running execution.
///
/// Handed to the operation on every attempt, and obtainable from
/// [`Retrie::control`], so any task can inspect or cancel the execution.
pub struct RetrieControl<T, E> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> Clone for RetrieControl<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> RetrieControl<T, E> {
    pub(crate) fn shared(&self) -> &Shared<T, E> {
        &self.shared
    }
}

impl<T: Clone, E: Clone> RetrieControl<T, E> {
    pub(crate) fn new(shared: Arc<Shared<T, E>>) -> Self {
        Self { shared }
    }

    /// Copy of the current execution state.
    pub fn state(&self) -> RetrieState<T, E> {
        self.shared.lock().state.clone()
    }

    /// Whether an attempt or delay is still pending.
    pub fn is_active(&self) -> bool {
        self.shared.lock().state.active
    }

    /// Cancel the execution.
    ///
    /// The terminal error's cause is the last failure observed so far, if
    /// any. Returns `false` without effect if the execution has already
    /// settled.
    pub fn cancel(&self) -> bool {
        self.cancel_inner(None)
    }

    /// Cancel the execution with an explicit cause.
    ///
    /// `reason` takes priority over any recorded failure. Returns `false`
    /// without effect if the execution has already settled.
    pub fn cancel_with(&self, reason: E) -> bool {
        self.cancel_inner(Some(reason))
    }

    fn cancel_inner(&self, reason: Option<E>) -> bool {
        let retries = {
            let mut inner = self.shared.lock();
            if !inner.state.active {
                return false;
            }

            let cause = reason.or_else(|| inner.last_error.clone());
            inner.state.cancelled = true;
            inner.state.finished = false;
            inner.settle(Err(RetrieError::Cancelled { cause }));
            inner.state.retries
        };

        // Wake a pending delay so the loop exits instead of attempting again
        self.shared.trigger.fire();
        self.shared.release();
        info!(retries, "retrie cancelled");
        true
    }
}

impl<T, E> fmt::Debug for RetrieControl<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetrieControl").finish_non_exhaustive()
    }
}

/// Handle to a retry execution.
///
/// Awaiting the handle yields the success value or the terminal
/// [`RetrieError`]. The handle also exposes the state snapshot and
/// cancellation directly.
///
/// The first attempt waits until the handle is first used: polled,
/// inspected through [`state`](Self::state) or [`is_active`](Self::is_active),
/// cancelled, or asked for its [`control`](Self::control). The first
/// inspection therefore always observes the initial state, and a `cancel`
/// issued straight after start always wins over the first attempt, on any
/// runtime flavor.
///
/// Dropping the handle releases the execution without stopping it; call
/// [`cancel`](Self::cancel) for that. If the attempt loop dies without
/// settling (the operation panicked or the runtime shut down), the handle
/// resolves to [`RetrieError::Aborted`]. Like other one-shot futures, it
/// must not be polled again after it has completed.
///
/// # Examples
///
/// ```rust
/// use retrie::{retrie, RetrieConfig};
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut handle = retrie(
///     |_control| async { Ok::<_, String>("success") },
///     RetrieConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!((&mut handle).await, Ok("success"));
/// assert!(handle.state().finished);
/// # }
/// ```
pub struct Retrie<T, E> {
    control: RetrieControl<T, E>,
    receiver: oneshot::Receiver<Result<T, E>>,
}

impl<T: Clone, E: Clone> Retrie<T, E> {
    pub(crate) fn new(
        control: RetrieControl<T, E>,
        receiver: oneshot::Receiver<Result<T, E>>,
    ) -> Self {
        Self { control, receiver }
    }

    /// Copy of the current execution state.
    pub fn state(&self) -> RetrieState<T, E> {
        let state = self.control.state();
        self.control.shared.release();
        state
    }

    /// Whether an attempt or delay is still pending.
    pub fn is_active(&self) -> bool {
        let active = self.control.is_active();
        self.control.shared.release();
        active
    }

    /// Cancel the execution. See [`RetrieControl::cancel`].
    pub fn cancel(&self) -> bool {
        self.control.cancel()
    }

    /// Cancel with an explicit cause. See [`RetrieControl::cancel_with`].
    pub fn cancel_with(&self, reason: E) -> bool {
        self.control.cancel_with(reason)
    }

    /// A cloneable control for this execution.
    ///
    /// Releases the attempt loop, since the control may be used from
    /// anywhere afterwards.
    pub fn control(&self) -> RetrieControl<T, E> {
        self.control.shared.release();
        self.control.clone()
    }
}

impl<T, E> Future for Retrie<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        this.control.shared.release();
        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RetrieError::Aborted)),
        }
    }
}

impl<T, E> Drop for Retrie<T, E> {
    fn drop(&mut self) {
        self.control.shared.release();
    }
}

impl<T, E> fmt::Debug for Retrie<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrie").finish_non_exhaustive()
    }
}
