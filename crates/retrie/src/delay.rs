//! Cancellable delay primitive.
//!
//! The engine waits between attempts through the [`Delay`] trait so tests
//! and embedders can substitute their own timer. Every implementation must
//! return [`Wake::Interrupted`] as soon as the [`Interrupt`] fires, rather
//! than waiting out the full duration.

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::watch;

/// Why a delay returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The full duration passed
    Elapsed,

    /// Cancellation fired first
    Interrupted,
}

/// Receiving side of the cancellation signal.
///
/// Backed by a `watch` channel, so a signal fired before anyone waits is
/// still observed.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

impl Interrupt {
    pub(crate) fn new(rx: watch::Receiver<bool>) -> Self {
        Self { rx }
    }

    /// Create a linked trigger/interrupt pair.
    ///
    /// The engine creates its own; this is for driving a [`Delay`]
    /// implementation directly.
    pub fn pair() -> (Trigger, Interrupt) {
        let (tx, rx) = watch::channel(false);
        (Trigger { tx }, Interrupt::new(rx))
    }

    /// Whether cancellation has fired
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Complete once cancellation fires.
    ///
    /// Never completes if the sending side is gone without firing.
    pub async fn triggered(&mut self) {
        let closed = self.rx.wait_for(|fired| *fired).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

/// Sending side of the cancellation signal.
#[derive(Debug)]
pub struct Trigger {
    tx: watch::Sender<bool>,
}

impl Trigger {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> Interrupt {
        Interrupt::new(self.tx.subscribe())
    }

    /// Fire the signal; later calls are no-ops
    pub fn fire(&self) {
        self.tx.send_replace(true);
    }
}

/// A wait between attempts that cancellation can cut short.
///
/// # Examples
///
/// ```rust
/// use retrie::delay::{Delay, Interrupt, Wake};
/// use async_trait::async_trait;
/// use std::time::Duration;
///
/// /// Skips every delay, useful in tests.
/// struct NoDelay;
///
/// #[async_trait]
/// impl Delay for NoDelay {
///     async fn wait(&self, _duration: Duration, interrupt: &mut Interrupt) -> Wake {
///         if interrupt.is_triggered() {
///             Wake::Interrupted
///         } else {
///             Wake::Elapsed
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Delay: Send + Sync {
    /// Wait for `duration`, or until `interrupt` fires.
    async fn wait(&self, duration: Duration, interrupt: &mut Interrupt) -> Wake;
}

/// Default delay backed by `tokio::time::sleep`.
///
/// The sleep is dropped when the interrupt wins, which releases its timer
/// entry immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration, interrupt: &mut Interrupt) -> Wake {
        tokio::select! {
            biased;
            _ = interrupt.triggered() => Wake::Interrupted,
            _ = tokio::time::sleep(duration) => Wake::Elapsed,
        }
    }
}
