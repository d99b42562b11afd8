//! The attempt loop.
//!
//! One spawned task per execution drives a small state machine:
//!
//! ```text
//! Idle ─release─▶ Running ──Ok──▶ Succeeded
//!                   │  ▲
//!               Err │  │ delay elapsed, retries += 1
//!                   ▼  │
//!                 Delaying ──interrupt──▶ Cancelled
//!                   │
//!                   └─ retries >= max_retries ──▶ ExhaustedFailed
//! ```
//!
//! Cancellation is re-checked under the state lock before each attempt,
//! after each attempt returns, and after each delay, so a `cancel` that
//! lands at any instant is observed at the next checkpoint. The canceller
//! settles the outcome itself; the loop simply stops when it finds the
//! execution inactive.
//!
//! If the loop is dropped while the execution is still active (the
//! operation panicked, or the runtime shut down), it settles the outcome as
//! [`RetrieError::Aborted`] on the way out.

use crate::delay::{Delay, Interrupt, TokioDelay, Wake};
use crate::error::RetrieError;
use crate::handle::{Retrie, RetrieControl, Shared};
use retrie_core::{ConfigError, RetrieConfig};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Instrument, debug, info, info_span, trace, warn};

/// Start a retry execution with the default tokio delay.
///
/// The configuration is validated first; an invalid one is returned as a
/// [`ConfigError`] and nothing is spawned. Otherwise the attempt loop is
/// spawned on the current tokio runtime and the handle is returned at once.
///
/// The first attempt waits until the handle is first used or dropped, so on
/// any runtime the caller's first look at the state is the initial one
/// (`retries == 0`, `active`) and a `cancel` straight after start always
/// prevents the operation from being invoked.
///
/// # Panics
///
/// Panics if called outside a tokio runtime, like `tokio::spawn`.
///
/// # Examples
///
/// ```rust
/// use retrie::{retrie, RetrieConfig};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::time::Duration;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let calls = Arc::new(AtomicU32::new(0));
/// let config = RetrieConfig::builder()
///     .min_timeout(Duration::from_millis(10))
///     .build()?;
///
/// let counter = Arc::clone(&calls);
/// let value = retrie(
///     move |_control| {
///         let counter = Arc::clone(&counter);
///         async move {
///             if counter.fetch_add(1, Ordering::SeqCst) < 2 {
///                 Err("not yet".to_string())
///             } else {
///                 Ok(42)
///             }
///         }
///     },
///     config,
/// )?
/// .await;
///
/// assert_eq!(value, Ok(42));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # Ok(())
/// # }
/// ```
pub fn retrie<T, E, F, Fut>(operation: F, config: RetrieConfig) -> Result<Retrie<T, E>, ConfigError>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
    F: FnMut(RetrieControl<T, E>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
{
    RetrieBuilder::new().config(config).start(operation)
}

/// Create a builder for configuring an execution.
///
/// # Examples
///
/// ```rust
/// use retrie::{RetrieConfig, TokioDelay};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let handle = retrie::builder()
///     .config(RetrieConfig::builder().max_retries(0).build()?)
///     .delay(TokioDelay)
///     .start(|_control| async { Ok::<_, String>(1) })?;
///
/// assert_eq!(handle.await, Ok(1));
/// # Ok(())
/// # }
/// ```
pub fn builder() -> RetrieBuilder {
    RetrieBuilder::new()
}

/// Builder for a retry execution.
pub struct RetrieBuilder {
    config: RetrieConfig,
    delay: Arc<dyn Delay>,
}

impl Default for RetrieBuilder {
    fn default() -> Self {
        Self {
            config: RetrieConfig::default(),
            delay: Arc::new(TokioDelay),
        }
    }
}

impl RetrieBuilder {
    /// Create a builder with the default configuration and [`TokioDelay`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    ///
    /// Default: [`RetrieConfig::default`]
    pub fn config(mut self, config: RetrieConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the delay primitive used between attempts.
    ///
    /// Default: [`TokioDelay`]
    pub fn delay(mut self, delay: impl Delay + 'static) -> Self {
        self.delay = Arc::new(delay);
        self
    }

    /// Validate the configuration and spawn the attempt loop.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start<T, E, F, Fut>(self, operation: F) -> Result<Retrie<T, E>, ConfigError>
    where
        T: Clone + Send + 'static,
        E: Clone + Send + 'static,
        F: FnMut(RetrieControl<T, E>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        self.config.validate()?;

        let (shared, receiver) = Shared::new(self.config.min_timeout);
        let interrupt = shared.interrupt();
        let control = RetrieControl::new(shared);

        let span = info_span!(
            "retrie",
            max_retries = self.config.max_retries,
            backoff_type = %self.config.backoff_type,
        );
        let driver = Driver {
            control: control.clone(),
            config: self.config,
            delay: self.delay,
            interrupt,
        };
        tokio::spawn(driver.run(operation).instrument(span));

        Ok(Retrie::new(control, receiver))
    }
}

/// What the loop does after an attempt has been recorded.
enum Next {
    Stop,
    Wait(Duration),
}

struct Driver<T, E> {
    control: RetrieControl<T, E>,
    config: RetrieConfig,
    delay: Arc<dyn Delay>,
    interrupt: Interrupt,
}

impl<T, E> Driver<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    async fn run<F, Fut>(mut self, mut operation: F)
    where
        F: FnMut(RetrieControl<T, E>) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        // Held back until the handle is used or dropped
        self.control.shared().released().await;

        loop {
            let retries = {
                let inner = self.control.shared().lock();
                if !inner.state.active {
                    trace!("execution settled before attempt");
                    return;
                }
                inner.state.retries
            };

            debug!(attempt = retries + 1, "invoking operation");
            let result = operation(self.control.clone()).await;

            let timeout = match self.record(result) {
                Next::Stop => return,
                Next::Wait(timeout) => timeout,
            };

            debug!(delay_ms = timeout.as_millis() as u64, "waiting before retry");
            if self.delay.wait(timeout, &mut self.interrupt).await == Wake::Interrupted {
                trace!("delay interrupted");
                return;
            }

            let mut inner = self.control.shared().lock();
            if !inner.state.active {
                return;
            }
            inner.state.retries += 1;
        }
    }

    /// Apply the result of one attempt under the state lock.
    fn record(&self, result: Result<T, E>) -> Next {
        let mut inner = self.control.shared().lock();

        if !inner.state.active {
            // Cancellation settled the outcome while the attempt was in flight
            debug!("discarding result of attempt that finished after cancellation");
            return Next::Stop;
        }

        let retries = inner.state.retries;
        match result {
            Ok(value) => {
                inner.state.finished = true;
                inner.settle(Ok(value));
                info!(retries, "operation succeeded");
                Next::Stop
            }
            Err(error) => {
                inner.last_error = Some(error.clone());

                if retries >= self.config.max_retries {
                    inner.state.finished = true;
                    inner.settle(Err(RetrieError::Exhausted {
                        attempts: retries.saturating_add(1),
                        last: error,
                    }));
                    info!(retries, "retry budget exhausted");
                    return Next::Stop;
                }

                let timeout = inner.state.timeout;
                inner.state.timeout = self.config.next_timeout(timeout);
                warn!(
                    retries,
                    max_retries = self.config.max_retries,
                    "attempt failed, will retry"
                );
                Next::Wait(timeout)
            }
        }
    }
}

impl<T, E> Drop for Driver<T, E> {
    fn drop(&mut self) {
        if self.control.shared().lock().abort() {
            warn!("retry task ended without settling, aborting execution");
        }
    }
}
