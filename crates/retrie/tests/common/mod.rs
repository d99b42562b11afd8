//! Shared fixtures for engine tests
//!
//! Provides a cloneable error type, an operation that fails a fixed number
//! of times before succeeding, and a delay that records requested durations
//! instead of sleeping.

#![allow(dead_code)]

use async_trait::async_trait;
use retrie::{Delay, Interrupt, RetrieControl, Wake};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Error returned by test operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure(pub String);

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Failure {}

/// Counts invocations of an operation
#[derive(Debug, Clone, Default)]
pub struct Calls(Arc<AtomicU32>);

impl Calls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call, returning how many came before it
    pub fn hit(&self) -> u32 {
        self.0.fetch_add(1, Ordering::SeqCst)
    }

    pub fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Operation that fails `failures` times with "failure N", then yields `value`
pub fn fail_then_succeed<T>(
    calls: &Calls,
    failures: u32,
    value: T,
) -> impl FnMut(RetrieControl<T, Failure>) -> std::future::Ready<Result<T, Failure>> + Send + 'static
where
    T: Clone + Send + 'static,
{
    let calls = calls.clone();
    move |_control| {
        let n = calls.hit();
        std::future::ready(if n < failures {
            Err(Failure::new(format!("failure {}", n + 1)))
        } else {
            Ok(value.clone())
        })
    }
}

/// Operation that always fails with "failure"
pub fn always_fail<T>(
    calls: &Calls,
) -> impl FnMut(RetrieControl<T, Failure>) -> std::future::Ready<Result<T, Failure>> + Send + 'static
where
    T: Clone + Send + 'static,
{
    let calls = calls.clone();
    move |_control| {
        calls.hit();
        std::future::ready(Err(Failure::new("failure")))
    }
}

/// Operation that sleeps for `duration`, then produces the result of `make`
pub fn slow<T, F>(
    calls: &Calls,
    duration: Duration,
    make: F,
) -> impl FnMut(RetrieControl<T, Failure>) -> std::pin::Pin<Box<dyn Future<Output = Result<T, Failure>> + Send>>
+ Send
+ 'static
where
    T: Clone + Send + 'static,
    F: Fn() -> Result<T, Failure> + Send + Sync + Clone + 'static,
{
    let calls = calls.clone();
    move |_control| {
        calls.hit();
        let make = make.clone();
        Box::pin(async move {
            tokio::time::sleep(duration).await;
            make()
        })
    }
}

/// Delay that records each requested duration and returns at once
#[derive(Debug, Clone, Default)]
pub struct RecordingDelay {
    seen: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn millis(&self) -> Vec<u128> {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .map(Duration::as_millis)
            .collect()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn wait(&self, duration: Duration, interrupt: &mut Interrupt) -> Wake {
        self.seen.lock().unwrap().push(duration);
        if interrupt.is_triggered() {
            Wake::Interrupted
        } else {
            Wake::Elapsed
        }
    }
}

/// Delay that only ever ends through the interrupt
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeverDelay;

#[async_trait]
impl Delay for ForeverDelay {
    async fn wait(&self, _duration: Duration, interrupt: &mut Interrupt) -> Wake {
        interrupt.triggered().await;
        Wake::Interrupted
    }
}

fn explode<T>() -> Result<T, Failure> {
    panic!("operation panicked")
}

/// Operation that panics on every call
pub fn panicking<T>(
    calls: &Calls,
) -> impl FnMut(RetrieControl<T, Failure>) -> std::pin::Pin<Box<dyn Future<Output = Result<T, Failure>> + Send>>
+ Send
+ 'static
where
    T: Clone + Send + 'static,
{
    let calls = calls.clone();
    move |_control| {
        calls.hit();
        Box::pin(async { explode() })
    }
}
