//! Example: retrying an unreliable call with retrie
//!
//! This example demonstrates:
//! 1. Linear backoff until the call succeeds
//! 2. Exponential backoff running out of retries
//! 3. Cancelling from another task while a delay is pending
//!
//! Run with:
//! ```bash
//! RUST_LOG=retrie=debug cargo run -p retrie --example retrie_example
//! ```

use retrie::prelude::*;
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
struct ApiError(String);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for ApiError {}

/// A simulated API that fails the first few times
#[derive(Clone)]
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    async fn call(&self) -> Result<String, ApiError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!("  Attempt {}: FAILED", attempt + 1);
            Err(ApiError(format!("transient error on attempt {}", attempt + 1)))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: linear backoff
async fn example_linear() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Linear Backoff ===\n");

    let config = RetrieConfig::builder()
        .max_retries(3)
        .min_timeout(Duration::from_millis(100))
        .backoff(50.0)
        .build()?;

    let api = UnreliableApi::new(2);
    let start = Instant::now();
    let op_api = api.clone();
    let mut handle = retrie(
        move |_control| {
            let api = op_api.clone();
            async move { api.call().await }
        },
        config,
    )?;

    let result = (&mut handle).await?;
    let state = handle.state();

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Retries: {}", state.retries);
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: 100ms + 150ms = ~250ms");

    Ok(())
}

/// Example 2: exponential backoff, budget exhausted
async fn example_exhausted() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Exponential Backoff, Retries Exhausted ===\n");

    let config = RetrieConfig::builder()
        .max_retries(2)
        .min_timeout(Duration::from_millis(50))
        .max_timeout(Duration::from_millis(150))
        .backoff(4.0)
        .backoff_type(BackoffType::Exponential)
        .build()?;

    let api = UnreliableApi::new(10);
    let op_api = api.clone();
    let mut handle = retrie(
        move |_control| {
            let api = op_api.clone();
            async move { api.call().await }
        },
        config,
    )?;

    match (&mut handle).await {
        Ok(value) => println!("Unexpected success: {}", value),
        Err(err) => {
            let state = handle.state();
            println!("\nGave up: {}", err);
            println!("finished={} cancelled={}", state.finished, state.cancelled);
            println!("Total attempts: {}", api.total_attempts());
        }
    }

    Ok(())
}

/// Example 3: cancellation while a delay is pending
async fn example_cancel() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Cancellation ===\n");

    let config = RetrieConfig::builder()
        .min_timeout(Duration::from_secs(30))
        .build()?;

    let api = UnreliableApi::new(10);
    let start = Instant::now();
    let handle = retrie(
        move |_control: RetrieControl<String, ApiError>| {
            let api = api.clone();
            async move { api.call().await }
        },
        config,
    )?;
    let control = handle.control();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        println!("  Cancelling...");
        control.cancel_with(ApiError("shutting down".to_string()));
    });

    match handle.await {
        Ok(value) => println!("Unexpected success: {}", value),
        Err(err) => println!("\nCancelled: {} (after {:?}, not 30s)", err, start.elapsed()),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("╔══════════════════════════════════════════╗");
    println!("║           retrie Examples                ║");
    println!("╚══════════════════════════════════════════╝");

    example_linear().await?;
    example_exhausted().await?;
    example_cancel().await?;

    println!("\n=== All Examples Complete ===\n");

    Ok(())
}
