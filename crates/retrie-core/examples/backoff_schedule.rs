//! Example: inspecting backoff schedules without running anything
//!
//! This example demonstrates:
//! 1. The delay sequence produced by linear and exponential backoff
//! 2. Loading options from a camelCase JSON document
//! 3. How invalid options are reported
//!
//! Run with:
//! ```bash
//! cargo run -p retrie-core --example backoff_schedule
//! ```

use retrie_core::prelude::*;
use std::time::Duration;

/// Delays applied before each retry, in order.
fn schedule(config: &RetrieConfig) -> Vec<Duration> {
    let mut delays = Vec::with_capacity(config.max_retries as usize);
    let mut timeout = config.min_timeout;
    for _ in 0..config.max_retries {
        delays.push(timeout);
        timeout = config.next_timeout(timeout);
    }
    delays
}

fn print_schedule(config: &RetrieConfig) {
    println!(
        "  {} backoff {} (min {:?}, max {:?}), {} attempts total",
        config.backoff_type,
        config.backoff,
        config.min_timeout,
        config.max_timeout,
        config.total_attempts()
    );
    for (retry, delay) in schedule(config).iter().enumerate() {
        println!("  Retry {}: wait {:?}", retry + 1, delay);
    }
}

/// Example 1: linear vs exponential
fn example_schedules() -> Result<(), ConfigError> {
    println!("\n=== Example 1: Linear vs Exponential ===\n");

    let linear = RetrieConfig::builder()
        .max_retries(5)
        .min_timeout(Duration::from_millis(100))
        .max_timeout(Duration::from_millis(1000))
        .backoff(200.0)
        .build()?;
    print_schedule(&linear);

    println!();

    let exponential = RetrieConfig::builder()
        .max_retries(5)
        .min_timeout(Duration::from_millis(100))
        .max_timeout(Duration::from_millis(1000))
        .backoff(2.0)
        .backoff_type(BackoffType::Exponential)
        .build()?;
    print_schedule(&exponential);

    Ok(())
}

/// Example 2: options from JSON
fn example_options() -> Result<(), ConfigError> {
    println!("\n=== Example 2: Options From JSON ===\n");

    let json = r#"{ "maxRetries": 4, "minTimeout": 250, "backoff": 1.5, "backoffType": "exponential" }"#;
    println!("  Input: {}", json);

    let config = RetrieOptions::from_json(json)?.into_config()?;
    print_schedule(&config);

    Ok(())
}

/// Example 3: rejected options
fn example_invalid() {
    println!("\n=== Example 3: Invalid Options ===\n");

    let inputs = [
        r#"{ "maxRetries": -1 }"#,
        r#"{ "maxRetries": 2.5 }"#,
        r#"{ "backoffType": "fibonacci" }"#,
        r#"{ "minTimeout": 5000, "maxTimeout": 100 }"#,
        r#"{ "retries": 3 }"#,
    ];

    for input in inputs {
        match RetrieOptions::from_json(input).and_then(RetrieOptions::into_config) {
            Ok(config) => println!("  {} -> accepted: {:?}", input, config),
            Err(err) => println!("  {} -> rejected: {}", input, err),
        }
    }
}

fn main() -> Result<(), ConfigError> {
    example_schedules()?;
    example_options()?;
    example_invalid();

    println!("\n=== All Examples Complete ===\n");

    Ok(())
}
