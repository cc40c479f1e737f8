//! # Example: flaky_operation
//!
//! Retries an operation that fails a few times before succeeding, with every
//! lifecycle event written through the built-in [`LogWriter`].
//!
//! The operation reports from a spawned task, the way a network callback would.
//!
//! ## Flow
//! ```text
//! RetryDriver::run()
//!   ├─► publish(SessionStarted)
//!   ├─► op.run(500, 0, completion) → spawned work → completion.failed()
//!   ├─► publish(AttemptFailed)
//!   ├─► publish(BackoffScheduled{delay≈500ms})
//!   ├─► sleep(delay)
//!   ├─► op.run(last, elapsed, completion) → ... → completion.succeeded()
//!   └─► publish(AttemptSucceeded)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example flaky_operation --features logging
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use retryvisor::{
    BackOffFn, BackoffConfig, Bus, Completion, LogWriter, RetryDriver, Subscribe, SubscriberSet,
};
use tracing_subscriber::EnvFilter;

static CALLS: AtomicU32 = AtomicU32::new(0);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 1. Bus + subscribers
    let bus = Bus::new(256);
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let listener = SubscriberSet::new(subs, bus.clone()).listen();

    // 2. Backoff: 200ms, 300ms, 450ms, ... (±30%), give up after 10s of waiting
    let cfg = BackoffConfig::builder()
        .with_initial_interval_millis(200)
        .with_multiplier(1.5)
        .with_randomization_factor(0.3)
        .with_max_interval_millis(2_000)
        .with_max_elapsed_time_millis(10_000)
        .build()?;

    // 3. Operation: fails three times, then succeeds
    let op = BackOffFn::new(
        "flaky",
        |last_ms: u64, elapsed_ms: u64, done: Completion| {
            let attempt = CALLS.fetch_add(1, Ordering::Relaxed) + 1;
            println!("[flaky] attempt {attempt} (waited {last_ms}ms, {elapsed_ms}ms total)");
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                done.complete(attempt > 3);
            });
        },
    );

    // 4. Drive the session
    let report = RetryDriver::builder(cfg)
        .with_bus(bus)
        .build()
        .run(&op)
        .await;
    println!("[main] {report:?}");

    listener.shutdown().await;
    report.into_result()?;
    Ok(())
}
