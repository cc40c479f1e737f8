//! # Example: cancel_session
//!
//! Spawns a retry session for an operation that never succeeds, counts its
//! events with a custom subscriber, and cancels it from the outside.
//!
//! ## Run
//! ```bash
//! cargo run --example cancel_session
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use retryvisor::{
    BackoffConfig, Bus, Event, EventKind, FutureBackOff, Outcome, RetryDriver, Subscribe,
    SubscriberSet,
};

#[derive(Default)]
struct Counter {
    failures: AtomicU64,
    scheduled: AtomicU64,
}

#[async_trait]
impl Subscribe for Counter {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            EventKind::AttemptFailed => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::BackoffScheduled => {
                self.scheduled.fetch_add(1, Ordering::Relaxed);
            }
            EventKind::SessionCancelled => {
                println!("[counter] session {:?} cancelled", ev.session);
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let bus = Bus::default();
    let counter = Arc::new(Counter::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![counter.clone()];
    let listener = SubscriberSet::new(subs, bus.clone()).listen();

    let cfg = BackoffConfig::builder()
        .with_initial_interval_millis(100)
        .with_multiplier(2.0)
        .build()?;

    // The endpoint is down for good.
    let op = FutureBackOff::arc("unreachable", |_last_ms: u64, _elapsed_ms: u64| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        false
    });

    let handle = RetryDriver::builder(cfg)
        .with_bus(bus)
        .with_name("unreachable-endpoint")
        .build()
        .spawn(op);

    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.cancel();
    let report = handle.join().await?;
    assert_eq!(report.outcome, Outcome::Cancelled);

    listener.shutdown().await;
    println!(
        "[main] attempts={} failures={} scheduled={} elapsed_ms={}",
        report.attempts,
        counter.failures.load(Ordering::Relaxed),
        counter.scheduled.load(Ordering::Relaxed),
        report.elapsed_time_millis,
    );
    Ok(())
}
