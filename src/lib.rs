//! # retryvisor
//!
//! **Retryvisor** drives an operation through repeated attempts separated by
//! exponentially growing, jittered waits, until it succeeds, asks to stop, runs
//! out of its elapsed-time budget, or is cancelled.
//!
//! Attempts report their outcome through a one-shot [`Completion`], so an
//! operation can start asynchronous work (a request, a spawned task, a callback
//! from another library) and report whenever that work finishes.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   ┌──────────────────┐         ┌──────────────────────────┐
//!   │  BackoffConfig   │ ──────► │      BackoffPolicy       │
//!   │ (validated once) │         │ grow / randomize / budget│
//!   └──────────────────┘         └────────────┬─────────────┘
//!                                             ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  RetryDriver (one per session)                                    │
//! │  - RetrySession (current interval, elapsed time, retry count)     │
//! │  - Timer (TokioTimer by default)                                  │
//! │  - CancellationToken                                              │
//! │  - Bus (optional)                                                 │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        ▼                                              │ Publishes
//!   ┌──────────────────┐                                │ - SessionStarted
//!   │  BackOff::run    │ ── Completion ──► driver       │ - AttemptFailed
//!   │ (user operation) │                                │ - BackoffScheduled
//!   └──────────────────┘                                │ - ...
//!                                                       ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                       │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │   SubscriberListener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                      worker1   worker2   workerN
//! ```
//!
//! ### Lifecycle
//! ```text
//! RetryDriver::run(&op)
//!
//! loop {
//!   ├─► attempts += 1
//!   ├─► op.run(last_interval, elapsed, completion)
//!   ├─► await completion (cancellable)
//!   │       ├─ Succeeded ──► Outcome::Succeeded
//!   │       ├─ Abort     ──► Outcome::Aborted
//!   │       └─ Retry / dropped completion:
//!   │            ├─ elapsed >= budget ──► Outcome::Exhausted
//!   │            ├─ wait = randomize(current_interval)
//!   │            ├─ elapsed += wait; current_interval = grow(current_interval)
//!   │            ├─ publish BackoffScheduled{ delay, elapsed }
//!   │            └─ timer.sleep(wait) (cancellable)
//!   │
//!   └─ token cancelled at any safe point ──► Outcome::Cancelled
//! }
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                               |
//! |-------------------|--------------------------------------------------------------|--------------------------------------------------|
//! | **Configuration** | Validated backoff parameters with defaults.                  | [`BackoffConfig`], [`BackoffConfigBuilder`]      |
//! | **Policies**      | Interval growth, jitter, and the elapsed-time budget.        | [`BackoffPolicy`], [`jitter`]                    |
//! | **Retrying**      | Session state and the attempt loop.                          | [`RetryDriver`], [`RetrySession`], [`SessionHandle`] |
//! | **Operations**    | What a caller implements, plus closure/future adapters.      | [`BackOff`], [`BackOffFn`], [`FutureBackOff`]    |
//! | **Subscriber API**| Hook into session lifecycle events.                          | [`Subscribe`], [`SubscriberSet`], [`Bus`]        |
//! | **Errors**        | Typed configuration and session errors.                      | [`ConfigError`], [`RetryError`]                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber.
//! - `serde`: `Serialize`/`Deserialize` for [`BackoffConfig`] (camelCase keys,
//!   validated on deserialize).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use retryvisor::{BackOffFn, BackoffConfig, Completion, Outcome, RetryDriver};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = BackoffConfig::builder()
//!         .with_initial_interval_millis(10)
//!         .with_max_elapsed_time_millis(5_000)
//!         .build()?;
//!
//!     // Fails twice, then succeeds.
//!     let calls = Arc::new(AtomicU32::new(0));
//!     let counter = calls.clone();
//!     let op = BackOffFn::new("flaky", move |_last_ms: u64, _elapsed_ms: u64, done: Completion| {
//!         let n = counter.fetch_add(1, Ordering::SeqCst);
//!         done.complete(n >= 2);
//!     });
//!
//!     let report = RetryDriver::new(cfg).run(&op).await;
//!     assert_eq!(report.outcome, Outcome::Succeeded);
//!     assert_eq!(report.attempts, 3);
//!
//!     report.into_result()?;
//!     Ok(())
//! }
//! ```
mod config;
mod error;
mod events;
mod policies;
mod retry;
mod subscribers;

// ---- Public re-exports ----

pub use config::{
    BackoffConfig, BackoffConfigBuilder, DEFAULT_INITIAL_INTERVAL_MILLIS,
    DEFAULT_MAX_ELAPSED_TIME_MILLIS, DEFAULT_MAX_INTERVAL_MILLIS, DEFAULT_MULTIPLIER,
    DEFAULT_RANDOMIZATION_FACTOR,
};
pub use error::{ConfigError, RetryError};
pub use events::{Bus, DEFAULT_BUS_CAPACITY, Event, EventKind};
pub use policies::{BackoffPolicy, jitter};
pub use retry::{
    BackOff, BackOffFn, BackOffState, Completion, Decision, DriverState, FutureBackOff, Outcome,
    RetryDriver, RetryDriverBuilder, RetrySession, SessionHandle, SessionReport, Timer, TokioTimer,
};
pub use subscribers::{Subscribe, SubscriberListener, SubscriberSet};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
