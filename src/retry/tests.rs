use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use super::*;
use crate::config::BackoffConfig;
use crate::events::{Bus, EventKind};

/// Fails the first `fail_first` attempts, then succeeds. Records its arguments.
struct Flaky {
    fail_first: u32,
    calls: AtomicU32,
    args: Mutex<Vec<(u64, u64)>>,
}

impl Flaky {
    fn new(fail_first: u32) -> Self {
        Self {
            fail_first,
            calls: AtomicU32::new(0),
            args: Mutex::new(Vec::new()),
        }
    }

    fn always_failing() -> Self {
        Self::new(u32::MAX)
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BackOff for Flaky {
    fn name(&self) -> &str {
        "flaky"
    }

    fn run(&self, last_interval_millis: u64, elapsed_time_millis: u64, completion: Completion) {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.args
            .lock()
            .unwrap()
            .push((last_interval_millis, elapsed_time_millis));
        completion.complete(n >= self.fail_first);
    }
}

/// Timer that records requested delays and resolves immediately.
#[derive(Default)]
struct RecordingTimer {
    delays: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Timer for RecordingTimer {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

fn scenario_config() -> BackoffConfig {
    BackoffConfig::builder()
        .with_initial_interval_millis(500)
        .with_multiplier(2.0)
        .with_randomization_factor(0.0)
        .with_max_interval_millis(2_000)
        .with_max_elapsed_time_millis(3_000)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn first_success_runs_once() {
    let op = Flaky::new(0);
    let report = RetryDriver::new(scenario_config()).run(&op).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.retries, 0);
    assert_eq!(report.elapsed_time_millis, 0);
    assert_eq!(op.calls(), 1);
    assert_eq!(*op.args.lock().unwrap(), vec![(500, 0)]);
}

#[tokio::test(start_paused = true)]
async fn always_failing_session_is_exhausted() {
    let op = Flaky::always_failing();
    let start = Instant::now();
    let report = RetryDriver::new(scenario_config()).run(&op).await;

    // waits 500, 1000, 2000 sum to 3500, past the 3000 budget
    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.retries, 3);
    assert_eq!(report.elapsed_time_millis, 3_500);
    assert_eq!(report.last_interval_millis, 2_000);
    assert_eq!(op.calls(), 4);
    assert_eq!(
        *op.args.lock().unwrap(),
        vec![(500, 0), (500, 500), (1_000, 1_500), (2_000, 3_500)]
    );
    assert!(start.elapsed() >= Duration::from_millis(3_500));
    assert_eq!(
        report.into_result(),
        Err(crate::RetryError::Exhausted {
            attempts: 4,
            elapsed_time_millis: 3_500
        })
    );
}

#[tokio::test(start_paused = true)]
async fn budget_reached_exactly_stops() {
    let op = Flaky::always_failing();
    let report = RetryDriver::new(with_budget(scenario_config(), 1_500))
        .run(&op)
        .await;

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.retries, 2);
    assert_eq!(report.elapsed_time_millis, 1_500);
}

#[tokio::test(start_paused = true)]
async fn one_millisecond_under_budget_schedules_another_wait() {
    let op = Flaky::always_failing();
    let report = RetryDriver::new(with_budget(scenario_config(), 1_501))
        .run(&op)
        .await;

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.retries, 3);
    assert_eq!(report.elapsed_time_millis, 3_500);
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_retries() {
    let cfg = BackoffConfig::builder()
        .with_initial_interval_millis(100)
        .with_multiplier(2.0)
        .with_randomization_factor(0.0)
        .build()
        .unwrap();
    let op = Flaky::new(2);
    let report = RetryDriver::new(cfg).run(&op).await;

    assert!(report.is_success());
    assert_eq!(report.attempts, 3);
    assert_eq!(report.retries, 2);
    assert_eq!(report.elapsed_time_millis, 300);
    assert_eq!(report.last_interval_millis, 200);
}

#[tokio::test(start_paused = true)]
async fn abort_stops_without_retry() {
    let op = BackOffFn::new("abort", |_: u64, _: u64, done: Completion| done.abort());
    let report = RetryDriver::new(scenario_config()).run(&op).await;

    assert_eq!(report.outcome, Outcome::Aborted);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.retries, 0);
}

#[tokio::test(start_paused = true)]
async fn dropped_completion_counts_as_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let op = BackOffFn::new("dropper", move |_: u64, _: u64, done: Completion| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            drop(done);
        } else {
            done.succeeded();
        }
    });
    let report = RetryDriver::new(scenario_config()).run(&op).await;

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(report.attempts, 2);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn waits_are_delegated_to_timer() {
    let timer = Arc::new(RecordingTimer::default());
    let op = Flaky::always_failing();
    let cfg = BackoffConfig::builder()
        .with_initial_interval_millis(500)
        .with_multiplier(2.0)
        .with_randomization_factor(0.0)
        .with_max_interval_millis(2_000)
        .with_max_elapsed_time_millis(10_000)
        .build()
        .unwrap();

    let report = RetryDriver::builder(cfg)
        .with_timer(timer.clone())
        .build()
        .run(&op)
        .await;

    // cumulative 500, 1500, 3500, 5500, 7500, 9500, 11500; stops once past 10000
    let delays: Vec<u64> = timer
        .delays
        .lock()
        .unwrap()
        .iter()
        .map(|d| d.as_millis() as u64)
        .collect();
    assert_eq!(delays, vec![500, 1_000, 2_000, 2_000, 2_000, 2_000, 2_000]);
    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.elapsed_time_millis, 11_500);
    assert_eq!(report.attempts, 8);
}

#[tokio::test]
async fn seeded_jitter_is_reproducible_and_bounded() {
    let cfg = BackoffConfig::builder()
        .with_initial_interval_millis(1_000)
        .with_max_elapsed_time_millis(60_000)
        .build()
        .unwrap();

    let mut runs = Vec::new();
    for _ in 0..2 {
        let timer = Arc::new(RecordingTimer::default());
        let op = Flaky::always_failing();
        let report = RetryDriver::builder(cfg)
            .with_seed(42)
            .with_timer(timer.clone())
            .build()
            .run(&op)
            .await;
        assert_eq!(report.outcome, Outcome::Exhausted);
        assert!(report.elapsed_time_millis >= 60_000);
        let delays = timer.delays.lock().unwrap().clone();
        let last = delays.last().unwrap().as_millis() as u64;
        // the final wait was scheduled while still under budget
        assert!(report.elapsed_time_millis - last < 60_000);
        for d in &delays {
            // cap 60s × 1.5
            assert!(*d <= Duration::from_millis(90_000));
        }
        assert_eq!(
            delays.iter().map(|d| d.as_millis() as u64).sum::<u64>(),
            report.elapsed_time_millis
        );
        runs.push(delays);
    }
    assert_eq!(runs[0], runs[1]);
    assert!(!runs[0].is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_during_backoff_prevents_further_attempts() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let op = BackOffFn::arc("slow-retry", move |_: u64, _: u64, done: Completion| {
        let _ = tx.send(());
        done.failed();
    });
    let cfg = BackoffConfig::builder()
        .with_initial_interval_millis(10_000)
        .with_randomization_factor(0.0)
        .build()
        .unwrap();

    let handle = RetryDriver::new(cfg).spawn(op);
    rx.recv().await.unwrap();
    handle.cancel();
    let report = handle.join().await.unwrap();

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.retries, 1);
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn cancel_while_attempt_outstanding() {
    let parked: Arc<Mutex<Option<Completion>>> = Arc::new(Mutex::new(None));
    let slot = parked.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let op = BackOffFn::arc("hangs", move |_: u64, _: u64, done: Completion| {
        *slot.lock().unwrap() = Some(done);
        let _ = tx.send(());
    });

    let handle = RetryDriver::new(BackoffConfig::default()).spawn(op);
    rx.recv().await.unwrap();
    assert!(!handle.is_finished());
    handle.cancel();
    let report = handle.join().await.unwrap();
    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.attempts, 1);

    let late = parked.lock().unwrap().take().unwrap();
    assert!(late.is_abandoned());
    late.succeeded();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn pre_cancelled_token_never_invokes() {
    let token = CancellationToken::new();
    token.cancel();
    let op = Flaky::new(0);

    let report = RetryDriver::builder(BackoffConfig::default())
        .with_cancellation_token(token)
        .build()
        .run(&op)
        .await;

    assert_eq!(report.outcome, Outcome::Cancelled);
    assert_eq!(report.attempts, 0);
    assert_eq!(op.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn parent_token_cancels_child_session() {
    let parent = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let op = BackOffFn::arc("child", move |_: u64, _: u64, done: Completion| {
        let _ = tx.send(());
        done.failed();
    });

    let handle = RetryDriver::builder(BackoffConfig::default())
        .with_cancellation_token(parent.child_token())
        .build()
        .spawn(op);
    rx.recv().await.unwrap();
    parent.cancel();

    assert_eq!(handle.join().await.unwrap().outcome, Outcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn attempts_never_overlap() {
    let in_flight = Arc::new(AtomicU32::new(0));
    let max_seen = Arc::new(AtomicU32::new(0));
    let calls = Arc::new(AtomicU32::new(0));

    let (flight, seen, count) = (in_flight.clone(), max_seen.clone(), calls.clone());
    let op = BackOffFn::new("async-work", move |_: u64, _: u64, done: Completion| {
        let now = flight.fetch_add(1, Ordering::SeqCst) + 1;
        seen.fetch_max(now, Ordering::SeqCst);
        let n = count.fetch_add(1, Ordering::SeqCst);
        let flight = flight.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(250)).await;
            flight.fetch_sub(1, Ordering::SeqCst);
            done.complete(n == 4);
        });
    });

    let report = RetryDriver::new(with_budget(scenario_config(), 60_000))
        .run(&op)
        .await;

    assert_eq!(report.outcome, Outcome::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn attempt_duration_is_not_counted_as_elapsed() {
    let op = FutureBackOff::new("slow", |_: u64, _: u64| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        false
    });

    let report = RetryDriver::new(scenario_config()).run(&op).await;

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.elapsed_time_millis, 3_500);
}

#[tokio::test(start_paused = true)]
async fn publishes_lifecycle_events_in_order() {
    let bus = Bus::new(64);
    let mut rx = bus.subscribe();
    let op = Flaky::always_failing();

    RetryDriver::builder(scenario_config())
        .with_bus(bus.clone())
        .with_name("scenario")
        .build()
        .run(&op)
        .await;

    let mut events = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        events.push(ev);
    }
    let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::SessionStarted,
            EventKind::AttemptStarting,
            EventKind::AttemptFailed,
            EventKind::BackoffScheduled,
            EventKind::AttemptStarting,
            EventKind::AttemptFailed,
            EventKind::BackoffScheduled,
            EventKind::AttemptStarting,
            EventKind::AttemptFailed,
            EventKind::BackoffScheduled,
            EventKind::AttemptStarting,
            EventKind::AttemptFailed,
            EventKind::SessionExhausted,
        ]
    );
    assert!(events.iter().all(|e| e.session.as_deref() == Some("scenario")));

    let scheduled: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::BackoffScheduled)
        .map(|e| (e.delay_ms, e.elapsed_ms))
        .collect();
    assert_eq!(
        scheduled,
        vec![
            (Some(500), Some(500)),
            (Some(1_000), Some(1_500)),
            (Some(2_000), Some(3_500))
        ]
    );

    let last = events.last().unwrap();
    assert_eq!(last.attempt, Some(4));
    assert_eq!(last.delay_ms, None);
    assert_eq!(last.elapsed_ms, Some(3_500));
    assert!(last.kind.is_terminal());
}

#[tokio::test]
async fn zero_budget_gives_up_after_first_failure() {
    let cfg = BackoffConfig::builder()
        .with_max_elapsed_time_millis(0)
        .build()
        .unwrap();
    let op = Flaky::always_failing();
    let report = RetryDriver::new(cfg).run(&op).await;

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.attempts, 1);
    assert_eq!(report.retries, 0);
}

fn with_budget(cfg: BackoffConfig, budget: u64) -> BackoffConfig {
    crate::config::BackoffConfigBuilder::from(cfg)
        .with_max_elapsed_time_millis(budget)
        .build()
        .unwrap()
}
