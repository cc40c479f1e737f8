//! # RetryDriver: single-session retry loop.
//!
//! Drives one [`BackOff`] operation with:
//! - exponential, jittered waits per [`BackoffPolicy`],
//! - an elapsed-time budget,
//! - waits delegated to a [`Timer`],
//! - cooperative cancellation via [`CancellationToken`].
//!
//! ## Event flow
//! ```text
//! SessionStarted
//!   → AttemptStarting → [operation runs] → AttemptSucceeded  (terminal)
//!                                        → AttemptAborted    (terminal)
//!                                        → AttemptFailed
//!                                              → BackoffScheduled → [timer] → next attempt
//!                                              → SessionExhausted (terminal)
//!   at any safe point → SessionCancelled (terminal)
//! ```
//!
//! ## Architecture
//! ```text
//! loop {
//!   ├─► cancelled? → Cancelled
//!   ├─► publish AttemptStarting
//!   ├─► op.run(last_interval, elapsed, completion)
//!   ├─► await completion (cancellable)
//!   │     ├─► Succeeded → return
//!   │     ├─► Abort     → return
//!   │     └─► Retry / dropped completion
//!   ├─► session.decide()
//!   │     ├─► Exhausted → return
//!   │     └─► RetryAfter(wait)
//!   ├─► publish BackoffScheduled
//!   └─► timer.sleep(wait) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - Attempts run **sequentially** (the operation is never invoked while a
//!   previous completion is outstanding)
//! - Elapsed time counts **scheduled waits only**, not the time attempts take
//! - After cancellation the operation is **never** invoked again

use std::sync::Arc;
use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tokio::select;
use tokio_util::sync::CancellationToken;

use crate::config::BackoffConfig;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;

use super::completion::Completion;
use super::handle::SessionHandle;
use super::operation::BackOff;
use super::session::{Decision, RetrySession};
use super::state::{BackOffState, DriverState, Outcome, SessionReport};
use super::timer::{Timer, TokioTimer};

/// Builder for [`RetryDriver`].
pub struct RetryDriverBuilder<R = StdRng> {
    policy: BackoffPolicy,
    name: Option<Arc<str>>,
    timer: Arc<dyn Timer>,
    rng: R,
    bus: Option<Bus>,
    token: CancellationToken,
}

impl RetryDriverBuilder<StdRng> {
    fn new(cfg: BackoffConfig) -> Self {
        Self {
            policy: BackoffPolicy::new(cfg),
            name: None,
            timer: Arc::new(TokioTimer),
            rng: StdRng::from_os_rng(),
            bus: None,
            token: CancellationToken::new(),
        }
    }

    /// Uses a `StdRng` seeded with `seed`, making the jitter reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RetryDriverBuilder<R> {
    /// Names the session in events and logs (defaults to [`BackOff::name`]).
    pub fn with_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replaces the timer used for backoff waits.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    /// Replaces the random source used for jitter.
    pub fn with_rng<R2: Rng>(self, rng: R2) -> RetryDriverBuilder<R2> {
        RetryDriverBuilder {
            policy: self.policy,
            name: self.name,
            timer: self.timer,
            rng,
            bus: self.bus,
            token: self.token,
        }
    }

    /// Publishes lifecycle events to `bus`.
    pub fn with_bus(mut self, bus: Bus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Uses `token` to cancel the session (e.g. a child of a runtime-wide token).
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Builds the driver.
    pub fn build(self) -> RetryDriver<R> {
        RetryDriver {
            policy: self.policy,
            name: self.name,
            timer: self.timer,
            rng: self.rng,
            bus: self.bus,
            token: self.token,
            state: DriverState::Idle,
        }
    }
}

/// Drives one retry session for one operation.
///
/// ### Responsibilities
/// - **Execution**: invokes the operation once per attempt
/// - **Backoff**: asks the [`BackoffPolicy`] for every wait and budget check
/// - **Graceful shutdown**: responds to cancellation at safe points
/// - **Event publishing**: reports lifecycle events to the bus (if configured)
///
/// A driver is consumed by [`run`](Self::run) or [`spawn`](Self::spawn); a new
/// session needs a new driver. Configs are `Copy`, so that is cheap.
pub struct RetryDriver<R = StdRng> {
    policy: BackoffPolicy,
    name: Option<Arc<str>>,
    timer: Arc<dyn Timer>,
    rng: R,
    bus: Option<Bus>,
    token: CancellationToken,
    state: DriverState,
}

impl RetryDriver<StdRng> {
    /// Creates a driver with the default timer and an OS-seeded random source.
    pub fn new(cfg: BackoffConfig) -> Self {
        Self::builder(cfg).build()
    }

    /// Starts a builder for a driver over `cfg`.
    pub fn builder(cfg: BackoffConfig) -> RetryDriverBuilder<StdRng> {
        RetryDriverBuilder::new(cfg)
    }
}

impl<R: Rng> RetryDriver<R> {
    /// Token that cancels this session.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Runs the session until success, abort, exhaustion, or cancellation.
    ///
    /// ### Exit conditions
    /// - Operation reports [`BackOffState::Succeeded`] → [`Outcome::Succeeded`]
    /// - Operation reports [`BackOffState::Abort`] → [`Outcome::Aborted`]
    /// - A failure arrives once elapsed backoff has reached the budget → [`Outcome::Exhausted`]
    /// - The cancellation token fires → [`Outcome::Cancelled`]
    ///
    /// ### Cancellation semantics
    /// The token is checked at **safe points** only:
    /// - before each invocation
    /// - while awaiting the completion (a late report is ignored)
    /// - during the backoff wait (the wait is aborted immediately)
    pub async fn run<B>(mut self, op: &B) -> SessionReport
    where
        B: BackOff + ?Sized,
    {
        let name: Arc<str> = self.name.clone().unwrap_or_else(|| Arc::from(op.name()));
        let mut session = RetrySession::new(&self.policy);
        let mut attempts: u32 = 0;

        tracing::debug!(session = %name, "retry session started");
        self.publish(|| Event::new(EventKind::SessionStarted).with_session(name.clone()));

        loop {
            if self.token.is_cancelled() {
                return self.finish_cancelled(&name, &session, attempts);
            }

            self.transition(DriverState::Attempting);
            attempts = attempts.saturating_add(1);
            self.publish(|| {
                Event::new(EventKind::AttemptStarting)
                    .with_session(name.clone())
                    .with_attempt(attempts)
                    .with_delay_ms(session.last_interval_millis())
                    .with_elapsed_ms(session.elapsed_time_millis())
            });

            let (completion, rx) = Completion::channel();
            op.run(
                session.last_interval_millis(),
                session.elapsed_time_millis(),
                completion,
            );

            let reported = select! {
                res = rx => Some(res),
                _ = self.token.cancelled() => None,
            };
            let Some(reported) = reported else {
                return self.finish_cancelled(&name, &session, attempts);
            };

            let (state, reason) = match reported {
                Ok(state) => (state, "reported"),
                Err(_) => {
                    tracing::warn!(session = %name, attempt = attempts, "completion dropped without a report; treating as failure");
                    (BackOffState::Retry, "completion dropped")
                }
            };

            match state {
                BackOffState::Succeeded => {
                    self.transition(DriverState::Succeeded);
                    tracing::debug!(session = %name, attempt = attempts, "attempt succeeded");
                    self.publish(|| {
                        Event::new(EventKind::AttemptSucceeded)
                            .with_session(name.clone())
                            .with_attempt(attempts)
                            .with_elapsed_ms(session.elapsed_time_millis())
                    });
                    return report(Outcome::Succeeded, &session, attempts);
                }
                BackOffState::Abort => {
                    self.transition(DriverState::Aborted);
                    tracing::debug!(session = %name, attempt = attempts, "attempt aborted");
                    self.publish(|| {
                        Event::new(EventKind::AttemptAborted)
                            .with_session(name.clone())
                            .with_attempt(attempts)
                    });
                    return report(Outcome::Aborted, &session, attempts);
                }
                BackOffState::Retry => {}
            }

            self.transition(DriverState::Deciding);
            self.publish(|| {
                Event::new(EventKind::AttemptFailed)
                    .with_session(name.clone())
                    .with_attempt(attempts)
                    .with_reason(reason)
            });

            let wait = match session.decide(&self.policy, &mut self.rng) {
                Decision::Exhausted => {
                    self.transition(DriverState::Exhausted);
                    tracing::debug!(
                        session = %name,
                        attempts,
                        elapsed_ms = session.elapsed_time_millis(),
                        "elapsed-time budget exhausted"
                    );
                    self.publish(|| {
                        Event::new(EventKind::SessionExhausted)
                            .with_session(name.clone())
                            .with_attempt(attempts)
                            .with_elapsed_ms(session.elapsed_time_millis())
                    });
                    return report(Outcome::Exhausted, &session, attempts);
                }
                Decision::RetryAfter(wait) => wait,
            };

            self.transition(DriverState::Scheduled);
            tracing::debug!(
                session = %name,
                attempt = attempts,
                wait_ms = wait,
                elapsed_ms = session.elapsed_time_millis(),
                "backoff scheduled"
            );
            self.publish(|| {
                Event::new(EventKind::BackoffScheduled)
                    .with_session(name.clone())
                    .with_attempt(attempts)
                    .with_delay_ms(wait)
                    .with_elapsed_ms(session.elapsed_time_millis())
            });

            let cancelled = select! {
                _ = self.timer.sleep(Duration::from_millis(wait)) => false,
                _ = self.token.cancelled() => true,
            };
            if cancelled {
                return self.finish_cancelled(&name, &session, attempts);
            }
        }
    }

    /// Runs the session on a new tokio task and returns a handle to it.
    ///
    /// Must be called inside a tokio runtime.
    pub fn spawn<B>(self, op: Arc<B>) -> SessionHandle
    where
        B: BackOff + ?Sized,
        R: Send + 'static,
    {
        let token = self.token.clone();
        let join = tokio::spawn(async move { self.run(op.as_ref()).await });
        SessionHandle::new(token, join)
    }

    fn transition(&mut self, next: DriverState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal driver transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    fn publish(&self, ev: impl FnOnce() -> Event) {
        if let Some(bus) = &self.bus {
            bus.publish(ev());
        }
    }

    fn finish_cancelled(
        &mut self,
        name: &Arc<str>,
        session: &RetrySession,
        attempts: u32,
    ) -> SessionReport {
        self.transition(DriverState::Cancelled);
        tracing::debug!(session = %name, attempts, "retry session cancelled");
        self.publish(|| {
            Event::new(EventKind::SessionCancelled)
                .with_session(name.clone())
                .with_attempt(attempts)
        });
        report(Outcome::Cancelled, session, attempts)
    }
}

fn report(outcome: Outcome, session: &RetrySession, attempts: u32) -> SessionReport {
    SessionReport {
        outcome,
        attempts,
        retries: session.attempt_count(),
        elapsed_time_millis: session.elapsed_time_millis(),
        last_interval_millis: session.last_interval_millis(),
    }
}
