//! # The retry-driving contract.
//!
//! An operation plugs into a [`RetryDriver`](crate::RetryDriver) by implementing
//! [`BackOff`]. The driver calls [`BackOff::run`] once per attempt and waits for
//! the attempt's [`Completion`] to be reported; the operation is free to hand the
//! completion to a network callback, a spawned task, or anything else.
//!
//! Two adapters cover the common cases:
//! - [`BackOffFn`] wraps a closure with the same shape as `run`;
//! - [`FutureBackOff`] wraps a closure producing a future, spawns it per attempt,
//!   and reports whatever the future resolves to.
//!
//! ## Example
//! ```rust
//! use retryvisor::{BackOff, BackOffFn, Completion};
//!
//! let op = BackOffFn::arc("ping", |last_interval_ms: u64, _elapsed_ms: u64, done: Completion| {
//!     // kick off async work here and report from its callback
//!     done.complete(last_interval_ms > 1_000);
//! });
//! assert_eq!(op.name(), "ping");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use super::completion::Completion;
use super::state::BackOffState;

/// # Operation driven by a retry session.
///
/// ### Rules
/// - `run` must not block; start the work and return.
/// - `completion` must eventually be reported exactly once. Holding it forever
///   stalls the session; dropping it counts as a failed attempt.
/// - The driver never calls `run` again before the previous completion is reported.
pub trait BackOff: Send + Sync + 'static {
    /// Returns a stable, human-readable name for logs and events.
    fn name(&self) -> &str {
        "backoff"
    }

    /// Starts one attempt.
    ///
    /// ### Parameters
    /// - `last_interval_millis`: how long the driver waited before this attempt
    ///   (the initial interval on the first attempt)
    /// - `elapsed_time_millis`: total backoff time spent so far in this session
    /// - `completion`: report the attempt's outcome here
    fn run(&self, last_interval_millis: u64, elapsed_time_millis: u64, completion: Completion);
}

/// Closure-backed operation.
#[derive(Debug)]
pub struct BackOffFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> BackOffFn<F>
where
    F: Fn(u64, u64, Completion) + Send + Sync + 'static,
{
    /// Creates a new closure-backed operation.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the operation and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> BackOff for BackOffFn<F>
where
    F: Fn(u64, u64, Completion) + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, last_interval_millis: u64, elapsed_time_millis: u64, completion: Completion) {
        (self.f)(last_interval_millis, elapsed_time_millis, completion)
    }
}

/// Future-backed operation.
///
/// Each attempt calls the closure for a **new** future, spawns it on the current
/// tokio runtime, and reports its output. The output may be a [`BackOffState`] or
/// a plain `bool` success flag.
///
/// If the future panics, its completion is dropped and the attempt counts as failed.
#[derive(Debug)]
pub struct FutureBackOff<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F, Fut> FutureBackOff<F>
where
    F: Fn(u64, u64) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Into<BackOffState>,
{
    /// Creates a new future-backed operation.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the operation and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> BackOff for FutureBackOff<F>
where
    F: Fn(u64, u64) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Into<BackOffState>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, last_interval_millis: u64, elapsed_time_millis: u64, completion: Completion) {
        let fut = (self.f)(last_interval_millis, elapsed_time_millis);
        tokio::spawn(async move {
            completion.report(fut.await.into());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closure_receives_arguments() {
        let op = BackOffFn::new("args", |last: u64, elapsed: u64, done: Completion| {
            done.complete(last == 750 && elapsed == 1_250);
        });
        let (c, rx) = Completion::channel();
        op.run(750, 1_250, c);
        assert_eq!(rx.await.unwrap(), BackOffState::Succeeded);
        assert_eq!(op.name(), "args");
    }

    #[tokio::test]
    async fn future_output_is_reported() {
        let op = FutureBackOff::new("fut", |_last: u64, elapsed: u64| async move {
            if elapsed > 0 {
                BackOffState::Abort
            } else {
                BackOffState::Retry
            }
        });

        let (c, rx) = Completion::channel();
        op.run(500, 0, c);
        assert_eq!(rx.await.unwrap(), BackOffState::Retry);

        let (c, rx) = Completion::channel();
        op.run(500, 10, c);
        assert_eq!(rx.await.unwrap(), BackOffState::Abort);
    }

    #[tokio::test]
    async fn future_bool_output_maps_to_state() {
        let op = FutureBackOff::new("flag", |_: u64, _: u64| async { true });
        let (c, rx) = Completion::channel();
        op.run(0, 0, c);
        assert_eq!(rx.await.unwrap(), BackOffState::Succeeded);
    }

    #[tokio::test]
    async fn panicking_future_drops_completion() {
        let op = FutureBackOff::new("panics", |_: u64, explode: u64| async move {
            if explode == 0 {
                panic!("attempt exploded");
            }
            true
        });
        let (c, rx) = Completion::channel();
        op.run(0, 0, c);
        assert!(rx.await.is_err());
    }

    #[test]
    fn default_name() {
        struct Bare;
        impl BackOff for Bare {
            fn run(&self, _: u64, _: u64, completion: Completion) {
                completion.succeeded();
            }
        }
        assert_eq!(Bare.name(), "backoff");
    }
}
