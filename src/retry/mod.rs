//! Retry sessions: the operation contract and the driver loop.
//!
//! ## Contents
//! - [`BackOff`], [`BackOffFn`], [`FutureBackOff`] what a caller implements
//! - [`Completion`] one-shot report of an attempt's [`BackOffState`]
//! - [`RetrySession`] per-session interval / elapsed-time state
//! - [`RetryDriver`] the attempt loop; [`SessionHandle`] for spawned sessions
//! - [`Timer`] the delayed-invocation primitive ([`TokioTimer`] by default)
//!
//! ## Quick wiring
//! ```text
//! BackoffConfig ──► RetryDriver::builder(cfg).build()
//!                        └─► run(&op) / spawn(Arc<op>)
//!                              ├─► op.run(last_interval, elapsed, Completion)
//!                              ├─► RetrySession::decide(policy, rng)
//!                              └─► Timer::sleep(wait)
//! ```

mod completion;
mod driver;
mod handle;
mod operation;
mod session;
mod state;
mod timer;

pub use completion::Completion;
pub use driver::{RetryDriver, RetryDriverBuilder};
pub use handle::SessionHandle;
pub use operation::{BackOff, BackOffFn, FutureBackOff};
pub use session::{Decision, RetrySession};
pub use state::{BackOffState, DriverState, Outcome, SessionReport};
pub use timer::{Timer, TokioTimer};

#[cfg(test)]
mod tests;
