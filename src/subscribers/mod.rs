//! # Event subscribers for retry sessions.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out,
//! and (feature `logging`) the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//!   RetryDriver ── publish(Event) ──► Bus ──► SubscriberListener ──► SubscriberSet::emit
//!                                                                      ├──► LogWriter
//!                                                                      ├──► Metrics
//!                                                                      └──► Custom ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::{SubscriberListener, SubscriberSet};
pub use subscribe::Subscribe;
