//! # Event bus for broadcasting retry events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from any number of retry sessions.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                 Receivers:
//!   Driver 1 ──┐
//!   Driver 2 ──┼──────► Bus ───────► SubscriberSet::listen ────► subscribers
//!   Driver N ──┘  (broadcast chan)    (or any bus.subscribe())
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Default ring buffer capacity.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/// Broadcast channel for retry events.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// ### Notes
    /// - Capacity is **shared** across all receivers (not per-receiver).
    /// - The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn receiver_sees_events_published_after_subscribe() {
        let bus = Bus::new(8);
        bus.publish(Event::new(EventKind::SessionStarted));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::AttemptStarting).with_attempt(1));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::AttemptStarting);
        assert_eq!(ev.attempt, Some(1));
    }

    #[test]
    fn publish_without_receivers_is_harmless() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::SessionStarted));
    }
}
