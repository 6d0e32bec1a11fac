//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that lets the
//! coordinator, the health server, and the signal watcher publish without
//! blocking. liveguard wires a single internal listener
//! (`Lifecycle::subscriber_listener`) that fans events out to user
//! subscribers via [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or fails.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers; slow receivers observe `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: events published with no active receiver are dropped.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events.
///
/// Cheap to clone (the sender is `Arc`-backed internally); multiple
/// publishers may publish concurrently, and every receiver gets a clone of
/// each event sent after it subscribed.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to ≥ 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers; drops it if there are none.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}
