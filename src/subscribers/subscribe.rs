//! # Subscriber contract.
//!
//! A [`Subscribe`] implementor receives every lifecycle [`Event`] on its own
//! worker with a bounded queue; slow subscribers lose events rather than
//! slowing the coordinator down.

use async_trait::async_trait;

use crate::events::Event;

/// Receives lifecycle events (logging, metrics, alerting, ...).
///
/// Handlers run on a dedicated worker per subscriber; a panicking handler is
/// caught and logged without affecting other subscribers or the run itself.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Stable subscriber name, used in overflow/panic diagnostics.
    fn name(&self) -> &'static str;

    /// Capacity of this subscriber's event queue (clamped to ≥ 1).
    ///
    /// When the queue is full, new events are dropped for this subscriber.
    fn queue_capacity(&self) -> usize {
        256
    }

    /// Handles one event.
    async fn on_event(&self, event: &Event);
}
