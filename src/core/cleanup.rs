//! # Cleanup registration.
//!
//! [`CleanupStack`] collects closers (`FnOnce`) at construction time and
//! flushes them all once the run finishes. Registration is statically typed:
//! anything that needs arguments or error reporting is captured inside the
//! closure itself.
//!
//! ## Rules
//! - Closers run in registration order.
//! - The flush happens exactly once; later calls are no-ops.
//! - A flush is performed in every run mode, after the probe has drained.

use std::sync::Mutex;

use crate::events::{Bus, Event, EventKind};

type Closer = Box<dyn FnOnce() + Send>;

/// Ordered list of cleanup closures, flushed once at end of run.
pub(crate) struct CleanupStack {
    fns: Mutex<Vec<Closer>>,
}

impl CleanupStack {
    pub(crate) fn new(fns: Vec<Closer>) -> Self {
        Self {
            fns: Mutex::new(fns),
        }
    }

    /// Runs all registered closers in order. Idempotent.
    pub(crate) fn flush(&self, bus: &Bus) {
        let fns = match self.fns.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        if fns.is_empty() {
            return;
        }

        let count = fns.len();
        tracing::debug!(count, "flushing cleanups");
        for f in fns {
            f();
        }
        bus.publish(Event::new(EventKind::CleanupFlushed).with_reason(count.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn flush_runs_in_order_and_only_once() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mk = |n: u32| {
            let order = Arc::clone(&order);
            Box::new(move || order.lock().unwrap().push(n)) as Closer
        };
        let stack = CleanupStack::new(vec![mk(1), mk(2), mk(3)]);
        let bus = Bus::new(4);

        stack.flush(&bus);
        stack.flush(&bus);

        assert_eq!(*order.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn flush_publishes_count() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let stack = CleanupStack::new(vec![Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        })]);

        let bus = Bus::new(4);
        let mut rx = bus.subscribe();
        stack.flush(&bus);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::CleanupFlushed);
        assert_eq!(ev.reason.as_deref(), Some("1"));
    }
}
