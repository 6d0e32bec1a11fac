//! # Lifecycle events emitted by the coordinator.
//!
//! [`EventKind`] classifies everything the runtime reports: the stop signal,
//! liveness-probe transitions, guarded-task outcomes, and run completion.
//! [`Event`] carries the metadata (timestamps, task name, reasons, durations)
//! with builder-style setters.
//!
//! ## Ordering
//! Each event gets a globally unique, monotonically increasing sequence
//! number (`seq`); use it to restore order when events are processed
//! asynchronously.
//!
//! ## Example
//! ```rust
//! use liveguard::{Event, EventKind};
//! use std::time::Duration;
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("worker")
//!     .with_reason("boom")
//!     .with_attempt(3)
//!     .with_elapsed(Duration::from_millis(120));
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("worker"));
//! assert_eq!(ev.elapsed_ms, Some(120));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Stop signal ===
    /// A terminate-class OS signal was observed.
    ///
    /// Sets: `reason` (signal name), `at`, `seq`.
    StopRequested,

    // === Liveness probe ===
    /// The probe bound its listener and is answering requests.
    ///
    /// Sets: `addr` (actual bound address), `at`, `seq`.
    ProbeServing,

    /// The probe could not bind its address; the run continues without it.
    ///
    /// Sets: `addr` (configured address), `reason` (bind error), `at`, `seq`.
    ProbeBindFailed,

    /// The probe finished draining in-flight requests and released its listener.
    ///
    /// Sets: `at`, `seq`; `reason` carries the shutdown error if there was one.
    ProbeDrained,

    /// The probe did not finish draining within the hard drain bound.
    ///
    /// Sets: `at`, `seq`.
    ProbeDrainTimedOut,

    // === Guarded task ===
    /// A guarded task invocation is starting.
    ///
    /// Sets: `task`, `attempt` (1-based), `at`, `seq`.
    TaskStarting,

    /// The invocation returned successfully (or exited on the stop signal).
    ///
    /// Sets: `task`, `attempt`, `elapsed_ms`, `at`, `seq`.
    TaskCompleted,

    /// The invocation returned an error.
    ///
    /// Sets: `task`, `attempt`, `reason`, `elapsed_ms`, `at`, `seq`.
    TaskFailed,

    /// The invocation panicked; the payload was recovered by the crash guard.
    ///
    /// Sets: `task`, `attempt`, `reason`, `elapsed_ms`, `at`, `seq`.
    TaskPanicked,

    /// The next relaunch of a [`Forever`](crate::RunMode::Forever) task is scheduled.
    ///
    /// Sets: `task`, `delay_ms`, `attempt` (previous attempt), `at`, `seq`.
    RelaunchScheduled,

    // === Run completion ===
    /// Registered cleanup closures were flushed.
    ///
    /// Sets: `reason` (count), `at`, `seq`.
    CleanupFlushed,

    /// The coordinator is returning control to its caller.
    ///
    /// Sets: `reason` ("task finished" or "stop signal"), `at`, `seq`.
    RunFinished,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, signal names, etc.).
    pub reason: Option<Arc<str>>,
    /// Bound or configured probe address.
    pub addr: Option<Arc<str>>,
    /// Invocation count (starting from 1).
    pub attempt: Option<u64>,
    /// Invocation duration in milliseconds.
    pub elapsed_ms: Option<u64>,
    /// Relaunch delay in milliseconds.
    pub delay_ms: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            addr: None,
            attempt: None,
            elapsed_ms: None,
            delay_ms: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a probe address.
    #[inline]
    pub fn with_addr(mut self, addr: impl Into<Arc<str>>) -> Self {
        self.addr = Some(addr.into());
        self
    }

    /// Attaches an invocation count.
    #[inline]
    pub fn with_attempt(mut self, n: u64) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches an invocation duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }

    /// Attaches a relaunch delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(d.as_millis().min(u128::from(u64::MAX)) as u64);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_are_monotonic() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskCompleted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_expected_fields() {
        let ev = Event::new(EventKind::RelaunchScheduled)
            .with_task("tick")
            .with_delay(Duration::from_secs(2))
            .with_attempt(7);
        assert_eq!(ev.task.as_deref(), Some("tick"));
        assert_eq!(ev.delay_ms, Some(2000));
        assert_eq!(ev.attempt, Some(7));
        assert!(ev.reason.is_none());
    }
}
