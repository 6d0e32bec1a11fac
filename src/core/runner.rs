//! # Run a single guarded attempt of a task.
//!
//! Executes one invocation of a [`Task`] under the crash guard, measures its
//! duration, and publishes lifecycle events to the [`Bus`].
//!
//! ## Event flow
//! ```text
//! Success / cooperative stop:
//!   run_guarded → Completed(Ok | Err(Canceled)) → publish TaskCompleted
//!
//! Failure:
//!   run_guarded → Completed(Err(..)) → publish TaskFailed
//!
//! Panic:
//!   run_guarded → Panicked(..) → publish TaskPanicked
//! ```
//!
//! Always publishes `TaskStarting` plus exactly one terminal event.

use std::time::Instant;

use crate::core::guard::{self, TaskOutcome};
use crate::core::stop::StopSignal;
use crate::events::{Bus, Event, EventKind};
use crate::tasks::Task;

/// Executes one guarded attempt of `task`, publishing lifecycle events to `bus`.
pub(crate) async fn run_attempt(
    task: &dyn Task,
    stop: StopSignal,
    attempt: u64,
    bus: &Bus,
) -> TaskOutcome {
    bus.publish(
        Event::new(EventKind::TaskStarting)
            .with_task(task.name())
            .with_attempt(attempt),
    );

    let started = Instant::now();
    let outcome = guard::run_guarded(task, stop).await;
    let elapsed = started.elapsed();

    let terminal = match &outcome {
        TaskOutcome::Panicked(err) => Event::new(EventKind::TaskPanicked)
            .with_reason(err.as_message()),
        TaskOutcome::Completed(res) => match res {
            Ok(()) => Event::new(EventKind::TaskCompleted),
            Err(err) if err.is_graceful() => Event::new(EventKind::TaskCompleted),
            Err(err) => Event::new(EventKind::TaskFailed).with_reason(err.as_message()),
        },
    };
    bus.publish(
        terminal
            .with_task(task.name())
            .with_attempt(attempt)
            .with_elapsed(elapsed),
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn publishes_starting_then_terminal_event() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        let task = TaskFn::new("noop", |_stop: StopSignal| async { Ok(()) });
        run_attempt(&task, StopSignal::new(), 1, &bus).await;

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::TaskStarting);
        assert_eq!(first.attempt, Some(1));

        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, EventKind::TaskCompleted);
        assert!(second.elapsed_ms.is_some());
    }

    #[tokio::test]
    async fn failure_and_panic_publish_distinct_kinds() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        let failing = TaskFn::new("failing", |_stop: StopSignal| async {
            Err(TaskError::Fail { error: "nope".into() })
        });
        run_attempt(&failing, StopSignal::new(), 1, &bus).await;

        let bomb = TaskFn::new("bomb", |_stop: StopSignal| async { panic!("boom") });
        run_attempt(&bomb, StopSignal::new(), 2, &bus).await;

        let kinds: Vec<EventKind> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::TaskStarting,
                EventKind::TaskFailed,
                EventKind::TaskStarting,
                EventKind::TaskPanicked,
            ]
        );
    }
}
