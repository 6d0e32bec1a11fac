//! # Crash guard: panic recovery boundary for user tasks.
//!
//! Every invocation of caller-supplied work goes through
//! [`run_guarded`]; it is the only mechanism keeping an unhandled panic in
//! user code from tearing down the coordinator, the signal watcher, and the
//! liveness probe with it.
//!
//! ## Rules
//! - A normal return produces [`TaskOutcome::Completed`] with the task's own
//!   result.
//! - A panic is recovered, stringified (`&str`/`String` payloads preserved
//!   verbatim), logged at error severity with the task name, and returned as
//!   [`TaskOutcome::Panicked`]. It is never re-raised.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::core::stop::StopSignal;
use crate::error::TaskError;
use crate::tasks::Task;

/// Outcome of one guarded task invocation.
///
/// Produced only by the crash guard, consumed only by the coordinator.
#[derive(Debug)]
pub enum TaskOutcome {
    /// The task returned normally (with its own `Ok`/`Err`).
    Completed(Result<(), TaskError>),
    /// The task panicked; the payload was recovered and converted.
    Panicked(TaskError),
}

impl TaskOutcome {
    /// The failure to report, if any.
    ///
    /// [`TaskError::Canceled`] counts as graceful completion and yields `None`.
    pub fn error(&self) -> Option<&TaskError> {
        match self {
            TaskOutcome::Completed(Ok(())) => None,
            TaskOutcome::Completed(Err(e)) if e.is_graceful() => None,
            TaskOutcome::Completed(Err(e)) => Some(e),
            TaskOutcome::Panicked(e) => Some(e),
        }
    }

    /// Consuming variant of [`error`](TaskOutcome::error).
    pub fn into_error(self) -> Option<TaskError> {
        match self {
            TaskOutcome::Completed(Ok(())) => None,
            TaskOutcome::Completed(Err(e)) if e.is_graceful() => None,
            TaskOutcome::Completed(Err(e)) => Some(e),
            TaskOutcome::Panicked(e) => Some(e),
        }
    }

    /// True if the invocation panicked.
    pub fn is_panic(&self) -> bool {
        matches!(self, TaskOutcome::Panicked(_))
    }
}

/// Runs one task invocation inside the panic-recovery boundary.
pub async fn run_guarded<T: Task + ?Sized>(task: &T, stop: StopSignal) -> TaskOutcome {
    let fut = task.run(stop);
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(res) => TaskOutcome::Completed(res),
        Err(payload) => {
            let message = panic_message(payload);
            tracing::error!(task = task.name(), panic = %message, "recovered panic in guarded task");
            TaskOutcome::Panicked(TaskError::Panicked { message })
        }
    }
}

/// Converts a recovered panic payload into a displayable string.
fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskFn;

    #[tokio::test]
    async fn normal_return_is_completed() {
        let ok = TaskFn::new("ok", |_stop: StopSignal| async { Ok(()) });
        let outcome = run_guarded(&ok, StopSignal::new()).await;
        assert!(outcome.error().is_none());
        assert!(!outcome.is_panic());
    }

    #[tokio::test]
    async fn task_error_is_preserved() {
        let failing = TaskFn::new("failing", |_stop: StopSignal| async {
            Err(TaskError::Fail {
                error: "disk full".into(),
            })
        });
        let outcome = run_guarded(&failing, StopSignal::new()).await;
        let err = outcome.into_error().expect("should carry the error");
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn canceled_counts_as_graceful() {
        let quitting = TaskFn::new("quitting", |_stop: StopSignal| async {
            Err(TaskError::Canceled)
        });
        let outcome = run_guarded(&quitting, StopSignal::new()).await;
        assert!(outcome.error().is_none());
    }

    #[tokio::test]
    async fn panic_is_recovered_with_message() {
        let bomb = TaskFn::new("bomb", |_stop: StopSignal| async { panic!("boom") });
        let outcome = run_guarded(&bomb, StopSignal::new()).await;
        assert!(outcome.is_panic());
        let err = outcome.into_error().expect("panic must surface as error");
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn formatted_panic_payload_is_preserved() {
        let bomb = TaskFn::new("bomb", |_stop: StopSignal| async {
            panic!("exploded after {} retries", 3)
        });
        let outcome = run_guarded(&bomb, StopSignal::new()).await;
        let err = outcome.into_error().expect("panic must surface as error");
        assert!(err.to_string().contains("exploded after 3 retries"));
    }
}
