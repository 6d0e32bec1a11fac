//! Error types used by the liveguard coordinator and guarded tasks.
//!
//! This module defines two error enums:
//!
//! - [`RuntimeError`] — errors raised by the coordinator itself.
//! - [`TaskError`] — errors surfaced by a guarded task execution.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logging/metrics. Probe failures are deliberately absent from
//! [`RuntimeError`]: health-endpoint problems are logged and published as
//! events but never escalated past the coordinator.

use thiserror::Error;

/// # Errors produced by the coordinator runtime.
///
/// The only fatal condition is a failed task in [`RunMode::Once`]
/// (one-shot jobs report failure to the host process, which is expected
/// to exit non-zero). Long-running modes log task errors per iteration
/// and keep going.
///
/// [`RunMode::Once`]: crate::RunMode::Once
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The one-shot task finished with an error.
    #[error("task {task:?} failed: {error}")]
    OnceFailed {
        /// Name of the task that failed.
        task: String,
        /// The task's terminal error (including recovered panics).
        error: TaskError,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use liveguard::{RuntimeError, TaskError};
    ///
    /// let err = RuntimeError::OnceFailed {
    ///     task: "job".into(),
    ///     error: TaskError::Fail { error: "disk full".into() },
    /// };
    /// assert_eq!(err.as_label(), "runtime_once_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::OnceFailed { .. } => "runtime_once_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::OnceFailed { task, error } => {
                format!("task {task:?} failed: {}", error.as_message())
            }
        }
    }
}

/// # Errors produced by guarded task execution.
///
/// A task either returns one of these or panics; panics are recovered by
/// the crash guard and converted into [`TaskError::Panicked`], so the
/// coordinator only ever observes values of this type.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution reported an error.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked; the payload was recovered and stringified.
    #[error("panicked: {message}")]
    Panicked {
        /// The recovered panic payload as a formatted string.
        message: String,
    },

    /// Task observed the stop signal and exited cooperatively.
    ///
    /// Treated as graceful completion, not a failure.
    #[error("stop signal observed")]
    Canceled,
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use liveguard::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { message } => format!("panic: {message}"),
            TaskError::Canceled => "stop signal observed".to_string(),
        }
    }

    /// Indicates whether the error counts as a graceful exit.
    ///
    /// Returns `true` only for [`TaskError::Canceled`]: a task that notices
    /// the stop signal and bails out did exactly what was asked of it.
    pub fn is_graceful(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}
