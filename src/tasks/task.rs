//! # Task abstraction.
//!
//! [`Task`] is the unit of work the coordinator runs under its crash guard.
//! A task receives a [`StopSignal`] and should check it at its own loop
//! checkpoints to exit cooperatively during shutdown; a running invocation
//! is never pre-empted mid-execution.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::StopSignal;
use crate::error::TaskError;

/// Shared handle to a task, suitable for cloning across the runtime.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, stop-aware unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async
/// [`run`](Task::run) method that receives the run's [`StopSignal`].
/// Implementors should check [`StopSignal::fired`] at convenient points and
/// exit promptly once it has fired; returning [`TaskError::Canceled`] in
/// that situation is treated as graceful completion.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use liveguard::{StopSignal, Task, TaskError};
///
/// struct Demo;
///
/// #[async_trait]
/// impl Task for Demo {
///     fn name(&self) -> &str { "demo" }
///
///     async fn run(&self, stop: StopSignal) -> Result<(), TaskError> {
///         if stop.fired() {
///             return Err(TaskError::Canceled);
///         }
///         // do work...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes one invocation of the task until completion or cooperative stop.
    async fn run(&self, stop: StopSignal) -> Result<(), TaskError>;
}
