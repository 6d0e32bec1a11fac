//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(StopSignal) -> Fut`, producing a fresh
//! future per invocation. Every relaunch in
//! [`Forever`](crate::RunMode::Forever) mode therefore starts from the
//! closure again with no hidden mutable state; if shared state is needed,
//! capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use liveguard::{StopSignal, Task, TaskError, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::arc("worker", |stop: StopSignal| async move {
//!     if stop.fired() {
//!         return Err(TaskError::Canceled);
//!     }
//!     // do work...
//!     Ok(())
//! });
//!
//! assert_eq!(t.name(), "worker");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::core::StopSignal;
use crate::error::TaskError;
use crate::tasks::task::Task;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per invocation.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle (`Arc<Self>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(StopSignal) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, stop: StopSignal) -> Result<(), TaskError> {
        (self.f)(stop).await
    }
}
