//! Task abstractions: the [`Task`] trait, shared [`TaskRef`] handle, and the
//! [`TaskFn`] closure adapter.

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
