//! # liveguard
//!
//! **liveguard** is a process lifecycle coordinator: it runs one long-lived
//! unit of work beside an HTTP liveness probe, stops both cleanly on an OS
//! termination signal, and guarantees that a panicking task never takes the
//! probe down or leaves the process in an inconsistent state.
//!
//! ## Architecture
//! ```text
//!       ┌───────────────┐    ┌───────────────┐    ┌───────────────┐
//!       │ SignalWatcher │    │  HealthServer │    │  guarded task │
//!       │ (OS signals)  │    │ (liveness 200)│    │ (crash guard) │
//!       └───────┬───────┘    └───────┬───────┘    └───────┬───────┘
//!               │ fire StopSignal    │ drain on stop      │ TaskOutcome
//!               ▼                    ▼                    ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Lifecycle (coordinator)                                          │
//! │  - RunMode: UntilEitherStops / Forever / Once                     │
//! │  - Bus (broadcast events) ──► SubscriberSet ──► Subscribe impls   │
//! │  - CleanupStack (closers flushed once, after probe drain)         │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The stop signal is the only mutable state shared across the three
//! activities: a one-shot broadcast that every observer sees permanently
//! once fired. The probe drains within a hard 10-second bound and its
//! listener is always released before the coordinator returns.
//!
//! ## Run modes
//! | Mode                        | Ends when                           | Task failure policy       |
//! |-----------------------------|-------------------------------------|---------------------------|
//! | [`RunMode::UntilEitherStops`] | task finishes *or* stop fires     | logged, run continues out |
//! | [`RunMode::Forever`]        | stop fires (completion relaunches)  | logged per iteration      |
//! | [`RunMode::Once`]           | the single invocation returns       | escalated to the caller   |
//!
//! ## Example
//! ```no_run
//! use liveguard::{Config, Lifecycle, RunMode, StopSignal, TaskFn, TaskRef, TraceWriter};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let worker: TaskRef = TaskFn::arc("worker", |stop: StopSignal| async move {
//!         while !stop.fired() {
//!             // do work...
//!             tokio::time::sleep(Duration::from_millis(250)).await;
//!         }
//!         Ok(())
//!     });
//!
//!     let life = Lifecycle::builder(Config::default())
//!         .with_subscriber(Arc::new(TraceWriter::new()))
//!         .build();
//!
//!     // Serves the probe, watches for SIGTERM & friends, relaunches the
//!     // worker until a signal arrives, then drains and returns.
//!     life.run(RunMode::Forever, worker).await?;
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{
    run_guarded, Config, HealthServer, Lifecycle, LifecycleBuilder, ProbeState, RunMode,
    SignalWatcher, StopSignal, TaskOutcome, DRAIN_TIMEOUT,
};
pub use error::{RuntimeError, TaskError};
pub use events::{Bus, Event, EventKind};
pub use subscribers::{Subscribe, SubscriberSet, TraceWriter};
pub use tasks::{Task, TaskFn, TaskRef};
