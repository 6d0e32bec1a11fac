//! Coordinator internals: run modes, stop signal, signal watcher, liveness
//! probe, crash guard, and cleanup registration.

mod builder;
mod cleanup;
mod config;
mod guard;
mod health;
mod lifecycle;
mod runner;
mod signals;
mod stop;

pub use builder::LifecycleBuilder;
pub use config::Config;
pub use guard::{run_guarded, TaskOutcome};
pub use health::{HealthServer, ProbeState, DRAIN_TIMEOUT};
pub use lifecycle::{Lifecycle, RunMode};
pub use signals::SignalWatcher;
pub use stop::StopSignal;
