//! # Cross-platform OS signal watching.
//!
//! [`SignalWatcher`] subscribes to the terminate-class signals and converts
//! the first delivery into a [`StopSignal`] fire.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGHUP` (terminal hangup / daemon reload convention)
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//! - `SIGUSR1` / `SIGUSR2` (user-defined, treated as terminate here)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]
//!
//! ## Rules
//! - The returned [`StopSignal`] fires exactly once, on the first matching
//!   delivery; later signals for the same run are not specially handled.
//! - Watching cannot fail from the caller's perspective: if listener
//!   registration fails the error is logged and the signal simply never
//!   fires (the process then runs until task completion instead).

use crate::core::stop::StopSignal;
use crate::events::{Bus, Event, EventKind};

/// Spawns a background listener that fires a [`StopSignal`] on the first
/// terminate-class OS signal.
pub struct SignalWatcher;

impl SignalWatcher {
    /// Starts watching and returns the stop signal to observe.
    ///
    /// Publishes [`EventKind::StopRequested`] (with the signal name) when a
    /// signal arrives. Each call creates independent listeners.
    pub fn spawn(bus: Bus) -> StopSignal {
        let stop = StopSignal::new();
        let fired = stop.clone();

        tokio::spawn(async move {
            match wait_for_stop_signal().await {
                Ok(name) => {
                    tracing::info!(signal = name, "termination signal received");
                    bus.publish(Event::new(EventKind::StopRequested).with_reason(name));
                    fired.fire();
                }
                Err(err) => {
                    // Never escalated: the run simply loses external stop.
                    tracing::error!(error = %err, "signal listener registration failed");
                }
            }
        });

        stop
    }
}

/// Waits for a termination signal; returns the name of the signal observed.
#[cfg(unix)]
async fn wait_for_stop_signal() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;
    let mut sigusr1 = signal(SignalKind::user_defined1())?;
    let mut sigusr2 = signal(SignalKind::user_defined2())?;

    let name = tokio::select! {
        _ = sighup.recv()  => "SIGHUP",
        _ = sigint.recv()  => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
        _ = sigquit.recv() => "SIGQUIT",
        _ = sigusr1.recv() => "SIGUSR1",
        _ = sigusr2.recv() => "SIGUSR2",
    };
    Ok(name)
}

/// Waits for a termination signal; returns the name of the signal observed.
#[cfg(not(unix))]
async fn wait_for_stop_signal() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("CTRL_C")
}
