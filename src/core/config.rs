//! # Coordinator configuration.
//!
//! Provides [`Config`], the settings one [`Lifecycle`](crate::Lifecycle)
//! instance is built from. The probe address is the only required input;
//! the rest tunes ambient behavior.
//!
//! ## Sentinel values
//! - `relaunch = 0s` → relaunch immediately in `Forever` mode (no delay)
//! - `bus_capacity` is clamped to a minimum of 1 by the bus

use std::time::Duration;

/// Configuration for one lifecycle instance.
///
/// ## Field semantics
/// - `health_addr`: bind address for the liveness probe
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `relaunch`: delay between successful iterations in `Forever` mode
///   (`0s` = immediate)
#[derive(Clone, Debug)]
pub struct Config {
    /// Bind address for the HTTP liveness probe.
    ///
    /// `"127.0.0.1:0"` picks an ephemeral port; the actual bound address is
    /// published in the `ProbeServing` event.
    pub health_addr: String,

    /// Capacity of the event bus broadcast ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Delay inserted between task iterations in `Forever` mode.
    ///
    /// `Duration::ZERO` relaunches immediately. The sleep is cancelled by
    /// the stop signal.
    pub relaunch: Duration,
}

impl Config {
    /// Returns the relaunch delay as an `Option` (`0s` → `None`).
    #[inline]
    pub fn relaunch_delay(&self) -> Option<Duration> {
        if self.relaunch == Duration::ZERO {
            None
        } else {
            Some(self.relaunch)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `health_addr = "127.0.0.1:8086"` (fixed local probe port)
    /// - `bus_capacity = 1024`
    /// - `relaunch = 0s` (immediate)
    fn default() -> Self {
        Self {
            health_addr: "127.0.0.1:8086".to_string(),
            bus_capacity: 1024,
            relaunch: Duration::ZERO,
        }
    }
}
