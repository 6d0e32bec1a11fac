//! # Builder for [`Lifecycle`] instances.
//!
//! Collects subscribers and cleanup closers up front, then wires the event
//! bus, the fan-out set, and the health server together. Cleanup
//! registration is an explicit, statically-typed list gathered here at
//! construction time; there is no global registry.

use std::sync::Arc;

use crate::core::cleanup::CleanupStack;
use crate::core::config::Config;
use crate::core::health::HealthServer;
use crate::core::lifecycle::Lifecycle;
use crate::events::Bus;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Builder for constructing a [`Lifecycle`] with optional features.
pub struct LifecycleBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    cleanups: Vec<Box<dyn FnOnce() + Send>>,
}

impl LifecycleBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            cleanups: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive lifecycle events (probe transitions, task
    /// outcomes, stop requests) through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one event subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Registers a cleanup closer, run once after the run finishes.
    ///
    /// Closers run in registration order. Anything that needs error
    /// reporting should log inside the closure.
    pub fn with_cleanup(mut self, f: impl FnOnce() + Send + 'static) -> Self {
        self.cleanups.push(Box::new(f));
        self
    }

    /// Builds the [`Lifecycle`] instance.
    ///
    /// Spawns the subscriber fan-out workers, so this must be called from
    /// within a tokio runtime.
    pub fn build(self) -> Lifecycle {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(self.subscribers));
        let health = Arc::new(HealthServer::new(self.cfg.health_addr.clone(), bus.clone()));
        let cleanup = CleanupStack::new(self.cleanups);

        Lifecycle::new_internal(self.cfg, bus, subs, health, cleanup)
    }
}
