//! # Lifecycle: the coordinator for one controlled process start/stop.
//!
//! [`Lifecycle`] races three concurrent activities against each other — the
//! OS signal watcher, the liveness probe's accept loop, and the guarded
//! task — and defines deterministic shutdown ordering on top of a wait
//! primitive that offers no priority between ready events.
//!
//! ## Run modes
//! ```text
//! UntilEitherStops:
//!   spawn probe ─┐
//!   spawn task  ─┼─► select { task done | stop fired } ─► drain probe ─► flush cleanups ─► return
//!   watch stop  ─┘          (loser is discarded)
//!
//! Forever:
//!   spawn probe once, then:
//!   loop {
//!     ├─► stop fired? ─► break            (re-checked at loop top)
//!     ├─► run guarded attempt             (strictly sequential)
//!     └─► optional relaunch delay         (cancellable sleep)
//!   }
//!   drain probe ─► flush cleanups ─► return
//!
//! Once:
//!   run guarded attempt ─► flush cleanups ─► log outcome (with elapsed)
//!     ├─ success ─► Ok(())
//!     └─ failure ─► Err(RuntimeError::OnceFailed)   (no probe loop)
//! ```
//!
//! ## Rules
//! - The select between "task finished" and "stop fired" is fair: when both
//!   are ready, either may win. This non-determinism is inherent and left in
//!   place; the `Forever` loop re-checks the stop signal at the top of every
//!   iteration, so at most one extra task execution can happen after a fire.
//! - A running task invocation is never pre-empted. The stop signal is
//!   delivered to the task, which exits at its own checkpoints; only the
//!   *next* iteration is skipped.
//! - In every mode that started the probe, its join handle is awaited before
//!   control returns to the caller (no leaked listening sockets).
//! - Task errors are logged per iteration in the long-running modes and
//!   never abort the run; only a `Once`-mode failure is escalated, as a
//!   returned error the host is expected to exit non-zero on.

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tokio::time;

use crate::core::cleanup::CleanupStack;
use crate::core::config::Config;
use crate::core::health::HealthServer;
use crate::core::runner;
use crate::core::signals::SignalWatcher;
use crate::core::stop::StopSignal;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::SubscriberSet;
use crate::tasks::TaskRef;

/// Coordinator behavior for one run. Fixed at invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Return as soon as either the guarded task finishes or the stop
    /// signal fires, whichever comes first.
    ///
    /// For exactly-once services that may also be terminated externally.
    UntilEitherStops,

    /// Relaunch the guarded task until the stop signal fires; task
    /// completion alone never ends the run.
    ///
    /// For perpetually re-triggered work such as reconciliation loops.
    Forever,

    /// Invoke the guarded task exactly once and report its outcome; a
    /// failure is escalated to the caller. No probe loop is started.
    Once,
}

/// Coordinates the signal watcher, the liveness probe, and the guarded task.
///
/// Instances are caller-owned and independent; create one per controlled
/// run. Construction goes through [`Lifecycle::builder`].
pub struct Lifecycle {
    /// Runtime configuration.
    pub cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    health: Arc<HealthServer>,
    cleanup: CleanupStack,
}

impl Lifecycle {
    /// Starts building a lifecycle with the given configuration.
    pub fn builder(cfg: Config) -> crate::core::builder::LifecycleBuilder {
        crate::core::builder::LifecycleBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        health: Arc<HealthServer>,
        cleanup: CleanupStack,
    ) -> Self {
        let life = Self {
            cfg,
            bus,
            subs,
            health,
            cleanup,
        };
        life.subscriber_listener();
        life
    }

    /// The event bus; subscribe here for ad-hoc observation (tests, probes
    /// of the probe).
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs `task` in the given mode, stopping on the first terminate-class
    /// OS signal.
    pub async fn run(&self, mode: RunMode, task: TaskRef) -> Result<(), RuntimeError> {
        let stop = SignalWatcher::spawn(self.bus.clone());
        self.run_with_stop(mode, task, stop).await
    }

    /// Like [`run`](Self::run), but with a caller-supplied stop signal
    /// instead of the OS signal watcher.
    ///
    /// Useful for tests and for embedding the coordinator under an outer
    /// shutdown mechanism.
    pub async fn run_with_stop(
        &self,
        mode: RunMode,
        task: TaskRef,
        stop: StopSignal,
    ) -> Result<(), RuntimeError> {
        match mode {
            RunMode::UntilEitherStops => self.run_until_either(task, stop).await,
            RunMode::Forever => self.run_forever(task, stop).await,
            RunMode::Once => self.run_once_mode(task, stop).await,
        }
    }

    /// Subscribes to the bus and forwards events to the subscriber set.
    fn subscriber_listener(&self) {
        use tokio::sync::broadcast::error::RecvError;

        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    async fn run_until_either(&self, task: TaskRef, stop: StopSignal) -> Result<(), RuntimeError> {
        let drain = stop.child();
        let probe = self.spawn_probe(drain.clone());

        // Spawned, not select-dropped: if the stop signal wins the race the
        // invocation keeps running detached and exits at its own checkpoint.
        let work: JoinHandle<()> = {
            let task = Arc::clone(&task);
            let bus = self.bus.clone();
            let guard_stop = stop.clone();
            tokio::spawn(async move {
                runner::run_attempt(task.as_ref(), guard_stop, 1, &bus).await;
            })
        };

        let reason = tokio::select! {
            _ = work => "task finished",
            _ = stop.wait() => "stop signal",
        };
        self.bus
            .publish(Event::new(EventKind::RunFinished).with_reason(reason));

        drain.fire();
        self.join_probe(probe).await;
        self.cleanup.flush(&self.bus);
        Ok(())
    }

    async fn run_forever(&self, task: TaskRef, stop: StopSignal) -> Result<(), RuntimeError> {
        let drain = stop.child();
        let probe = self.spawn_probe(drain.clone());

        let mut attempt: u64 = 0;
        loop {
            // Re-checked before every invocation: the wait primitive has no
            // priority between ready events, so a fire racing a finished
            // task is caught here, bounding extra executions at one.
            if stop.fired() {
                break;
            }
            attempt += 1;
            runner::run_attempt(task.as_ref(), stop.clone(), attempt, &self.bus).await;

            if let Some(delay) = self.cfg.relaunch_delay() {
                if stop.fired() {
                    break;
                }
                self.bus.publish(
                    Event::new(EventKind::RelaunchScheduled)
                        .with_task(task.name())
                        .with_attempt(attempt)
                        .with_delay(delay),
                );
                tokio::select! {
                    _ = time::sleep(delay) => {}
                    _ = stop.wait() => break,
                }
            }
        }

        self.bus
            .publish(Event::new(EventKind::RunFinished).with_reason("stop signal"));

        self.join_probe(probe).await;
        self.cleanup.flush(&self.bus);
        Ok(())
    }

    async fn run_once_mode(&self, task: TaskRef, stop: StopSignal) -> Result<(), RuntimeError> {
        let started = Instant::now();
        let outcome = runner::run_attempt(task.as_ref(), stop, 1, &self.bus).await;
        let elapsed = started.elapsed();

        self.cleanup.flush(&self.bus);
        self.bus
            .publish(Event::new(EventKind::RunFinished).with_reason("task finished"));

        match outcome.into_error() {
            None => {
                tracing::info!(task = task.name(), elapsed = ?elapsed, "one-shot task finished");
                Ok(())
            }
            Some(error) => {
                let args: Vec<String> = std::env::args().collect();
                tracing::error!(
                    task = task.name(),
                    error = %error,
                    args = ?args,
                    elapsed = ?elapsed,
                    "one-shot task failed"
                );
                Err(RuntimeError::OnceFailed {
                    task: task.name().to_string(),
                    error,
                })
            }
        }
    }

    fn spawn_probe(&self, drain: StopSignal) -> JoinHandle<()> {
        let health = Arc::clone(&self.health);
        tokio::spawn(async move { health.serve(drain).await })
    }

    /// Awaited before every return path that started the probe.
    async fn join_probe(&self, probe: JoinHandle<()>) {
        if let Err(err) = probe.await {
            tracing::error!(error = %err, "probe task terminated abnormally");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::health::ProbeState;
    use crate::error::TaskError;
    use crate::tasks::TaskFn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_lifecycle() -> Lifecycle {
        let cfg = Config {
            health_addr: "127.0.0.1:0".to_string(),
            ..Config::default()
        };
        Lifecycle::builder(cfg).build()
    }

    #[tokio::test]
    async fn once_mode_success_returns_ok() {
        let life = test_lifecycle();
        let task = TaskFn::arc("job", |_stop: StopSignal| async { Ok(()) });

        let res = life
            .run_with_stop(RunMode::Once, task, StopSignal::new())
            .await;
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn once_mode_failure_is_escalated() {
        let life = test_lifecycle();
        let task = TaskFn::arc("job", |_stop: StopSignal| async {
            Err(TaskError::Fail {
                error: "disk full".into(),
            })
        });

        let err = life
            .run_with_stop(RunMode::Once, task, StopSignal::new())
            .await
            .expect_err("once-mode failure must be fatal");
        assert_eq!(err.as_label(), "runtime_once_failed");
        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn once_mode_panic_is_escalated_not_propagated() {
        let life = test_lifecycle();
        let task = TaskFn::arc("bomb", |_stop: StopSignal| async { panic!("boom") });

        let err = life
            .run_with_stop(RunMode::Once, task, StopSignal::new())
            .await
            .expect_err("panic must surface as fatal error");
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn forever_mode_zero_iterations_when_stop_precedes_start() {
        let life = test_lifecycle();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = TaskFn::arc("tick", move |_stop: StopSignal| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        let stop = StopSignal::new();
        stop.fire();

        tokio::time::timeout(
            Duration::from_secs(5),
            life.run_with_stop(RunMode::Forever, task, stop),
        )
        .await
        .expect("must return promptly")
        .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(life.health.state(), ProbeState::Stopped);
    }

    #[tokio::test]
    async fn forever_mode_runs_at_most_one_extra_after_stop() {
        let life = test_lifecycle();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        // The task fires the stop signal during its first invocation; the
        // loop-top re-check must prevent any further invocation.
        let task = TaskFn::arc("self-stopping", move |stop: StopSignal| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                stop.fire();
                Ok(())
            }
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            life.run_with_stop(RunMode::Forever, task, StopSignal::new()),
        )
        .await
        .expect("must return promptly")
        .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn forever_mode_relaunches_until_stop() {
        let cfg = Config {
            health_addr: "127.0.0.1:0".to_string(),
            ..Config::default()
        };
        let life = Lifecycle::builder(cfg).build();

        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let task = TaskFn::arc("tick", move |stop: StopSignal| {
            let counter = Arc::clone(&counter);
            async move {
                // Stop after the third completion.
                if counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                    stop.fire();
                }
                Ok(())
            }
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            life.run_with_stop(RunMode::Forever, task, StopSignal::new()),
        )
        .await
        .expect("must return promptly")
        .unwrap();

        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn until_either_returns_when_task_finishes_first() {
        let life = test_lifecycle();
        let task = TaskFn::arc("quick", |_stop: StopSignal| async { Ok(()) });

        tokio::time::timeout(
            Duration::from_secs(5),
            life.run_with_stop(RunMode::UntilEitherStops, task, StopSignal::new()),
        )
        .await
        .expect("task completion must end the run")
        .unwrap();

        // The probe must have fully drained before control came back.
        assert_eq!(life.health.state(), ProbeState::Stopped);
    }

    #[tokio::test]
    async fn until_either_returns_on_stop_with_task_still_running() {
        let life = test_lifecycle();
        let task = TaskFn::arc("patient", |stop: StopSignal| async move {
            stop.wait().await;
            Err(TaskError::Canceled)
        });

        let stop = StopSignal::new();
        let trigger = stop.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.fire();
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            life.run_with_stop(RunMode::UntilEitherStops, task, stop),
        )
        .await
        .expect("stop signal must end the run")
        .unwrap();
        assert_eq!(life.health.state(), ProbeState::Stopped);
    }

    #[tokio::test]
    async fn until_either_swallows_task_panic() {
        let life = test_lifecycle();
        let task = TaskFn::arc("bomb", |_stop: StopSignal| async { panic!("boom") });

        let res = tokio::time::timeout(
            Duration::from_secs(5),
            life.run_with_stop(RunMode::UntilEitherStops, task, StopSignal::new()),
        )
        .await
        .expect("panicking task must still end the run");
        assert!(res.is_ok());
        assert_eq!(life.health.state(), ProbeState::Stopped);
    }

    #[tokio::test]
    async fn cleanups_flush_once_after_the_run() {
        let cfg = Config {
            health_addr: "127.0.0.1:0".to_string(),
            ..Config::default()
        };
        let flushed = Arc::new(AtomicUsize::new(0));
        let marker = Arc::clone(&flushed);
        let life = Lifecycle::builder(cfg)
            .with_cleanup(move || {
                marker.fetch_add(1, Ordering::SeqCst);
            })
            .build();

        let task = TaskFn::arc("job", |_stop: StopSignal| async { Ok(()) });
        life.run_with_stop(RunMode::Once, task, StopSignal::new())
            .await
            .unwrap();

        assert_eq!(flushed.load(Ordering::SeqCst), 1);
    }
}
