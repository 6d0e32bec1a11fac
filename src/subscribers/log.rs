//! # Built-in tracing subscriber.
//!
//! [`TraceWriter`] renders lifecycle events through the [`tracing`] facade:
//! failures at error level, drain anomalies at warn, routine transitions at
//! info or debug. Install it when the host has a `tracing` subscriber
//! configured and wants the coordinator's event stream in its logs; for
//! metrics or alerting, implement a custom [`Subscribe`] instead.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Logs every lifecycle event via `tracing`.
#[derive(Debug, Default)]
pub struct TraceWriter;

impl TraceWriter {
    /// Creates the subscriber.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for TraceWriter {
    fn name(&self) -> &'static str {
        "trace_writer"
    }

    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::StopRequested => {
                tracing::info!(seq = e.seq, signal = e.reason.as_deref(), "stop requested");
            }
            EventKind::ProbeServing => {
                tracing::info!(seq = e.seq, addr = e.addr.as_deref(), "liveness probe serving");
            }
            EventKind::ProbeBindFailed => {
                tracing::error!(
                    seq = e.seq,
                    addr = e.addr.as_deref(),
                    error = e.reason.as_deref(),
                    "liveness probe bind failed"
                );
            }
            EventKind::ProbeDrained => {
                tracing::info!(seq = e.seq, error = e.reason.as_deref(), "liveness probe drained");
            }
            EventKind::ProbeDrainTimedOut => {
                tracing::warn!(seq = e.seq, "liveness probe drain timed out");
            }
            EventKind::TaskStarting => {
                tracing::info!(seq = e.seq, task, attempt = e.attempt, "task starting");
            }
            EventKind::TaskCompleted => {
                tracing::info!(
                    seq = e.seq,
                    task,
                    attempt = e.attempt,
                    elapsed_ms = e.elapsed_ms,
                    "task completed"
                );
            }
            EventKind::TaskFailed => {
                tracing::error!(
                    seq = e.seq,
                    task,
                    attempt = e.attempt,
                    elapsed_ms = e.elapsed_ms,
                    error = e.reason.as_deref(),
                    "task failed"
                );
            }
            EventKind::TaskPanicked => {
                tracing::error!(
                    seq = e.seq,
                    task,
                    attempt = e.attempt,
                    elapsed_ms = e.elapsed_ms,
                    panic = e.reason.as_deref(),
                    "task panicked"
                );
            }
            EventKind::RelaunchScheduled => {
                tracing::debug!(
                    seq = e.seq,
                    task,
                    after_attempt = e.attempt,
                    delay_ms = e.delay_ms,
                    "relaunch scheduled"
                );
            }
            EventKind::CleanupFlushed => {
                tracing::debug!(seq = e.seq, count = e.reason.as_deref(), "cleanups flushed");
            }
            EventKind::RunFinished => {
                tracing::info!(seq = e.seq, reason = e.reason.as_deref(), "run finished");
            }
        }
    }
}
