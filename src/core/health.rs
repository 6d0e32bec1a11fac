//! # HTTP liveness probe server.
//!
//! [`HealthServer`] binds an axum listener at the configured address and
//! answers any request, any method, any path with `200 OK` while serving and
//! `503 Service Unavailable` once draining has begun.
//!
//! ## Rules
//! - The probe is advisory: bind and shutdown failures are logged and
//!   published, never escalated — a broken health endpoint must not abort
//!   the primary task. A bind failure therefore surfaces asynchronously
//!   (event + log) rather than failing the caller of [`serve`](HealthServer::serve).
//! - On stop the server drains in-flight requests, bounded by a hard
//!   10-second timeout ([`DRAIN_TIMEOUT`]).
//! - One instance serves at most once: duplicate concurrent `serve` calls
//!   are no-ops, only the first binds and listens.
//! - The listener is owned exclusively by the serving future; it is released
//!   before `serve` returns (no leaked sockets).

use std::future::IntoFuture;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tokio::time;

use crate::core::stop::StopSignal;
use crate::events::{Bus, Event, EventKind};

/// Hard bound on graceful drain after the stop signal fires.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Probe lifecycle state, as reported to liveness callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// Listener bound, probe answers `200 OK`.
    Serving,
    /// Stop observed; finishing in-flight requests, probe answers `503`.
    Draining,
    /// Listener released (or never bound).
    Stopped,
}

/// Shared probe state flag, readable from the request handler.
#[derive(Debug)]
pub(crate) struct ProbeFlag(AtomicU8);

impl ProbeFlag {
    const SERVING: u8 = 0;
    const DRAINING: u8 = 1;
    const STOPPED: u8 = 2;

    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Self::STOPPED))
    }

    pub(crate) fn set(&self, state: ProbeState) {
        let v = match state {
            ProbeState::Serving => Self::SERVING,
            ProbeState::Draining => Self::DRAINING,
            ProbeState::Stopped => Self::STOPPED,
        };
        self.0.store(v, Ordering::SeqCst);
    }

    pub(crate) fn get(&self) -> ProbeState {
        match self.0.load(Ordering::SeqCst) {
            Self::SERVING => ProbeState::Serving,
            Self::DRAINING => ProbeState::Draining,
            _ => ProbeState::Stopped,
        }
    }
}

/// Liveness probe server bound to one address.
pub struct HealthServer {
    addr: String,
    bus: Bus,
    started: AtomicBool,
    flag: Arc<ProbeFlag>,
}

impl HealthServer {
    /// Creates a server for `addr`; nothing is bound until [`serve`](Self::serve).
    pub fn new(addr: impl Into<String>, bus: Bus) -> Self {
        Self {
            addr: addr.into(),
            bus,
            started: AtomicBool::new(false),
            flag: Arc::new(ProbeFlag::new()),
        }
    }

    /// Current probe state.
    pub fn state(&self) -> ProbeState {
        self.flag.get()
    }

    /// Configured bind address.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Binds and serves the probe until `stop` fires, then drains.
    ///
    /// Blocks the calling future for the whole probe lifetime; run it on its
    /// own spawned task. All failures are logged/published, none returned.
    pub async fn serve(&self, stop: StopSignal) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!(addr = %self.addr, "probe already started; ignoring duplicate serve");
            return;
        }

        let listener = match TcpListener::bind(&self.addr).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(addr = %self.addr, error = %err, "liveness probe bind failed");
                self.bus.publish(
                    Event::new(EventKind::ProbeBindFailed)
                        .with_addr(self.addr.as_str())
                        .with_reason(err.to_string()),
                );
                self.flag.set(ProbeState::Stopped);
                return;
            }
        };

        let bound = listener
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| self.addr.clone());
        self.flag.set(ProbeState::Serving);
        tracing::info!(addr = %bound, "liveness probe serving");
        self.bus
            .publish(Event::new(EventKind::ProbeServing).with_addr(bound));

        let shutdown = stop.clone();
        let serve = axum::serve(listener, router(Arc::clone(&self.flag)))
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .into_future();
        tokio::pin!(serve);

        tokio::select! {
            res = &mut serve => {
                // Completed on its own: either the stop raced us through the
                // graceful path already, or the accept loop died.
                match res {
                    Ok(()) if stop.fired() => {
                        self.bus.publish(Event::new(EventKind::ProbeDrained));
                    }
                    Ok(()) => {}
                    Err(err) => {
                        tracing::error!(error = %err, "liveness probe stopped with error");
                    }
                }
            }
            _ = stop.wait() => {
                self.flag.set(ProbeState::Draining);
                match time::timeout(DRAIN_TIMEOUT, &mut serve).await {
                    Ok(Ok(())) => {
                        self.bus.publish(Event::new(EventKind::ProbeDrained));
                    }
                    Ok(Err(err)) => {
                        tracing::error!(error = %err, "liveness probe graceful stop failed");
                        self.bus.publish(
                            Event::new(EventKind::ProbeDrained).with_reason(err.to_string()),
                        );
                    }
                    Err(_elapsed) => {
                        tracing::warn!(timeout = ?DRAIN_TIMEOUT, "liveness probe drain timed out");
                        self.bus.publish(Event::new(EventKind::ProbeDrainTimedOut));
                    }
                }
            }
        }

        self.flag.set(ProbeState::Stopped);
        tracing::debug!(addr = %self.addr, "liveness probe stopped");
    }
}

/// Builds the probe router: every method and path maps to the state check.
pub(crate) fn router(flag: Arc<ProbeFlag>) -> Router {
    Router::new().fallback(probe).with_state(flag)
}

async fn probe(State(flag): State<Arc<ProbeFlag>>) -> StatusCode {
    match flag.get() {
        ProbeState::Serving => StatusCode::OK,
        ProbeState::Draining | ProbeState::Stopped => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn probe_answers_by_state_for_any_method_and_path() {
        let flag = Arc::new(ProbeFlag::new());
        flag.set(ProbeState::Serving);

        for (method, path) in [("GET", "/"), ("POST", "/healthz"), ("DELETE", "/a/b/c")] {
            let req = Request::builder()
                .method(method)
                .uri(path)
                .body(Body::empty())
                .unwrap();
            let res = router(Arc::clone(&flag)).oneshot(req).await.unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{method} {path}");
        }

        flag.set(ProbeState::Draining);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let res = router(Arc::clone(&flag)).oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn serve_drains_promptly_when_stop_already_fired() {
        let bus = Bus::new(16);
        let server = HealthServer::new("127.0.0.1:0", bus);
        let stop = StopSignal::new();
        stop.fire();

        time::timeout(Duration::from_secs(5), server.serve(stop))
            .await
            .expect("pre-fired stop must not hang the probe");
        assert_eq!(server.state(), ProbeState::Stopped);
    }

    #[tokio::test]
    async fn bind_failure_is_published_not_returned() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();

        // Occupy a port, then ask the probe to bind the same one.
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();

        let server = HealthServer::new(addr, bus);
        let stop = StopSignal::new();
        server.serve(stop).await; // returns without error

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::ProbeBindFailed);
        assert!(ev.reason.is_some());
        assert_eq!(server.state(), ProbeState::Stopped);
    }

    #[tokio::test]
    async fn duplicate_serve_is_a_no_op() {
        let bus = Bus::new(16);
        let server = Arc::new(HealthServer::new("127.0.0.1:0", bus));
        let stop = StopSignal::new();

        let first = {
            let server = Arc::clone(&server);
            let stop = stop.clone();
            tokio::spawn(async move { server.serve(stop).await })
        };

        // Wait for the first call to claim the start guard and bind.
        time::timeout(Duration::from_secs(5), async {
            while server.state() != ProbeState::Serving {
                time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("first serve should reach Serving");

        // Second call must return immediately instead of binding again.
        server.serve(stop.clone()).await;
        assert_eq!(server.state(), ProbeState::Serving);

        stop.fire();
        first.await.unwrap();
        assert_eq!(server.state(), ProbeState::Stopped);
    }
}
