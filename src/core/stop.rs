//! # One-shot stop notification.
//!
//! [`StopSignal`] is the single piece of mutable state shared between the
//! signal watcher, the health server, and the guarded task. It wraps a
//! [`CancellationToken`] to get broadcast-on-fire semantics: the first
//! [`fire`](StopSignal::fire) is observed permanently by every clone, and
//! repeated fires are no-ops.
//!
//! ## Rules
//! - **Fire-once**: firing is idempotent; observers cannot tell one fire
//!   from many.
//! - **Broadcast**: every clone and every [`child`](StopSignal::child)
//!   observes the fire; there is no queue and no payload.
//! - **Hierarchy**: a child fires when its parent fires, but firing a child
//!   leaves the parent untouched. The coordinator uses a child as the probe
//!   drain trigger so that "task finished" can drain the probe without
//!   claiming an OS signal arrived.

use tokio_util::sync::CancellationToken;

/// One-shot, broadcast-style shutdown notification.
///
/// Cloning is cheap and all clones observe the same underlying flag.
///
/// # Example
/// ```
/// use liveguard::StopSignal;
///
/// let stop = StopSignal::new();
/// assert!(!stop.fired());
///
/// stop.fire();
/// stop.fire(); // idempotent
/// assert!(stop.fired());
/// assert!(stop.child().fired()); // children observe the parent fire
/// ```
#[derive(Clone, Debug, Default)]
pub struct StopSignal {
    token: CancellationToken,
}

impl StopSignal {
    /// Creates a fresh, unfired signal.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Fires the signal. Safe to call any number of times from any thread.
    pub fn fire(&self) {
        self.token.cancel();
    }

    /// Returns `true` once the signal (or an ancestor) has fired.
    pub fn fired(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Completes when the signal fires. Completes immediately if it already has.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Derives a child signal: fired by the parent, but its own
    /// [`fire`](StopSignal::fire) does not propagate upward.
    pub fn child(&self) -> StopSignal {
        Self {
            token: self.token.child_token(),
        }
    }
}
