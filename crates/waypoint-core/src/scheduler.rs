//! Transition scheduling.
//!
//! Every accepted navigation mints a fresh token and supersedes the one
//! before it. Transitions then run one at a time off a single queue, so a
//! transition's request is only issued after the previous transition's
//! whole link (reply handling, teardown, start) has finished.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use waypoint_protocol::Route;

/// Freshness token of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(u64);

impl Token {
    /// The raw token value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One accepted navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Subroute to resolve under the application route.
    pub target: Route,
    /// Freshness token.
    pub token: Token,
    /// Number of redirects followed to reach this transition.
    pub hops: u32,
}

/// Mints tokens and feeds the transition queue.
pub struct Scheduler {
    current: AtomicU64,
    queue: Mutex<Option<mpsc::UnboundedSender<Transition>>>,
}

impl Scheduler {
    /// Create a scheduler and the receiving end of its queue.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Transition>) {
        let (queue, rx) = mpsc::unbounded_channel();
        (
            Self {
                current: AtomicU64::new(0),
                queue: Mutex::new(Some(queue)),
            },
            rx,
        )
    }

    /// Supersede the current transition and enqueue a new one.
    pub fn enqueue(&self, target: Route, hops: u32) -> Token {
        let token = Token(self.current.fetch_add(1, Ordering::SeqCst) + 1);
        debug!(%token, route = %target, hops, "Transition accepted");
        let queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let sent = queue.as_ref().is_some_and(|queue| {
            queue
                .send(Transition {
                    target,
                    token,
                    hops,
                })
                .is_ok()
        });
        if !sent {
            warn!(%token, "Transition queue closed; navigator is shut down");
        }
        token
    }

    /// Whether `token` still belongs to the most recently accepted transition.
    #[must_use]
    pub fn is_current(&self, token: Token) -> bool {
        self.current.load(Ordering::SeqCst) == token.0
    }

    /// Close the queue. Transitions already queued still run; later ones
    /// are dropped.
    pub fn close(&self) {
        if self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
        {
            debug!("Transition queue closing");
        }
    }
}
