//! Request and responder types for the bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use waypoint_protocol::{Body, Reply, Route, StatusCode};

/// A unique request identifier.
pub type RequestId = u64;

static ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique request ID.
#[must_use]
pub fn generate_request_id() -> RequestId {
    ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// The reply side of a request.
///
/// Cloned once per matching handler; the first reply wins and later replies
/// are dropped. A request whose responders are all dropped without replying
/// resolves as unavailable.
#[derive(Clone, Default)]
pub struct Responder {
    slot: Option<Arc<Mutex<Option<oneshot::Sender<Reply>>>>>,
}

impl Responder {
    pub(crate) fn new(sender: oneshot::Sender<Reply>) -> Self {
        Self {
            slot: Some(Arc::new(Mutex::new(Some(sender)))),
        }
    }

    /// A responder for fire-and-forget sends. Replies go nowhere.
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    /// Whether a caller is waiting for a reply.
    #[must_use]
    pub fn is_awaited(&self) -> bool {
        self.slot.as_ref().is_some_and(|slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .as_ref()
                .is_some_and(|tx| !tx.is_closed())
        })
    }

    /// Deliver a reply.
    ///
    /// Returns `true` if this reply reached the caller.
    pub fn reply(&self, reply: Reply) -> bool {
        let Some(slot) = &self.slot else {
            return false;
        };
        let sender = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        match sender {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Responder")
            .field("awaited", &self.is_awaited())
            .finish()
    }
}

/// A request delivered to a mounted handler.
#[derive(Debug, Clone)]
pub struct Request {
    /// Unique request identifier.
    pub id: RequestId,
    /// The route the request was addressed to.
    pub to: Route,
    /// Request body.
    pub body: serde_json::Value,
    /// Segments captured by a trailing wildcard in the mount pattern.
    pub params: Route,
    responder: Responder,
}

impl Request {
    pub(crate) fn new(
        to: Route,
        body: serde_json::Value,
        params: Route,
        responder: Responder,
    ) -> Self {
        Self {
            id: generate_request_id(),
            to,
            body,
            params,
            responder,
        }
    }

    /// Reply with status 200.
    pub fn respond(&self, body: impl Into<Body>) -> bool {
        self.responder.reply(Reply::ok(body))
    }

    /// Reply with an explicit status.
    pub fn respond_with(&self, body: impl Into<Body>, status: impl Into<StatusCode>) -> bool {
        self.responder.reply(Reply::new(body, status))
    }

    /// Take a handle for replying later, e.g. from a spawned task.
    #[must_use]
    pub fn responder(&self) -> Responder {
        self.responder.clone()
    }
}
