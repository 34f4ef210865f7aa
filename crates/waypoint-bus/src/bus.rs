//! In-process message bus for Waypoint.
//!
//! The bus resolves a route to mounted handlers and carries requests and
//! replies between them. It is the substrate the navigator asks for
//! applications.

use crate::message::{Request, Responder};
use crate::pattern::{validate_pattern, Pattern};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, trace, warn};
use waypoint_protocol::{Reply, Route};

/// Bus errors.
#[derive(Debug, Error)]
pub enum BusError {
    /// Invalid mount pattern.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(&'static str),

    /// Maximum number of mounted handlers reached.
    #[error("Maximum mounts reached")]
    MaxMountsReached,
}

/// Bus configuration.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Maximum number of mounted handlers across all patterns.
    pub max_mounts: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_mounts: 10_000,
        }
    }
}

/// Identifies a mounted handler.
pub type MountId = u64;

type Handler = Arc<dyn Fn(Request) + Send + Sync>;

/// A handler mounted under a pattern.
struct Mount {
    id: MountId,
    pattern: Pattern,
    handler: Handler,
    once: bool,
}

/// The message bus.
///
/// Handlers are plain synchronous callbacks. A handler that needs to reply
/// later keeps the request's [`Responder`] and replies from its own task.
pub struct Bus {
    /// Mounts indexed by their pattern route.
    mounts: DashMap<Route, Vec<Mount>>,
    /// Next mount identifier.
    next_id: AtomicU64,
    /// Configuration.
    config: BusConfig,
}

impl Bus {
    /// Create a new bus with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BusConfig::default())
    }

    /// Create a new bus with custom configuration.
    #[must_use]
    pub fn with_config(config: BusConfig) -> Self {
        info!("Creating bus with config: {:?}", config);
        Self {
            mounts: DashMap::new(),
            next_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get bus statistics.
    #[must_use]
    pub fn stats(&self) -> BusStats {
        BusStats {
            pattern_count: self.mounts.len(),
            handler_count: self.mounts.iter().map(|m| m.len()).sum(),
        }
    }

    /// Mount a handler under `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or limits are exceeded.
    pub fn mount<F>(&self, pattern: impl Into<Route>, handler: F) -> Result<MountId, BusError>
    where
        F: Fn(Request) + Send + Sync + 'static,
    {
        self.insert(pattern.into(), Arc::new(handler), false)
    }

    /// Mount a handler that is removed after it fires once.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is invalid or limits are exceeded.
    pub fn once<F>(&self, pattern: impl Into<Route>, handler: F) -> Result<MountId, BusError>
    where
        F: Fn(Request) + Send + Sync + 'static,
    {
        self.insert(pattern.into(), Arc::new(handler), true)
    }

    fn insert(&self, route: Route, handler: Handler, once: bool) -> Result<MountId, BusError> {
        validate_pattern(&route).map_err(BusError::InvalidPattern)?;

        if self.stats().handler_count >= self.config.max_mounts {
            return Err(BusError::MaxMountsReached);
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pattern = Pattern::new(&route);
        debug!(pattern = %route, mount = id, once, "Mounted handler");
        self.mounts.entry(route).or_default().push(Mount {
            id,
            pattern,
            handler,
            once,
        });
        Ok(id)
    }

    /// Remove every handler mounted under exactly `pattern`.
    ///
    /// Returns the number of handlers removed.
    pub fn unmount(&self, pattern: &Route) -> usize {
        let removed = self.mounts.remove(pattern).map_or(0, |(_, m)| m.len());
        debug!(pattern = %pattern, removed, "Unmounted");
        removed
    }

    /// Remove a single handler by id.
    pub fn unmount_id(&self, id: MountId) -> bool {
        let mut removed = false;
        self.mounts.retain(|_, mounts| {
            let before = mounts.len();
            mounts.retain(|m| m.id != id);
            removed |= mounts.len() != before;
            !mounts.is_empty()
        });
        removed
    }

    /// Check whether any handler matches `route`.
    #[must_use]
    pub fn is_mounted(&self, route: &Route) -> bool {
        self.mounts
            .iter()
            .any(|e| e.iter().any(|m| m.pattern.captures(route).is_some()))
    }

    /// Deliver a request to every matching handler.
    ///
    /// Returns the number of handlers invoked.
    fn dispatch(&self, to: &Route, body: &serde_json::Value, responder: &Responder) -> usize {
        let mut matched: Vec<(Handler, Route)> = Vec::new();
        let mut fired_once: Vec<MountId> = Vec::new();

        for entry in &self.mounts {
            for mount in entry.iter() {
                if let Some(params) = mount.pattern.captures(to) {
                    matched.push((mount.handler.clone(), params));
                    if mount.once {
                        fired_once.push(mount.id);
                    }
                }
            }
        }

        // Handlers may mount, unmount or send re-entrantly, so no map guard
        // is held while they run.
        for id in fired_once {
            self.unmount_id(id);
        }

        let count = matched.len();
        for (handler, params) in matched {
            handler(Request::new(to.clone(), body.clone(), params, responder.clone()));
        }
        count
    }

    /// Send a message without waiting for a reply.
    ///
    /// Returns the number of handlers that received it.
    pub fn send(&self, to: &Route, body: serde_json::Value) -> usize {
        let count = self.dispatch(to, &body, &Responder::detached());
        trace!(to = %to, recipients = count, "Sent message");
        count
    }

    /// Send a request and wait up to `timeout` for the first reply.
    ///
    /// Never fails: an unmatched route or a request whose handlers all drop
    /// their responder resolves as 503, and an expired timeout as 408.
    pub async fn request(&self, to: &Route, body: serde_json::Value, timeout: Duration) -> Reply {
        let (tx, rx) = oneshot::channel();
        let responder = Responder::new(tx);
        let count = self.dispatch(to, &body, &responder);
        drop(responder);

        if count == 0 {
            warn!(to = %to, "Request to unmounted route");
            return Reply::unavailable();
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(reply)) => {
                trace!(to = %to, status = %reply.status, "Reply received");
                reply
            }
            Ok(Err(_)) => {
                debug!(to = %to, "Handlers dropped the request without replying");
                Reply::unavailable()
            }
            Err(_) => {
                debug!(to = %to, ?timeout, "Request timed out");
                Reply::timeout()
            }
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// Bus statistics.
#[derive(Debug, Clone)]
pub struct BusStats {
    /// Number of distinct mount patterns.
    pub pattern_count: usize,
    /// Total number of mounted handlers.
    pub handler_count: usize,
}
