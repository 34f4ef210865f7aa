//! The navigator: wiring between host, scheduler, interpreter and lifecycle.

use crate::config::NavigatorConfig;
use crate::error::{NavigationError, NavigationReport};
use crate::host::HostAdapter;
use crate::interpret::run_transition;
use crate::lifecycle::Lifecycle;
use crate::metrics;
use crate::scheduler::{Scheduler, Token, Transition};
use crate::substrate::Substrate;
use serde_json::json;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use waypoint_bus::{Bus, BusError, MountId, Request, WILDCARD};
use waypoint_host::{FragmentChange, Host};
use waypoint_protocol::{fragment, Route};

/// Report broadcast capacity.
const REPORT_CAPACITY: usize = 64;

/// Bus route prefix for navigation requests.
pub const NAVIGATE_SEGMENT: &str = "navigate";

/// Bus route prefix for error reports.
pub const ERROR_SEGMENT: &str = "error";

/// State shared by the navigator, its worker and its listeners.
pub(crate) struct Shared {
    pub(crate) config: NavigatorConfig,
    pub(crate) host: HostAdapter,
    pub(crate) substrate: Arc<dyn Substrate>,
    pub(crate) scheduler: Scheduler,
    reports: broadcast::Sender<NavigationReport>,
    /// Serializes fragment push + token mint so they happen as one step.
    accepting: Mutex<()>,
}

impl Shared {
    /// Accept a navigation: show it in the address bar, supersede whatever
    /// was current, queue it.
    pub(crate) fn accept(&self, target: Route, hops: u32) -> Token {
        let _guard = self
            .accepting
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.accept_locked(target, hops)
    }

    /// Rewrite the current entry to `target` and accept it, but only while
    /// `from` is still current. Returns `None` if `from` was superseded.
    ///
    /// The check and the rewrite happen under the same lock as
    /// [`Shared::accept`], so a navigation accepted in between is never
    /// overwritten.
    pub(crate) fn redirect_if_current(
        &self,
        from: Token,
        target: Route,
        hops: u32,
    ) -> Option<Token> {
        let _guard = self
            .accepting
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !self.scheduler.is_current(from) {
            return None;
        }
        self.host.replace_fragment(&target);
        Some(self.accept_locked(target, hops))
    }

    fn accept_locked(&self, target: Route, hops: u32) -> Token {
        self.host.push_fragment(&target);
        metrics::record_transition();
        self.scheduler.enqueue(target, hops)
    }

    /// Navigate to `route`; the empty route means the index.
    pub(crate) fn navigate(&self, route: Route) -> Token {
        let target = if route.is_empty() {
            self.config.index_route.clone()
        } else {
            route
        };
        self.accept(target, 0)
    }

    /// Navigate to whatever `raw` fragment names.
    ///
    /// An empty fragment rewrites the current entry to the index instead of
    /// pushing a second one, so "back" does not bounce through it.
    pub(crate) fn navigate_fragment(&self, raw: &str) -> Token {
        let route = fragment::decode(raw);
        if route.is_empty() {
            let index = self.config.index_route.clone();
            self.host.replace_fragment(&index);
            self.accept(index, 0)
        } else {
            self.accept(route, 0)
        }
    }

    /// Report an error locally. Never fails, with or without listeners.
    pub(crate) fn report(&self, target: &Route, error: NavigationError) {
        if error.is_terminal() {
            error!(route = %target, %error, "Navigation failed");
        } else {
            warn!(route = %target, %error, "Navigation error");
        }
        metrics::record_report(error.kind());

        let route = Route::from([ERROR_SEGMENT, NAVIGATE_SEGMENT]).concat(target);
        self.substrate.send(
            &route,
            json!({ "message": error.to_string(), "target": target }),
        );

        let report = NavigationReport {
            target: target.clone(),
            error,
        };
        self.reports.send(report).unwrap_or_default();
    }
}

/// Drain the transition queue, one transition at a time.
async fn run_worker(shared: Arc<Shared>, mut queue: mpsc::UnboundedReceiver<Transition>) {
    let mut lifecycle = Lifecycle::new(shared.config.clean_page.clone());
    while let Some(transition) = queue.recv().await {
        run_transition(&shared, &mut lifecycle, transition).await;
    }
    debug!("Transition queue closed");
    lifecycle.close().await;
}

/// Forward host fragment changes into the scheduler.
async fn run_listener(shared: Arc<Shared>, mut changes: broadcast::Receiver<FragmentChange>) {
    loop {
        match changes.recv().await {
            Ok(change) => {
                debug!(%change, "Fragment change");
                shared.navigate_fragment(&change.new);
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "Fragment listener lagged; resyncing to current fragment");
                let current = shared.host.current_fragment();
                shared.navigate_fragment(&current);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

struct Inner {
    shared: Arc<Shared>,
    pending: Mutex<Option<mpsc::UnboundedReceiver<Transition>>>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        // The worker finishes what is queued, closes the running
        // application and exits on its own.
        self.shared.scheduler.close();
        let listener = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(listener) = listener.take() {
            listener.abort();
        }
    }
}

/// Client-side navigation coordinator.
///
/// Maps the host's address fragment to an application resolved through the
/// substrate, and guarantees that exactly one application is current:
/// stale replies are discarded, the previous application is fully closed
/// before the next starts, and redirects never loop at the index.
///
/// Cloning is cheap; clones share the same state. When the last clone is
/// dropped the navigator stops listening, and the running application is
/// closed once the transitions already queued have run.
#[derive(Clone)]
pub struct Navigator {
    inner: Arc<Inner>,
}

impl Navigator {
    /// Create a navigator. Nothing happens until [`Navigator::start`].
    #[must_use]
    pub fn new(
        host: Arc<dyn Host>,
        substrate: Arc<dyn Substrate>,
        config: NavigatorConfig,
    ) -> Self {
        info!("Creating navigator with config: {:?}", config);
        let (scheduler, queue) = Scheduler::new();
        let (reports, _) = broadcast::channel(REPORT_CAPACITY);
        let shared = Arc::new(Shared {
            config,
            host: HostAdapter::new(host),
            substrate,
            scheduler,
            reports,
            accepting: Mutex::new(()),
        });
        Self {
            inner: Arc::new(Inner {
                shared,
                pending: Mutex::new(Some(queue)),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Subscribe to fragment changes and perform the initial navigation.
    ///
    /// Must be called from within a Tokio runtime. Returns `false` if the
    /// navigator was already started.
    pub fn start(&self) -> bool {
        let queue = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(queue) = queue else {
            warn!("Navigator already started");
            return false;
        };

        let shared = &self.inner.shared;
        let changes = shared.host.on_fragment_change();
        tokio::spawn(run_worker(shared.clone(), queue));
        let listener = tokio::spawn(run_listener(shared.clone(), changes));
        *self
            .inner
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(listener);

        info!(host = shared.host.host_name(), "Navigator started");
        let current = shared.host.current_fragment();
        shared.navigate_fragment(&current);
        true
    }

    /// Navigate to `route`. The empty route navigates to the index.
    pub fn navigate(&self, route: impl Into<Route>) -> Token {
        self.inner.shared.navigate(route.into())
    }

    /// A lightweight handle for navigating from inside applications.
    #[must_use]
    pub fn handle(&self) -> NavigatorHandle {
        NavigatorHandle {
            shared: Arc::downgrade(&self.inner.shared),
        }
    }

    /// Subscribe to locally reported errors.
    #[must_use]
    pub fn reports(&self) -> broadcast::Receiver<NavigationReport> {
        self.inner.shared.reports.subscribe()
    }

    /// Mount `navigate/**` on `bus`, so any bus client can navigate by
    /// sending to `navigate/<route>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus refuses the mount.
    pub fn mount_on(&self, bus: &Bus) -> Result<MountId, BusError> {
        let handle = self.handle();
        bus.mount([NAVIGATE_SEGMENT, WILDCARD], move |req: Request| {
            handle.navigate(req.params);
        })
    }

    /// The route currently shown in the address bar.
    #[must_use]
    pub fn current_route(&self) -> Route {
        self.inner.shared.host.current_route()
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &NavigatorConfig {
        &self.inner.shared.config
    }
}

/// Weak navigation handle.
///
/// Does not keep the navigator alive; navigating after it is gone is a
/// no-op.
#[derive(Clone)]
pub struct NavigatorHandle {
    shared: Weak<Shared>,
}

impl NavigatorHandle {
    /// Navigate to `route`. Returns `None` if the navigator is gone.
    pub fn navigate(&self, route: impl Into<Route>) -> Option<Token> {
        let shared = self.shared.upgrade()?;
        Some(shared.navigate(route.into()))
    }
}

impl std::fmt::Debug for NavigatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigatorHandle")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_host::MemoryHost;

    fn navigator(host: &Arc<MemoryHost>) -> Navigator {
        Navigator::new(host.clone(), Arc::new(Bus::new()), NavigatorConfig::default())
    }

    #[tokio::test]
    async fn test_stale_redirect_leaves_history_alone() {
        let host = Arc::new(MemoryHost::new("somepage#here"));
        let navigator = navigator(&host);
        let shared = &navigator.inner.shared;

        let stale = shared.navigate(Route::from(["here"]));
        let current = shared.navigate(Route::from(["there"]));
        assert_eq!(host.address(), "somepage#there");

        assert!(shared
            .redirect_if_current(stale, Route::from(["elsewhere"]), 1)
            .is_none());
        assert_eq!(host.address(), "somepage#there");
        assert!(shared.scheduler.is_current(current));

        let next = shared
            .redirect_if_current(current, Route::from(["moved"]), 1)
            .unwrap();
        assert!(shared.scheduler.is_current(next));
        assert_eq!(
            host.entries(),
            vec!["somepage#here".to_string(), "somepage#moved".to_string()]
        );
    }

    #[tokio::test]
    async fn test_report_reaches_subscribers() {
        let host = Arc::new(MemoryHost::new("somepage#here"));
        let navigator = navigator(&host);
        let mut reports = navigator.reports();

        navigator
            .inner
            .shared
            .report(&Route::from(["here"]), NavigationError::NoErrorHandler);
        let report = reports.recv().await.unwrap();
        assert_eq!(report.target, Route::from(["here"]));
        assert_eq!(report.error, NavigationError::NoErrorHandler);
    }
}
