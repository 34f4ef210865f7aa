//! Host adapter: translation between routes and the host's fragment.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;
use waypoint_host::{FragmentChange, Host};
use waypoint_protocol::{fragment, Route};

/// Wraps a [`Host`] with route-level operations.
#[derive(Clone)]
pub struct HostAdapter {
    host: Arc<dyn Host>,
}

impl HostAdapter {
    /// Wrap a host.
    #[must_use]
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { host }
    }

    /// The current fragment without its leading `#`.
    #[must_use]
    pub fn current_fragment(&self) -> String {
        fragment::strip_marker(&self.host.fragment()).to_string()
    }

    /// The current fragment decoded as a route.
    #[must_use]
    pub fn current_route(&self) -> Route {
        fragment::decode(&self.host.fragment())
    }

    /// Push a history entry for `route` unless the fragment already matches.
    ///
    /// Returns `true` if an entry was pushed.
    pub fn push_fragment(&self, route: &Route) -> bool {
        let desired = fragment::encode(route);
        if desired == self.current_fragment() {
            return false;
        }
        trace!(fragment = %desired, "Pushing fragment");
        self.host.push_history_entry(&self.host.pathname(), &desired);
        true
    }

    /// Rewrite the current history entry to show `route`.
    pub fn replace_fragment(&self, route: &Route) {
        let desired = fragment::encode(route);
        trace!(fragment = %desired, "Replacing fragment");
        self.host.replace_history_entry(&desired);
    }

    /// Subscribe to fragment changes the navigator did not make.
    #[must_use]
    pub fn on_fragment_change(&self) -> broadcast::Receiver<FragmentChange> {
        self.host.subscribe()
    }

    /// Name of the wrapped host.
    #[must_use]
    pub fn host_name(&self) -> &'static str {
        self.host.name()
    }
}
