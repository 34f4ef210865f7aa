//! In-memory browsing host.
//!
//! Keeps a session history the way a browser window does: a stack of
//! entries with a cursor, so back and forward move between them. Useful for
//! tests, headless runs and the demo binary.

use crate::traits::{FragmentChange, Host};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, trace};
use waypoint_protocol::fragment::{split_address, strip_marker, FRAGMENT_MARKER};

/// Default notification channel capacity.
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// One session history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    pathname: String,
    /// Without the leading `#`.
    fragment: String,
}

impl Entry {
    fn parse(address: &str) -> Self {
        let (pathname, fragment) = split_address(address);
        Self {
            pathname: pathname.to_string(),
            fragment: strip_marker(fragment).to_string(),
        }
    }

    fn address(&self) -> String {
        if self.fragment.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}{}{}", self.pathname, FRAGMENT_MARKER, self.fragment)
        }
    }
}

struct MemoryHostState {
    entries: Vec<Entry>,
    cursor: usize,
}

impl MemoryHostState {
    fn current(&self) -> &Entry {
        &self.entries[self.cursor]
    }

    fn push(&mut self, entry: Entry) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
    }
}

/// A [`Host`] that stores session history in memory.
pub struct MemoryHost {
    state: Mutex<MemoryHostState>,
    events: broadcast::Sender<FragmentChange>,
}

impl MemoryHost {
    /// Create a host whose first entry is `address` (e.g. `"somepage#start"`).
    #[must_use]
    pub fn new(address: &str) -> Self {
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CAPACITY);
        Self {
            state: Mutex::new(MemoryHostState {
                entries: vec![Entry::parse(address)],
                cursor: 0,
            }),
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, MemoryHostState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, old: String, new: String) {
        if old == new {
            return;
        }
        let change = FragmentChange { old, new };
        trace!(%change, "Fragment changed");
        self.events.send(change).unwrap_or_default();
    }

    /// Change the fragment the way a user editing the address bar would.
    ///
    /// Adds a history entry and notifies subscribers if the fragment changed.
    pub fn set_fragment(&self, fragment: &str) {
        let (old, new) = {
            let mut state = self.state();
            let current = state.current().clone();
            let entry = Entry {
                pathname: current.pathname,
                fragment: strip_marker(fragment).to_string(),
            };
            let new = entry.fragment.clone();
            if new != current.fragment {
                state.push(entry);
            }
            (current.fragment, new)
        };
        self.notify(old, new);
    }

    /// Move one entry back. Returns `false` at the start of history.
    pub fn back(&self) -> bool {
        self.step(false)
    }

    /// Move one entry forward. Returns `false` at the end of history.
    pub fn forward(&self) -> bool {
        self.step(true)
    }

    fn step(&self, forward: bool) -> bool {
        let (old, new) = {
            let mut state = self.state();
            let target = if forward {
                state.cursor + 1
            } else if let Some(prev) = state.cursor.checked_sub(1) {
                prev
            } else {
                return false;
            };
            if target >= state.entries.len() {
                return false;
            }
            let old = state.current().fragment.clone();
            state.cursor = target;
            (old, state.current().fragment.clone())
        };
        self.notify(old, new);
        true
    }

    /// The current full address.
    #[must_use]
    pub fn address(&self) -> String {
        self.state().current().address()
    }

    /// Every entry's address, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.state().entries.iter().map(Entry::address).collect()
    }

    /// Number of history entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    /// Always `false`: a host has at least its starting entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Host for MemoryHost {
    fn pathname(&self) -> String {
        self.state().current().pathname.clone()
    }

    fn fragment(&self) -> String {
        let state = self.state();
        let fragment = &state.current().fragment;
        if fragment.is_empty() {
            String::new()
        } else {
            format!("{FRAGMENT_MARKER}{fragment}")
        }
    }

    fn push_history_entry(&self, pathname: &str, fragment: &str) {
        let entry = Entry {
            pathname: pathname.to_string(),
            fragment: strip_marker(fragment).to_string(),
        };
        debug!(address = %entry.address(), "Pushed history entry");
        self.state().push(entry);
    }

    fn replace_history_entry(&self, fragment: &str) {
        let mut state = self.state();
        let cursor = state.cursor;
        state.entries[cursor].fragment = strip_marker(fragment).to_string();
        debug!(address = %state.current().address(), "Replaced history entry");
    }

    fn subscribe(&self) -> broadcast::Receiver<FragmentChange> {
        self.events.subscribe()
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_host_start_address() {
        let host = MemoryHost::new("somepage#start");
        assert_eq!(host.pathname(), "somepage");
        assert_eq!(host.fragment(), "#start");
        assert_eq!(host.address(), "somepage#start");
        assert!(!host.back());
    }

    #[test]
    fn test_memory_host_push_and_replace() {
        let host = MemoryHost::new("somepage#start");
        host.push_history_entry("somepage", "navigate/here");
        assert_eq!(host.fragment(), "#navigate/here");
        assert_eq!(host.len(), 2);

        host.replace_history_entry("redirect/there");
        assert_eq!(host.len(), 2);
        assert_eq!(
            host.entries(),
            vec!["somepage#start".to_string(), "somepage#redirect/there".to_string()]
        );
    }

    #[test]
    fn test_memory_host_start_without_fragment() {
        let host = MemoryHost::new("otherpage");
        assert_eq!(host.pathname(), "otherpage");
        assert_eq!(host.fragment(), "");
        assert_eq!(host.address(), "otherpage");
    }

    #[tokio::test]
    async fn test_memory_host_user_edit_notifies() {
        let host = MemoryHost::new("somepage#start");
        let mut rx = host.subscribe();

        host.set_fragment("then/navigate/there");
        let change = rx.recv().await.unwrap();
        assert_eq!(change.old, "start");
        assert_eq!(change.new, "then/navigate/there");

        // Same fragment: no entry, no notification.
        host.set_fragment("#then/navigate/there");
        assert_eq!(host.len(), 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_memory_host_push_does_not_notify() {
        let host = MemoryHost::new("somepage#start");
        let mut rx = host.subscribe();
        host.push_history_entry("somepage", "quiet");
        host.replace_history_entry("quieter");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_memory_host_back_and_forward() {
        let host = MemoryHost::new("somepage#start");
        let mut rx = host.subscribe();
        host.push_history_entry("somepage", "second");

        assert!(host.back());
        assert_eq!(host.fragment(), "#start");
        assert_eq!(rx.recv().await.unwrap().new, "start");
        assert!(!host.back());

        assert!(host.forward());
        assert_eq!(host.fragment(), "#second");
        assert!(!host.forward());

        // Pushing after going back drops the forward entries.
        host.back();
        host.push_history_entry("somepage", "third");
        assert_eq!(host.len(), 2);
    }
}
