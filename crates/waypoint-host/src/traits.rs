//! Host abstraction traits for Waypoint.
//!
//! A host is whatever owns the address bar and session history: a browser
//! window, a webview, or an in-memory stand-in. The navigator only needs the
//! handful of operations below.

use std::fmt;
use tokio::sync::broadcast;

/// Notification that the address fragment changed outside the navigator's
/// control (user edit, back/forward).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentChange {
    /// Fragment before the change, without the leading `#`.
    pub old: String,
    /// Fragment after the change, without the leading `#`.
    pub new: String,
}

impl fmt::Display for FragmentChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} -> #{}", self.old, self.new)
    }
}

/// A browsing host.
///
/// Pushing or replacing history entries must not emit a
/// [`FragmentChange`]; only changes the navigator did not make itself do.
pub trait Host: Send + Sync {
    /// Current pathname (the part of the address before `#`).
    fn pathname(&self) -> String;

    /// Current fragment, including its leading `#` if non-empty.
    fn fragment(&self) -> String;

    /// Append a new history entry at `pathname` + `fragment`.
    ///
    /// `fragment` is given without the leading `#`.
    fn push_history_entry(&self, pathname: &str, fragment: &str);

    /// Rewrite the current history entry's fragment in place.
    ///
    /// `fragment` is given without the leading `#`.
    fn replace_history_entry(&self, fragment: &str);

    /// Subscribe to fragment-change notifications.
    fn subscribe(&self) -> broadcast::Receiver<FragmentChange>;

    /// Get the host name (e.g., "memory", "browser").
    fn name(&self) -> &'static str {
        "host"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragment_change_display() {
        let change = FragmentChange {
            old: "start".into(),
            new: "navigate/here".into(),
        };
        assert_eq!(change.to_string(), "#start -> #navigate/here");
    }
}
