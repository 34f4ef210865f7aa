//! # waypoint-host
//!
//! Browsing host abstraction for the Waypoint navigation coordinator.
//!
//! A host owns the address bar and the session history. The navigator talks
//! to it only through the [`Host`] trait:
//!
//! - read the current pathname and fragment
//! - push or replace history entries
//! - subscribe to fragment changes it did not cause
//!
//! ```rust
//! use waypoint_host::{Host, MemoryHost};
//!
//! let host = MemoryHost::new("somepage#start");
//! host.push_history_entry("somepage", "navigate/here");
//! assert_eq!(host.fragment(), "#navigate/here");
//! ```

pub mod memory;
pub mod traits;

pub use memory::MemoryHost;
pub use traits::{FragmentChange, Host};
