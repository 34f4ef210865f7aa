//! # waypoint-protocol
//!
//! Shared vocabulary for the Waypoint navigation coordinator.
//!
//! This crate defines the values that cross the boundary between the
//! navigator, the message substrate and the browsing host:
//!
//! - `Route` - ordered path segments naming an application
//! - `fragment` - route <-> address fragment translation
//! - `StatusCode` - string-or-numeric reply codes and their classes
//! - `Body` / `Reply` - explicitly tagged reply payloads
//! - `Application` / `Teardown` - start and close capabilities
//!
//! ## Example
//!
//! ```rust
//! use waypoint_protocol::{fragment, Route};
//!
//! let route = Route::from(["document", "readme"]);
//! assert_eq!(fragment::encode(&route), "document/readme");
//! assert_eq!(fragment::decode("#document/readme"), route);
//! assert!(fragment::decode("").is_empty());
//! ```

pub mod app;
pub mod body;
pub mod fragment;
pub mod route;
pub mod status;

pub use app::{Application, Teardown};
pub use body::{Body, Reply};
pub use route::{ProtocolError, Route};
pub use status::{StatusClass, StatusCode};
