//! # waypoint-core
//!
//! Client-side navigation coordinator.
//!
//! Maps the host's address fragment to an application resolved through a
//! message substrate, and keeps exactly one application current no matter
//! how navigations interleave:
//!
//! - **Host Adapter** - routes to and from the address fragment
//! - **Scheduler** - freshness tokens and a single ordered transition queue
//! - **Lifecycle** - close, clean, start; never two applications at once
//! - **Interpreter** - 200 / 301 / 503 / error-application fallback
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use waypoint_bus::{Bus, Request};
//! use waypoint_core::{Navigator, NavigatorConfig};
//! use waypoint_host::MemoryHost;
//! use waypoint_protocol::{Application, Teardown};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = Arc::new(Bus::new());
//! bus.mount(["app", "index"], |req: Request| {
//!     req.respond(Application::new(|| {
//!         println!("index started");
//!         Teardown::sync(|| println!("index closed"))
//!     }));
//! })
//! .unwrap();
//!
//! let host = Arc::new(MemoryHost::new("somepage"));
//! let navigator = Navigator::new(host, bus, NavigatorConfig::default());
//! navigator.start();
//! # }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod interpret;
pub mod lifecycle;
pub mod metrics;
pub mod navigator;
pub mod scheduler;
pub mod substrate;

pub use config::{AppOptions, CleanPage, NavigatorConfig, NavigatorSettings, ERROR_APP_TIMEOUT};
pub use error::{NavigationError, NavigationReport};
pub use host::HostAdapter;
pub use interpret::ResponseOutcome;
pub use lifecycle::Lifecycle;
pub use navigator::{Navigator, NavigatorHandle};
pub use scheduler::{Scheduler, Token, Transition};
pub use substrate::Substrate;
