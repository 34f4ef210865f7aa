//! # waypoint-bus
//!
//! In-process message bus for the Waypoint navigation coordinator.
//!
//! The bus is the substrate the navigator resolves applications through:
//!
//! - **Mount** - register a handler under a route pattern (`app/index`,
//!   `navigate/**`)
//! - **Send** - fire-and-forget delivery to every matching handler
//! - **Request** - deliver and wait for the first reply, bounded by a timeout
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  request  ┌─────────────┐  Request  ┌─────────────┐
//! │  Navigator  │──────────▶│     Bus     │──────────▶│   Handler   │
//! └─────────────┘           └─────────────┘           └─────────────┘
//!        ▲                                                   │
//!        └──────────────────── Reply ────────────────────────┘
//! ```

pub mod bus;
pub mod message;
pub mod pattern;

pub use bus::{Bus, BusConfig, BusError, BusStats, MountId};
pub use message::{Request, Responder};
pub use pattern::WILDCARD;
