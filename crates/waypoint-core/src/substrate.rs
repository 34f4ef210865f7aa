//! The message substrate contract.
//!
//! The navigator never resolves routes itself; it asks a substrate for the
//! application mounted at a route and reads back a [`Reply`].

use async_trait::async_trait;
use std::time::Duration;
use waypoint_bus::Bus;
use waypoint_protocol::{Reply, Route};

/// A message-routing substrate.
#[async_trait]
pub trait Substrate: Send + Sync {
    /// Request `to` and wait up to `timeout` for a reply.
    ///
    /// Failures and timeouts must come back as unavailable-style replies
    /// (503 or 408), never as errors.
    async fn request(&self, to: &Route, body: serde_json::Value, timeout: Duration) -> Reply;

    /// Deliver `body` to `to` without waiting. Missing listeners are fine.
    fn send(&self, to: &Route, body: serde_json::Value);
}

#[async_trait]
impl Substrate for Bus {
    async fn request(&self, to: &Route, body: serde_json::Value, timeout: Duration) -> Reply {
        Bus::request(self, to, body, timeout).await
    }

    fn send(&self, to: &Route, body: serde_json::Value) {
        Bus::send(self, to, body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use waypoint_bus::Request;
    use waypoint_protocol::StatusCode;

    #[tokio::test]
    async fn test_bus_as_substrate() {
        let bus = Arc::new(Bus::new());
        bus.mount(["app", "index"], |req: Request| {
            req.respond_with("fine", "200");
        })
        .unwrap();

        let substrate: Arc<dyn Substrate> = bus;
        let reply = substrate
            .request(&Route::from(["app", "index"]), json!({}), Duration::from_millis(10))
            .await;
        assert_eq!(reply.status, StatusCode::OK);

        // Fire-and-forget to nowhere is tolerated.
        substrate.send(&Route::from(["error", "navigate"]), json!({}));
    }
}
