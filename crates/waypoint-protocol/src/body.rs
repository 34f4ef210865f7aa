//! Reply bodies exchanged over the substrate.
//!
//! Bodies are explicitly tagged instead of being inspected at runtime: a
//! reply either carries a start function, a redirect route, or an opaque
//! JSON value.

use crate::app::Application;
use crate::route::{json_kind, Route};
use crate::status::StatusCode;
use std::fmt;

/// The body of a substrate reply.
#[derive(Debug)]
pub enum Body {
    /// An application start function.
    Start(Application),
    /// A redirect target.
    Route(Route),
    /// Anything else.
    Value(serde_json::Value),
}

impl Body {
    /// An empty (`null`) body.
    #[must_use]
    pub fn null() -> Self {
        Body::Value(serde_json::Value::Null)
    }

    /// Short name of the body's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Body::Start(_) => "function",
            Body::Route(_) => "route",
            Body::Value(value) => json_kind(value),
        }
    }

    /// Take the start function, if this body carries one.
    #[must_use]
    pub fn into_application(self) -> Option<Application> {
        match self {
            Body::Start(app) => Some(app),
            _ => None,
        }
    }

    /// Interpret the body as a route.
    ///
    /// Tagged routes qualify, as do JSON arrays of non-empty strings.
    #[must_use]
    pub fn as_route(&self) -> Option<Route> {
        match self {
            Body::Route(route) => Some(route.clone()),
            Body::Value(value) => Route::from_value(value).ok(),
            Body::Start(_) => None,
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Body::null()
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Start(_) => f.write_str("[start function]"),
            Body::Route(route) => write!(f, "{route}"),
            Body::Value(serde_json::Value::String(text)) => f.write_str(text),
            Body::Value(value) => write!(f, "{value}"),
        }
    }
}

impl From<Application> for Body {
    fn from(app: Application) -> Self {
        Body::Start(app)
    }
}

impl From<Route> for Body {
    fn from(route: Route) -> Self {
        Body::Route(route)
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Value(value)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Value(serde_json::Value::String(text.to_string()))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Value(serde_json::Value::String(text))
    }
}

/// A reply from the substrate: a body plus a status code.
#[derive(Debug, Default)]
pub struct Reply {
    /// Reply body.
    pub body: Body,
    /// Reply status.
    pub status: StatusCode,
}

impl Reply {
    /// Create a reply with an explicit status.
    #[must_use]
    pub fn new(body: impl Into<Body>, status: impl Into<StatusCode>) -> Self {
        Self {
            body: body.into(),
            status: status.into(),
        }
    }

    /// A successful reply.
    #[must_use]
    pub fn ok(body: impl Into<Body>) -> Self {
        Self::new(body, StatusCode::OK)
    }

    /// A redirect to `route`.
    #[must_use]
    pub fn redirect(route: impl Into<Route>) -> Self {
        Self::new(Body::Route(route.into()), StatusCode::MOVED_PERMANENTLY)
    }

    /// A service-unavailable reply.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(Body::null(), StatusCode::SERVICE_UNAVAILABLE)
    }

    /// A reply for a request that timed out.
    #[must_use]
    pub fn timeout() -> Self {
        Self::new(Body::null(), StatusCode::REQUEST_TIMEOUT)
    }
}
