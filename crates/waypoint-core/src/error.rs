//! Locally reported navigation errors.
//!
//! None of these escape the transition chain. Each is logged, counted,
//! broadcast to [`crate::Navigator::reports`] subscribers and sent on the
//! substrate's error route, then the transition returns to idle.

use thiserror::Error;
use waypoint_protocol::{Route, StatusCode};

/// Navigation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    /// A 200 reply whose body was not a start function.
    #[error("App request did not return a start function")]
    NotAStartFunction,

    /// A 301 reply whose body was not a route.
    #[error("Invalid redirect route: {0}")]
    InvalidRedirect(&'static str),

    /// Redirect chain exceeded the hop limit.
    #[error("Too many redirects ({0})")]
    TooManyRedirects(u32),

    /// The index route itself is unavailable.
    #[error("Index route is not available")]
    IndexUnavailable,

    /// The application replied with an error status.
    #[error("{status} : {body}")]
    Application {
        /// Reply status.
        status: StatusCode,
        /// Reply body, rendered.
        body: String,
    },

    /// The error application replied 200 without a start function.
    #[error("Error app request did not return a start function")]
    ErrorAppNotAStartFunction,

    /// No error application is reachable.
    #[error("No application error handler")]
    NoErrorHandler,

    /// The error application replied with an unexpected status.
    #[error("{status} Bad error application response {body}")]
    BadErrorApplication {
        /// Reply status.
        status: StatusCode,
        /// Reply body, rendered.
        body: String,
    },
}

impl NavigationError {
    /// Stable label used for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationError::NotAStartFunction | NavigationError::InvalidRedirect(_) => "protocol",
            NavigationError::TooManyRedirects(_) => "redirect_limit",
            NavigationError::IndexUnavailable => "unavailable",
            NavigationError::Application { .. } => "application",
            NavigationError::ErrorAppNotAStartFunction
            | NavigationError::NoErrorHandler
            | NavigationError::BadErrorApplication { .. } => "error_application",
        }
    }

    /// Whether this error ends the navigation with no further fallback.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NavigationError::Application { .. })
    }
}

/// A navigation error tied to the transition target that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationReport {
    /// The subroute the transition was resolving.
    pub target: Route,
    /// What went wrong.
    pub error: NavigationError,
}

impl std::fmt::Display for NavigationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}: {}", self.target, self.error)
    }
}
