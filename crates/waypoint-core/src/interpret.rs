//! Response interpretation.
//!
//! Turns a substrate reply into one of: start the application, follow a
//! redirect, fall back to the index, or escalate to the error application.

use crate::config::{ERROR_APP_TIMEOUT, MAX_REDIRECTS};
use crate::error::NavigationError;
use crate::lifecycle::Lifecycle;
use crate::metrics;
use crate::navigator::Shared;
use crate::scheduler::Transition;
use tracing::{debug, trace};
use waypoint_protocol::{Application, Body, Reply, Route, StatusClass, StatusCode};

/// What a reply asks the navigator to do.
#[derive(Debug)]
pub enum ResponseOutcome {
    /// Start this application.
    Started(Application),
    /// Navigate to this route instead.
    Redirect(Route),
    /// The application is not reachable.
    Unavailable,
    /// The application replied with an error.
    Error {
        /// Reply status.
        status: StatusCode,
        /// Reply body.
        body: Body,
    },
    /// The reply broke the protocol (wrong body for its status).
    Malformed(NavigationError),
}

impl ResponseOutcome {
    /// Classify a reply.
    #[must_use]
    pub fn classify(reply: Reply) -> Self {
        match reply.status.class() {
            StatusClass::Success => match reply.body.into_application() {
                Some(app) => ResponseOutcome::Started(app),
                None => ResponseOutcome::Malformed(NavigationError::NotAStartFunction),
            },
            StatusClass::Redirect => match reply.body.as_route() {
                Some(route) => ResponseOutcome::Redirect(route),
                None => ResponseOutcome::Malformed(NavigationError::InvalidRedirect(
                    reply.body.kind(),
                )),
            },
            StatusClass::Unavailable => ResponseOutcome::Unavailable,
            StatusClass::Other => ResponseOutcome::Error {
                status: reply.status,
                body: reply.body,
            },
        }
    }
}

/// Run one transition to completion.
pub(crate) async fn run_transition(
    shared: &Shared,
    lifecycle: &mut Lifecycle,
    transition: Transition,
) {
    let config = &shared.config;
    let to = config.app_route.concat(&transition.target);
    debug!(token = %transition.token, to = %to, "Requesting application");

    let reply = shared
        .substrate
        .request(&to, config.globals.clone(), config.app_options.timeout())
        .await;

    if !shared.scheduler.is_current(transition.token) {
        trace!(token = %transition.token, status = %reply.status, "Discarding stale reply");
        metrics::record_stale();
        return;
    }

    debug!(token = %transition.token, status = %reply.status, "Application reply");
    match ResponseOutcome::classify(reply) {
        ResponseOutcome::Started(app) => {
            lifecycle
                .run_next(&shared.scheduler, transition.token, app)
                .await;
        }
        ResponseOutcome::Redirect(target) => {
            follow_redirect(shared, &transition, target, "explicit");
        }
        ResponseOutcome::Unavailable => {
            if transition.target == config.index_route {
                shared.report(&transition.target, NavigationError::IndexUnavailable);
            } else {
                let index = config.index_route.clone();
                follow_redirect(shared, &transition, index, "unavailable");
            }
        }
        ResponseOutcome::Error { status, body } => {
            let error = NavigationError::Application {
                status,
                body: body.to_string(),
            };
            run_error_app(shared, lifecycle, &transition, error).await;
        }
        ResponseOutcome::Malformed(error) => shared.report(&transition.target, error),
    }
}

/// Rewrite the current entry to `target` and navigate there.
///
/// The replaced entry means "back" skips the redirected hop.
/// The index never redirects to itself: that ends the transition with
/// [`NavigationError::IndexUnavailable`] instead of a second request.
fn follow_redirect(shared: &Shared, from: &Transition, target: Route, reason: &'static str) {
    let index = &shared.config.index_route;
    if from.target == *index && target == *index {
        shared.report(&from.target, NavigationError::IndexUnavailable);
        return;
    }
    if from.hops >= MAX_REDIRECTS {
        shared.report(&from.target, NavigationError::TooManyRedirects(from.hops));
        return;
    }
    debug!(from = %from.target, to = %target, reason, "Following redirect");
    if shared
        .redirect_if_current(from.token, target, from.hops + 1)
        .is_some()
    {
        metrics::record_redirect(reason);
    } else {
        trace!(token = %from.token, "Redirect superseded");
        metrics::record_stale();
    }
}

/// Report an application error and hand over to the error application.
///
/// The error application gets one attempt with a short fixed timeout; its
/// failures are reported and never escalated further.
async fn run_error_app(
    shared: &Shared,
    lifecycle: &mut Lifecycle,
    transition: &Transition,
    error: NavigationError,
) {
    let message = error.to_string();
    shared.report(&transition.target, error);

    let to = shared.config.error_app_route();
    let body = shared.config.error_body(&message);
    debug!(token = %transition.token, to = %to, "Requesting error application");
    let reply = shared.substrate.request(&to, body, ERROR_APP_TIMEOUT).await;

    if !shared.scheduler.is_current(transition.token) {
        trace!(token = %transition.token, "Discarding stale error application reply");
        metrics::record_stale();
        return;
    }

    match reply.status.class() {
        StatusClass::Success => match reply.body.into_application() {
            Some(app) => {
                lifecycle
                    .run_next(&shared.scheduler, transition.token, app)
                    .await;
            }
            None => shared.report(
                &transition.target,
                NavigationError::ErrorAppNotAStartFunction,
            ),
        },
        StatusClass::Unavailable => {
            shared.report(&transition.target, NavigationError::NoErrorHandler);
        }
        StatusClass::Redirect | StatusClass::Other => shared.report(
            &transition.target,
            NavigationError::BadErrorApplication {
                status: reply.status,
                body: reply.body.to_string(),
            },
        ),
    }
}
