//! Navigation metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops until the
//! embedding process installs a recorder.

use metrics::counter;

/// Metric names.
pub mod names {
    pub const TRANSITIONS_TOTAL: &str = "waypoint_transitions_total";
    pub const TRANSITIONS_STALE: &str = "waypoint_transitions_stale_total";
    pub const REDIRECTS_TOTAL: &str = "waypoint_redirects_total";
    pub const APPS_STARTED: &str = "waypoint_apps_started_total";
    pub const APPS_ABORTED: &str = "waypoint_apps_aborted_total";
    pub const REPORTS_TOTAL: &str = "waypoint_reports_total";
}

/// Describe all navigation metrics.
pub fn describe() {
    metrics::describe_counter!(names::TRANSITIONS_TOTAL, "Navigation attempts accepted");
    metrics::describe_counter!(
        names::TRANSITIONS_STALE,
        "Replies discarded because a newer navigation superseded them"
    );
    metrics::describe_counter!(names::REDIRECTS_TOTAL, "Redirects followed");
    metrics::describe_counter!(names::APPS_STARTED, "Applications started");
    metrics::describe_counter!(
        names::APPS_ABORTED,
        "Starts abandoned because the navigation went stale during teardown"
    );
    metrics::describe_counter!(names::REPORTS_TOTAL, "Locally reported navigation errors");
}

/// Record an accepted navigation.
pub fn record_transition() {
    counter!(names::TRANSITIONS_TOTAL).increment(1);
}

/// Record a discarded stale reply.
pub fn record_stale() {
    counter!(names::TRANSITIONS_STALE).increment(1);
}

/// Record a followed redirect.
pub fn record_redirect(reason: &'static str) {
    counter!(names::REDIRECTS_TOTAL, "reason" => reason).increment(1);
}

/// Record a started application.
pub fn record_started() {
    counter!(names::APPS_STARTED).increment(1);
}

/// Record an abandoned start.
pub fn record_aborted() {
    counter!(names::APPS_ABORTED).increment(1);
}

/// Record a reported error.
pub fn record_report(kind: &'static str) {
    counter!(names::REPORTS_TOTAL, "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder() {
        // No recorder installed: every call is a no-op.
        describe();
        record_transition();
        record_stale();
        record_redirect("explicit");
        record_started();
        record_aborted();
        record_report("protocol");
    }
}
